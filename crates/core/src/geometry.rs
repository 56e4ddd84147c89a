//! Geometry descriptors
//!
//! Client-side geometries are plain lon/lat coordinates wrapped around
//! `geo-types` primitives. They serialize in GeoJSON shape so the service
//! can consume them directly in spatial filters.

use geo_types::{LineString, Point, Polygon};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A geometry usable in spatial filters and as a clip region.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point<f64>),
    Polygon(Polygon<f64>),
}

impl Geometry {
    /// A point of interest at (longitude, latitude).
    pub fn point(lon: f64, lat: f64) -> Self {
        Self::Point(Point::new(lon, lat))
    }

    /// A polygon from an exterior ring of (lon, lat) pairs. The ring is
    /// closed automatically if the last vertex differs from the first.
    pub fn polygon(ring: &[(f64, f64)]) -> Self {
        let coords: Vec<(f64, f64)> = ring.to_vec();
        Self::Polygon(Polygon::new(LineString::from(coords), vec![]))
    }

    /// GeoJSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::Polygon(_) => "Polygon",
        }
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Geometry", 2)?;
        s.serialize_field("type", self.type_name())?;
        match self {
            Self::Point(p) => {
                s.serialize_field("coordinates", &[p.x(), p.y()])?;
            }
            Self::Polygon(poly) => {
                let rings: Vec<Vec<[f64; 2]>> = std::iter::once(poly.exterior())
                    .chain(poly.interiors().iter())
                    .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
                    .collect();
                s.serialize_field("coordinates", &rings)?;
            }
        }
        s.end()
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(tag = "type")]
        enum Raw {
            Point { coordinates: [f64; 2] },
            Polygon { coordinates: Vec<Vec<[f64; 2]>> },
        }

        match Raw::deserialize(deserializer)? {
            Raw::Point { coordinates: [lon, lat] } => Ok(Geometry::point(lon, lat)),
            Raw::Polygon { coordinates } => {
                let exterior = coordinates.first().cloned().unwrap_or_default();
                let ring: Vec<(f64, f64)> = exterior.iter().map(|c| (c[0], c[1])).collect();
                Ok(Geometry::polygon(&ring))
            }
        }
    }
}
