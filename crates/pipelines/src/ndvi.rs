//! NDVI change between two years.
//!
//! Takes the first scene over a point for each of two windows, computes
//! NDVI per scene as a normalized band difference, differences the two
//! years and masks the result to land before rendering.

use tracing::info;

use geoscope_cloud::{Backend, RenderedMap, Result};
use geoscope_colormap::ColorRamp;
use geoscope_core::{DateRange, Geometry, Image, ImageCollection};
use geoscope_map::{Layer, LonLat, MapView, VisParams};

/// Configuration for the NDVI change analysis. `Default` is the
/// July 2014 vs July 2017 Landsat 8 comparison.
#[derive(Debug, Clone)]
pub struct NdviChange {
    /// Source imagery collection id.
    pub product: String,
    /// Point of interest (lon, lat).
    pub roi: LonLat,
    /// Earlier window.
    pub window_a: DateRange,
    /// Later window.
    pub window_b: DateRange,
    /// Near-infrared band.
    pub nir_band: String,
    /// Red band.
    pub red_band: String,
    /// Image whose mask is used to restrict the result to land.
    pub land_mask: String,
    /// Ramp for the change layer.
    pub ramp: ColorRamp,
    /// Value domain of the change layer.
    pub min: f64,
    pub max: f64,
    pub zoom: u8,
    pub layer_name: String,
}

impl Default for NdviChange {
    fn default() -> Self {
        Self {
            product: "LANDSAT/LC08/C01/T1_TOA".into(),
            roi: LonLat::new(98.5265, 20.4715),
            window_a: DateRange::parse("2014-07-01", "2014-07-30").expect("static window"),
            window_b: DateRange::parse("2017-07-01", "2017-07-30").expect("static window"),
            nir_band: "B4".into(),
            red_band: "B3".into(),
            land_mask: "CGIAR/SRTM90_V4".into(),
            ramp: ColorRamp::parse("ffffff,0000ff,ff0000").expect("static ramp"),
            min: -0.3,
            max: 0.3,
            zoom: 9,
            layer_name: "Changes of NDVI  from 2014 to 2017".into(),
        }
    }
}

/// Descriptors produced by [`NdviChange::build`].
#[derive(Debug, Clone)]
pub struct NdviArtifacts {
    pub ndvi_a: Image,
    pub ndvi_b: Image,
    /// Land-masked NDVI difference (later minus earlier).
    pub change: Image,
    pub map: MapView,
}

impl NdviChange {
    /// Build the change descriptors and map document. Pure; no I/O.
    pub fn build(&self) -> NdviArtifacts {
        let point = Geometry::point(self.roi.lon, self.roi.lat);
        let scene = |window: &DateRange| {
            ImageCollection::load(&self.product)
                .filter_bounds(point.clone())
                .filter_date(*window)
                .first()
        };

        let ndvi_a = scene(&self.window_a).normalized_difference(&self.nir_band, &self.red_band);
        let ndvi_b = scene(&self.window_b).normalized_difference(&self.nir_band, &self.red_band);

        let change = ndvi_b
            .subtract(&ndvi_a)
            .update_mask(&Image::load(&self.land_mask).mask());

        let map = MapView::centered(self.roi.lon, self.roi.lat, self.zoom).add_layer(Layer::new(
            &self.layer_name,
            &change,
            VisParams::continuous(self.min, self.max, self.ramp.clone()),
        ));

        NdviArtifacts {
            ndvi_a,
            ndvi_b,
            change,
            map,
        }
    }

    /// Build and render on a backend.
    pub async fn run<B: Backend>(&self, backend: &B) -> Result<RenderedMap> {
        let artifacts = self.build();
        info!(
            windows = %format!("{} vs {}", self.window_a, self.window_b),
            "rendering NDVI change"
        );
        backend.render(&artifacts.map).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_is_later_minus_earlier() {
        let artifacts = NdviChange::default().build();
        let json = serde_json::to_value(artifacts.change.expr()).unwrap();
        assert_eq!(json["op"], "updateMask");
        let diff = &json["input"];
        assert_eq!(diff["op"], "subtract");
        // left operand is the 2017 NDVI
        assert_eq!(
            diff["left"]["input"]["input"]["range"]["start"],
            "2017-07-01"
        );
        assert_eq!(
            diff["right"]["input"]["input"]["range"]["start"],
            "2014-07-01"
        );
    }

    #[test]
    fn ndvi_uses_normalized_difference() {
        let artifacts = NdviChange::default().build();
        let json = serde_json::to_value(artifacts.ndvi_a.expr()).unwrap();
        assert_eq!(json["op"], "normalizedDifference");
        assert_eq!(json["bands"], serde_json::json!(["B4", "B3"]));
        assert_eq!(json["input"]["op"], "first");
    }

    #[test]
    fn land_mask_comes_from_the_dem() {
        let artifacts = NdviChange::default().build();
        let json = serde_json::to_value(artifacts.change.expr()).unwrap();
        assert_eq!(json["mask"]["op"], "maskOf");
        assert_eq!(json["mask"]["input"]["id"], "CGIAR/SRTM90_V4");
    }

    #[test]
    fn single_layer_with_symmetric_domain() {
        let artifacts = NdviChange::default().build();
        assert_eq!(artifacts.map.layers.len(), 1);
        match &artifacts.map.layers[0].vis {
            VisParams::Continuous { min, max, ramp } => {
                assert_eq!(*min, -0.3);
                assert_eq!(*max, 0.3);
                assert_eq!(ramp.len(), 3);
            }
            other => panic!("expected continuous vis, got {other:?}"),
        }
    }
}
