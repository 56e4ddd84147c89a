//! Image collection descriptors.

use std::sync::Arc;

use crate::date::DateRange;
use crate::expr::Expr;
use crate::geometry::Geometry;
use crate::image::Image;
use crate::reducer::Reducer;

/// A lazy handle to a time-ordered set of satellite observations.
///
/// Every method returns a new descriptor; nothing touches the network
/// until a terminal backend action evaluates the graph.
///
/// ```ignore
/// use geoscope_core::prelude::*;
///
/// let feb_2019 = ImageCollection::load("COPERNICUS/S5P/OFFL/L3_NO2")
///     .filter_date(DateRange::parse("2019-02-01", "2019-02-28")?)
///     .max();
/// ```
#[derive(Debug, Clone)]
pub struct ImageCollection(Arc<Expr>);

impl ImageCollection {
    /// Reference a collection by its product id.
    pub fn load(id: &str) -> Self {
        Self(Arc::new(Expr::LoadCollection { id: id.to_string() }))
    }

    /// Keep observations dated inside `range`.
    pub fn filter_date(&self, range: DateRange) -> Self {
        Self(Arc::new(Expr::FilterDate {
            input: Arc::clone(&self.0),
            range,
        }))
    }

    /// Keep observations intersecting `geometry`.
    pub fn filter_bounds(&self, geometry: Geometry) -> Self {
        Self(Arc::new(Expr::FilterBounds {
            input: Arc::clone(&self.0),
            geometry,
        }))
    }

    /// Order by a metadata property, ascending.
    pub fn sort(&self, property: &str) -> Self {
        self.sort_by(property, true)
    }

    /// Order by a metadata property with explicit direction. The sort is
    /// stable: equal keys keep their collection order.
    pub fn sort_by(&self, property: &str, ascending: bool) -> Self {
        Self(Arc::new(Expr::Sort {
            input: Arc::clone(&self.0),
            property: property.to_string(),
            ascending,
        }))
    }

    /// The first observation of the collection.
    pub fn first(&self) -> Image {
        Image::from_expr(Arc::new(Expr::First {
            input: Arc::clone(&self.0),
        }))
    }

    /// Per-pixel reduction over the time dimension.
    pub fn reduce(&self, reducer: Reducer) -> Image {
        Image::from_expr(Arc::new(Expr::Reduce {
            input: Arc::clone(&self.0),
            reducer,
        }))
    }

    /// Per-pixel maximum composite.
    pub fn max(&self) -> Image {
        self.reduce(Reducer::Max)
    }

    /// The underlying expression node.
    pub fn expr(&self) -> &Arc<Expr> {
        &self.0
    }
}
