//! Side-by-side pollutant concentration comparison.
//!
//! Two monthly composites of a pollutant product, clipped to a named
//! country boundary and rendered with one shared value-to-color mapping
//! so the overlays are directly comparable.

use tracing::info;

use geoscope_cloud::{Backend, RenderedMap, Result};
use geoscope_colormap::ColorRamp;
use geoscope_core::{DateRange, FeatureCollection, Image, ImageCollection};
use geoscope_map::{Label, Layer, LonLat, MapView, VisParams};

/// Configuration for the comparison. `Default` is the February 2019 vs
/// February 2020 NO₂ analysis over Thailand.
#[derive(Debug, Clone)]
pub struct No2Comparison {
    /// Pollutant image collection id.
    pub product: String,
    /// Concentration band to compare.
    pub band: String,
    /// First comparison window.
    pub window_a: DateRange,
    /// Second comparison window.
    pub window_b: DateRange,
    /// Administrative-boundaries dataset id.
    pub boundaries: String,
    /// Boundary attribute holding the country name.
    pub boundary_property: String,
    /// Country name, matched exactly. An unknown name clips to nothing;
    /// this is not detected locally.
    pub country: String,
    /// Shared color ramp for both overlays.
    pub ramp: ColorRamp,
    /// Shared value domain for both overlays.
    pub min: f64,
    pub max: f64,
    /// Map center and zoom.
    pub center: LonLat,
    pub zoom: u8,
    /// Centered map title.
    pub title: String,
}

impl Default for No2Comparison {
    fn default() -> Self {
        Self {
            product: "COPERNICUS/S5P/OFFL/L3_NO2".into(),
            band: "NO2_column_number_density".into(),
            window_a: DateRange::parse("2019-02-01", "2019-02-28").expect("static window"),
            window_b: DateRange::parse("2020-02-01", "2020-02-28").expect("static window"),
            boundaries: "USDOS/LSIB_SIMPLE/2017".into(),
            boundary_property: "country_na".into(),
            country: "Thailand".into(),
            ramp: ColorRamp::parse("lightblue,orange,yellow,red,purple").expect("static ramp"),
            min: 0.00002,
            max: 0.0005,
            center: LonLat::new(107.013905, 16.566622),
            zoom: 5,
            title: "Nitrogen dioxide CONCENTRATIONS Map as of February 2020".into(),
        }
    }
}

/// Descriptors produced by [`No2Comparison::build`].
#[derive(Debug, Clone)]
pub struct No2Artifacts {
    /// Per-pixel maximum composite of the first window, clipped.
    pub composite_a: Image,
    /// Per-pixel maximum composite of the second window, clipped.
    pub composite_b: Image,
    pub map: MapView,
}

impl No2Comparison {
    /// Layer name for a window, e.g. `"Feb 2019"`.
    fn layer_name(window: &DateRange) -> String {
        window.start.format("%b %Y").to_string()
    }

    /// Build the comparison descriptors and map document. Pure; no I/O.
    pub fn build(&self) -> No2Artifacts {
        let country = FeatureCollection::load(&self.boundaries)
            .filter_eq(self.boundary_property.as_str(), self.country.as_str());

        let composite = |window: &DateRange| {
            ImageCollection::load(&self.product)
                .filter_date(*window)
                .max()
                .select_band(&self.band)
                .clip(&country)
        };
        let composite_a = composite(&self.window_a);
        let composite_b = composite(&self.window_b);

        // One VisParams value cloned into both layers: the shared
        // value-to-color mapping is what makes the overlays comparable.
        let vis = VisParams::continuous(self.min, self.max, self.ramp.clone());

        let map = MapView::centered(self.center.lon, self.center.lat, self.zoom)
            .with_title(Label::title(&self.title))
            .add_layer(Layer::new(
                &Self::layer_name(&self.window_a),
                &composite_a,
                vis.clone(),
            ))
            .add_layer(Layer::new(
                &Self::layer_name(&self.window_b),
                &composite_b,
                vis,
            ));

        No2Artifacts {
            composite_a,
            composite_b,
            map,
        }
    }

    /// Build and render on a backend.
    pub async fn run<B: Backend>(&self, backend: &B) -> Result<RenderedMap> {
        let artifacts = self.build();
        info!(
            country = %self.country,
            windows = %format!("{} vs {}", self.window_a, self.window_b),
            "rendering concentration comparison"
        );
        backend.render(&artifacts.map).await
    }
}
