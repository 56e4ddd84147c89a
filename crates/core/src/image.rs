//! Scene image descriptors.

use std::sync::Arc;

use crate::classifier::Classifier;
use crate::expr::Expr;
use crate::table::{FeatureCollection, FeatureSet, SampleParams};

/// A lazy handle to a single raster image on the service.
///
/// Obtained from a collection (`first()`, `max()`) or loaded directly by
/// asset id. All methods are pure descriptor builders.
#[derive(Debug, Clone)]
pub struct Image(Arc<Expr>);

impl Image {
    /// Reference a single image asset by id.
    pub fn load(id: &str) -> Self {
        Self(Arc::new(Expr::LoadImage { id: id.to_string() }))
    }

    pub(crate) fn from_expr(expr: Arc<Expr>) -> Self {
        Self(expr)
    }

    /// Keep only the named bands.
    pub fn select(&self, bands: &[&str]) -> Self {
        Self(Arc::new(Expr::Select {
            input: Arc::clone(&self.0),
            bands: bands.iter().map(|b| b.to_string()).collect(),
        }))
    }

    /// Keep a single band.
    pub fn select_band(&self, band: &str) -> Self {
        self.select(&[band])
    }

    /// Restrict the image to a vector region. An empty region (e.g. an
    /// unmatched boundary name) yields an empty clip on the service side;
    /// this is not detected locally.
    pub fn clip(&self, region: &FeatureCollection) -> Self {
        Self(Arc::new(Expr::Clip {
            input: Arc::clone(&self.0),
            region: Arc::clone(region.expr()),
        }))
    }

    /// Per-pixel cloud contamination likelihood (0..100) for this scene.
    pub fn cloud_score(&self) -> Self {
        Self(Arc::new(Expr::CloudScore {
            input: Arc::clone(&self.0),
        }))
    }

    /// 1 where every band of this image is unmasked.
    pub fn valid_mask(&self) -> Self {
        Self(Arc::new(Expr::ValidMask {
            input: Arc::clone(&self.0),
        }))
    }

    /// This image's own mask band.
    pub fn mask(&self) -> Self {
        Self(Arc::new(Expr::MaskOf {
            input: Arc::clone(&self.0),
        }))
    }

    /// 1 where this image is `<= value`.
    pub fn lte(&self, value: f64) -> Self {
        Self(Arc::new(Expr::Lte {
            input: Arc::clone(&self.0),
            value,
        }))
    }

    /// Logical AND with another mask image.
    pub fn and(&self, other: &Image) -> Self {
        Self(Arc::new(Expr::And {
            left: Arc::clone(&self.0),
            right: Arc::clone(&other.0),
        }))
    }

    /// Exclude pixels where `mask` is 0. Excluded pixels never reach
    /// downstream sampling or classification.
    pub fn update_mask(&self, mask: &Image) -> Self {
        Self(Arc::new(Expr::UpdateMask {
            input: Arc::clone(&self.0),
            mask: Arc::clone(&mask.0),
        }))
    }

    /// Append the bands of `other` to this image.
    pub fn add_bands(&self, other: &Image) -> Self {
        Self(Arc::new(Expr::AddBands {
            input: Arc::clone(&self.0),
            bands: Arc::clone(&other.0),
        }))
    }

    /// `(a - b) / (a + b)` over two named bands of this image.
    pub fn normalized_difference(&self, band_a: &str, band_b: &str) -> Self {
        Self(Arc::new(Expr::NormalizedDifference {
            input: Arc::clone(&self.0),
            bands: [band_a.to_string(), band_b.to_string()],
        }))
    }

    /// Per-pixel difference `self - other`.
    pub fn subtract(&self, other: &Image) -> Self {
        Self(Arc::new(Expr::Subtract {
            left: Arc::clone(&self.0),
            right: Arc::clone(&other.0),
        }))
    }

    /// Draw a random per-pixel sample as a table of band values.
    ///
    /// Masked pixels are never sampled. Reproducibility of the draw is
    /// tied to the service's RNG; only the seed is under client control.
    pub fn sample(&self, params: SampleParams) -> FeatureSet {
        FeatureSet::from_expr(Arc::new(Expr::Sample {
            input: Arc::clone(&self.0),
            num_pixels: params.num_pixels,
            seed: params.seed,
        }))
    }

    /// Classify every pixel with a trained classifier.
    pub fn classify(&self, classifier: &Classifier) -> Self {
        Self(Arc::new(Expr::ClassifyImage {
            input: Arc::clone(&self.0),
            classifier: Arc::clone(classifier.expr()),
        }))
    }

    /// The underlying expression node.
    pub fn expr(&self) -> &Arc<Expr> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ImageCollection;
    use crate::date::DateRange;
    use crate::geometry::Geometry;

    fn least_cloudy_scene() -> Image {
        ImageCollection::load("LANDSAT/LT05/C01/T1_TOA")
            .filter_date(DateRange::parse("2011-01-01", "2020-01-31").unwrap())
            .filter_bounds(Geometry::point(88.9414, 25.8483))
            .sort("CLOUD_COVER")
            .first()
    }

    #[test]
    fn cloud_masking_graph_shape() {
        let scene = least_cloudy_scene();
        let mask = scene.valid_mask().and(&scene.cloud_score().lte(50.0));
        let input = scene.update_mask(&mask);

        let json = serde_json::to_value(input.expr()).unwrap();
        assert_eq!(json["op"], "updateMask");
        assert_eq!(json["mask"]["op"], "and");
        assert_eq!(json["mask"]["left"]["op"], "validMask");
        assert_eq!(json["mask"]["right"]["op"], "lte");
        assert_eq!(json["mask"]["right"]["value"], 50.0);
        assert_eq!(json["mask"]["right"]["input"]["op"], "cloudScore");
    }

    #[test]
    fn masked_scene_feeds_both_sample_draws() {
        let scene = least_cloudy_scene();
        let labeled = scene.add_bands(&Image::load("MODIS/051/MCD12Q1/2011_01_01"));
        let train = labeled.sample(SampleParams::new(5000, 0));
        let val = labeled.sample(SampleParams::new(5000, 1));

        let jt = serde_json::to_value(train.expr()).unwrap();
        let jv = serde_json::to_value(val.expr()).unwrap();
        assert_eq!(jt["input"], jv["input"]);
        assert_eq!(jt["seed"], 0);
        assert_eq!(jv["seed"], 1);
        assert_eq!(jt["numPixels"], 5000);
    }

    #[test]
    fn normalized_difference_bands() {
        let img = Image::load("scene").normalized_difference("B4", "B3");
        let json = serde_json::to_value(img.expr()).unwrap();
        assert_eq!(json["op"], "normalizedDifference");
        assert_eq!(json["bands"], serde_json::json!(["B4", "B3"]));
    }

    #[test]
    fn subtract_orders_operands() {
        let a = Image::load("2017");
        let b = Image::load("2014");
        let json = serde_json::to_value(a.subtract(&b).expr()).unwrap();
        assert_eq!(json["left"]["id"], "2017");
        assert_eq!(json["right"]["id"], "2014");
    }
}
