//! Supervised land-cover classification of a single scene.
//!
//! Selects the least-cloudy scene over a point, masks clouds, attaches a
//! reference land-cover band, draws independent train/validation samples,
//! trains a random forest on the service, and reports resubstitution and
//! held-out accuracy.

use tracing::info;

use geoscope_cloud::{Backend, RenderedMap, Result, SceneMetadata};
use geoscope_colormap::Palette;
use geoscope_core::{
    Classifier, ConfusionMatrix, DateRange, ErrorMatrix, FeatureSet, Geometry, Image,
    ImageCollection, RandomForest, SampleParams,
};
use geoscope_map::{Layer, LonLat, MapView, VisParams};

/// Prediction column appended by table classification.
const CLASSIFICATION_COLUMN: &str = "classification";

/// Configuration for the classification. `Default` is the stock Landsat 5
/// / MODIS IGBP analysis.
#[derive(Debug, Clone)]
pub struct SupervisedClassification {
    /// Source imagery collection id.
    pub product: String,
    /// Point of interest (lon, lat).
    pub roi: LonLat,
    /// Scene search window.
    pub window: DateRange,
    /// Collection metadata key holding scene cloudiness.
    pub cloud_sort_key: String,
    /// Per-pixel cloud-score cutoff; pixels above it are masked out.
    pub cloud_score_threshold: f64,
    /// Reference land-cover image id.
    pub landcover: String,
    /// Land-cover band, used as the training label.
    pub class_property: String,
    /// Feature bands fed to the classifier.
    pub input_bands: Vec<String>,
    /// Pixels per sample draw.
    pub sample_size: u32,
    /// Seed of the training draw.
    pub training_seed: u64,
    /// Seed of the validation draw. Must differ from `training_seed`,
    /// else validation accuracy is optimistically biased.
    pub validation_seed: u64,
    /// Random-forest tree count.
    pub trees: u32,
    /// Bands mapped to R, G, B for the true-color layer.
    pub true_color: [String; 3],
    /// Reflectance ceiling for the true-color layer.
    pub reflectance_max: f64,
    /// Categorical palette, one entry per class code.
    pub palette: Palette,
    pub zoom: u8,
}

impl Default for SupervisedClassification {
    fn default() -> Self {
        Self {
            product: "LANDSAT/LT05/C01/T1_TOA".into(),
            roi: LonLat::new(88.9414, 25.8483),
            window: DateRange::parse("2011-01-01", "2020-01-31").expect("static window"),
            cloud_sort_key: "CLOUD_COVER".into(),
            cloud_score_threshold: 50.0,
            landcover: "MODIS/051/MCD12Q1/2011_01_01".into(),
            class_property: "Land_Cover_Type_1".into(),
            input_bands: ["B1", "B2", "B3", "B4", "B5", "B6", "B7"]
                .iter()
                .map(|b| b.to_string())
                .collect(),
            sample_size: 5000,
            training_seed: 0,
            validation_seed: 1,
            trees: 10,
            true_color: ["B3".into(), "B2".into(), "B1".into()],
            reflectance_max: 0.4,
            palette: Palette::igbp(),
            zoom: 10,
        }
    }
}

/// Descriptors produced by [`SupervisedClassification::build`].
#[derive(Debug, Clone)]
pub struct ClassificationArtifacts {
    /// The selected scene, before masking.
    pub scene: Image,
    /// The cloud-masked scene all sampling and classification run on.
    pub input: Image,
    /// Training sample (training seed).
    pub training: FeatureSet,
    /// Validation sample (validation seed), null-filtered on the first
    /// feature band.
    pub validation: FeatureSet,
    pub classifier: Classifier,
    /// The classified scene.
    pub classified: Image,
    /// Resubstitution accuracy assessment.
    pub training_matrix: ErrorMatrix,
    /// Held-out accuracy assessment.
    pub validation_matrix: ErrorMatrix,
    pub map: MapView,
}

/// What a full run returns: the accuracy numbers plus rendered layers.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    pub scene: SceneMetadata,
    pub training_matrix: ConfusionMatrix,
    pub training_accuracy: f64,
    pub validation_matrix: ConfusionMatrix,
    pub validation_accuracy: f64,
    pub map: RenderedMap,
}

impl SupervisedClassification {
    /// Build every descriptor of the analysis. Pure; no I/O.
    ///
    /// Fails if the two sample seeds collide or the band list is empty.
    pub fn build(&self) -> geoscope_core::Result<ClassificationArtifacts> {
        if self.training_seed == self.validation_seed {
            return Err(geoscope_core::Error::SeedCollision(self.training_seed));
        }

        // Least-cloudy scene: ascending stable sort, first wins.
        let scene = ImageCollection::load(&self.product)
            .filter_date(self.window)
            .filter_bounds(Geometry::point(self.roi.lon, self.roi.lat))
            .sort(&self.cloud_sort_key)
            .first();

        // Valid where every band is unmasked AND the cloud score is
        // below the threshold.
        let mask = scene
            .valid_mask()
            .and(&scene.cloud_score().lte(self.cloud_score_threshold));
        let input = scene.update_mask(&mask);

        // Append the reference land-cover band so each sampled pixel
        // carries spectral values and a ground-truth class.
        let labeled = input.add_bands(&Image::load(&self.landcover).select_band(&self.class_property));

        let training = labeled.sample(SampleParams::new(self.sample_size, self.training_seed));
        let first_band = self.input_bands.first().map(String::as_str).unwrap_or("B1");
        let validation = labeled
            .sample(SampleParams::new(self.sample_size, self.validation_seed))
            .filter_not_null(first_band);

        let bands: Vec<&str> = self.input_bands.iter().map(String::as_str).collect();
        let classifier =
            RandomForest::new(self.trees).train(&training, &self.class_property, &bands)?;

        let classified = input.classify(&classifier);

        let training_matrix = classifier.confusion_matrix();
        let validation_matrix = validation
            .classify(&classifier)
            .error_matrix(&self.class_property, CLASSIFICATION_COLUMN);

        let palette_len = self.palette.len() as u32;
        let map = MapView::centered(self.roi.lon, self.roi.lat, self.zoom)
            .add_layer(Layer::new(
                "landsat",
                &input,
                VisParams::rgb(
                    &self.true_color[0],
                    &self.true_color[1],
                    &self.true_color[2],
                    self.reflectance_max,
                ),
            ))
            .add_layer(Layer::new(
                "classification",
                &classified,
                VisParams::categorical(0, palette_len - 1, self.palette.clone()),
            ));

        Ok(ClassificationArtifacts {
            scene,
            input,
            training,
            validation,
            classifier,
            classified,
            training_matrix,
            validation_matrix,
            map,
        })
    }

    /// Run the full analysis on a backend.
    pub async fn run<B: Backend>(&self, backend: &B) -> Result<ClassificationReport> {
        let artifacts = self.build()?;

        let scene = backend.scene_metadata(&artifacts.scene).await?;
        info!(scene = %scene.id, cloud_cover = ?scene.cloud_cover, "selected scene");

        let training_matrix = backend.confusion_matrix(&artifacts.training_matrix).await?;
        let validation_matrix = backend
            .confusion_matrix(&artifacts.validation_matrix)
            .await?;
        let map = backend.render(&artifacts.map).await?;

        let report = ClassificationReport {
            scene,
            training_accuracy: training_matrix.accuracy(),
            validation_accuracy: validation_matrix.accuracy(),
            training_matrix,
            validation_matrix,
            map,
        };
        info!(
            training_accuracy = report.training_accuracy,
            validation_accuracy = report.validation_accuracy,
            "classification complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_parameters() {
        let p = SupervisedClassification::default();
        assert_eq!(p.sample_size, 5000);
        assert_eq!(p.training_seed, 0);
        assert_eq!(p.validation_seed, 1);
        assert_ne!(p.training_seed, p.validation_seed);
        assert_eq!(p.trees, 10);
        assert_eq!(
            p.input_bands,
            vec!["B1", "B2", "B3", "B4", "B5", "B6", "B7"]
        );
        assert_eq!(p.cloud_score_threshold, 50.0);
    }

    #[test]
    fn seed_collision_is_rejected() {
        let p = SupervisedClassification {
            validation_seed: 0,
            ..Default::default()
        };
        assert!(matches!(
            p.build(),
            Err(geoscope_core::Error::SeedCollision(0))
        ));
    }

    #[test]
    fn sample_draws_use_the_configured_seeds() {
        let artifacts = SupervisedClassification::default().build().unwrap();
        let jt = serde_json::to_value(artifacts.training.expr()).unwrap();
        assert_eq!(jt["op"], "sample");
        assert_eq!(jt["seed"], 0);
        assert_eq!(jt["numPixels"], 5000);

        // Validation: null filter over the seed-1 sample
        let jv = serde_json::to_value(artifacts.validation.expr()).unwrap();
        assert_eq!(jv["op"], "filterProperty");
        assert_eq!(jv["filter"]["kind"], "not_null");
        assert_eq!(jv["filter"]["property"], "B1");
        assert_eq!(jv["input"]["op"], "sample");
        assert_eq!(jv["input"]["seed"], 1);
        // Both draws sample the same labeled image
        assert_eq!(jt["input"], jv["input"]["input"]);
    }

    #[test]
    fn classifier_binds_bands_and_trees() {
        let artifacts = SupervisedClassification::default().build().unwrap();
        let json = serde_json::to_value(artifacts.classifier.expr()).unwrap();
        assert_eq!(json["trees"], 10);
        assert_eq!(
            json["inputProperties"],
            serde_json::json!(["B1", "B2", "B3", "B4", "B5", "B6", "B7"])
        );
        assert_eq!(json["classProperty"], "Land_Cover_Type_1");
    }

    #[test]
    fn categorical_layer_has_18_classes() {
        let artifacts = SupervisedClassification::default().build().unwrap();
        let layer = &artifacts.map.layers[1];
        match &layer.vis {
            VisParams::Categorical { min, max, palette } => {
                assert_eq!(*min, 0);
                assert_eq!(*max, 17);
                assert_eq!(palette.len(), 18);
            }
            other => panic!("expected categorical vis, got {other:?}"),
        }
    }

    #[test]
    fn true_color_layer_comes_first() {
        let artifacts = SupervisedClassification::default().build().unwrap();
        assert_eq!(artifacts.map.layer_names(), vec!["landsat", "classification"]);
        match &artifacts.map.layers[0].vis {
            VisParams::Rgb { bands, max } => {
                assert_eq!(bands, &["B3".to_string(), "B2".into(), "B1".into()]);
                assert_eq!(*max, 0.4);
            }
            other => panic!("expected rgb vis, got {other:?}"),
        }
    }

    #[test]
    fn masking_happens_before_sampling() {
        let artifacts = SupervisedClassification::default().build().unwrap();
        let json = serde_json::to_value(artifacts.training.expr()).unwrap();
        // sample <- addBands <- updateMask
        assert_eq!(json["input"]["op"], "addBands");
        assert_eq!(json["input"]["input"]["op"], "updateMask");
        assert_eq!(json["input"]["input"]["mask"]["op"], "and");
    }

    #[test]
    fn validation_error_matrix_compares_truth_to_prediction() {
        let artifacts = SupervisedClassification::default().build().unwrap();
        let json = serde_json::to_value(artifacts.validation_matrix.expr()).unwrap();
        assert_eq!(json["op"], "errorMatrix");
        assert_eq!(json["truth"], "Land_Cover_Type_1");
        assert_eq!(json["predicted"], "classification");
        assert_eq!(json["table"]["op"], "classifyTable");
    }
}
