//! In-memory service double.
//!
//! `MockBackend` interprets the same expression graphs the HTTP backend
//! ships to the service, against fixture data registered up front. It
//! exists for offline contract tests and `--offline` CLI runs; its
//! evaluation is deliberately simple (a nearest-centroid stand-in for
//! the service's random forest) and makes no claim of numeric parity
//! with the hosted platform.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;

use geoscope_core::{
    ConfusionMatrix, ErrorMatrix, Expr, FeatureSet, Image, PropertyFilter,
};
use geoscope_map::MapView;

use crate::backend::Backend;
use crate::error::{CloudError, Result};
use crate::models::{RenderedLayer, RenderedMap, Row, SceneMetadata, Table};

/// One fixture scene in a mock collection.
#[derive(Debug, Clone)]
pub struct SceneFixture {
    pub id: String,
    pub cloud_cover: f64,
    pub date: NaiveDate,
}

impl SceneFixture {
    pub fn new(id: &str, cloud_cover: f64, date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            cloud_cover,
            date,
        }
    }
}

/// Offline backend over registered fixtures.
#[derive(Debug, Default)]
pub struct MockBackend {
    collections: HashMap<String, Vec<SceneFixture>>,
    samples: HashMap<u64, Vec<Row>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register fixture scenes for a collection id.
    pub fn with_scenes(mut self, collection: &str, scenes: Vec<SceneFixture>) -> Self {
        self.collections.insert(collection.to_string(), scenes);
        self
    }

    /// Register the row set a sample draw with `seed` returns.
    pub fn with_samples(mut self, seed: u64, rows: Vec<Row>) -> Self {
        self.samples.insert(seed, rows);
        self
    }

    /// A small self-contained fixture set for demo / `--offline` runs:
    /// three Landsat 5 scenes plus labeled sample rows for seeds 0 and 1.
    pub fn demo() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
        Self::new()
            .with_scenes(
                "LANDSAT/LT05/C01/T1_TOA",
                vec![
                    SceneFixture::new("LT05_138042_20110112", 20.0, date(2011, 1, 12)),
                    SceneFixture::new("LT05_138042_20111201", 5.0, date(2011, 12, 1)),
                    SceneFixture::new("LT05_138042_20120315", 40.0, date(2012, 3, 15)),
                ],
            )
            .with_scenes(
                "LANDSAT/LC08/C01/T1_TOA",
                vec![
                    SceneFixture::new("LC08_131046_20140705", 12.0, date(2014, 7, 5)),
                    SceneFixture::new("LC08_131046_20170712", 8.0, date(2017, 7, 12)),
                ],
            )
            .with_scenes(
                "COPERNICUS/S5P/OFFL/L3_NO2",
                (1..=28)
                    .map(|d| {
                        SceneFixture::new(&format!("S5P_201902{d:02}"), 0.0, date(2019, 2, d))
                    })
                    .chain((1..=28).map(|d| {
                        SceneFixture::new(&format!("S5P_202002{d:02}"), 0.0, date(2020, 2, d))
                    }))
                    .collect(),
            )
            .with_samples(0, demo_rows(0, 120))
            .with_samples(1, demo_rows(1, 120))
    }

    // ── Expression interpretation ───────────────────────────────────

    /// Resolve a collection sub-graph into its (filtered, sorted) scenes.
    fn collection_scenes(&self, expr: &Expr) -> Result<Vec<SceneFixture>> {
        match expr {
            Expr::LoadCollection { id } => self
                .collections
                .get(id)
                .cloned()
                .ok_or_else(|| CloudError::NotFound(id.clone())),
            Expr::FilterDate { input, range } => {
                let mut scenes = self.collection_scenes(input)?;
                scenes.retain(|s| range.contains(s.date));
                Ok(scenes)
            }
            // Fixture scenes are assumed to intersect any queried bounds.
            Expr::FilterBounds { input, .. } => self.collection_scenes(input),
            Expr::Sort {
                input,
                property,
                ascending,
            } => {
                if property != "CLOUD_COVER" {
                    return Err(CloudError::UnsupportedExpression {
                        op: "sort",
                        context: "mock collections only carry CLOUD_COVER metadata",
                    });
                }
                let mut scenes = self.collection_scenes(input)?;
                // Stable: equal keys keep collection order.
                scenes.sort_by(|a, b| {
                    let ord = a
                        .cloud_cover
                        .partial_cmp(&b.cloud_cover)
                        .unwrap_or(std::cmp::Ordering::Equal);
                    if *ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                });
                Ok(scenes)
            }
            other => Err(CloudError::UnsupportedExpression {
                op: other.op_name(),
                context: "where a collection was expected",
            }),
        }
    }

    /// Walk image wrappers down to the scene they derive from.
    fn resolve_scene(&self, expr: &Expr) -> Result<SceneMetadata> {
        match expr {
            Expr::LoadImage { id } => Ok(SceneMetadata {
                id: id.clone(),
                cloud_cover: None,
                date: None,
            }),
            Expr::First { input } => {
                let scenes = self.collection_scenes(input)?;
                let first = scenes
                    .first()
                    .ok_or_else(|| CloudError::EmptyCollection("first".into()))?;
                Ok(SceneMetadata {
                    id: first.id.clone(),
                    cloud_cover: Some(first.cloud_cover),
                    date: Some(first.date),
                })
            }
            Expr::Select { input, .. }
            | Expr::Clip { input, .. }
            | Expr::UpdateMask { input, .. }
            | Expr::AddBands { input, .. }
            | Expr::NormalizedDifference { input, .. }
            | Expr::ClassifyImage { input, .. } => self.resolve_scene(input),
            Expr::Subtract { left, .. } => self.resolve_scene(left),
            other => Err(CloudError::UnsupportedExpression {
                op: other.op_name(),
                context: "where a scene image was expected",
            }),
        }
    }

    /// Evaluate a table sub-graph into rows.
    fn eval_table(&self, expr: &Expr) -> Result<Table> {
        match expr {
            Expr::Sample {
                num_pixels, seed, ..
            } => {
                let mut rows = self
                    .samples
                    .get(seed)
                    .cloned()
                    .ok_or(CloudError::UnknownSeed(*seed))?;
                rows.truncate(*num_pixels as usize);
                Ok(Table::new(rows))
            }
            Expr::FilterProperty { input, filter } => {
                let mut table = self.eval_table(input)?;
                match filter {
                    PropertyFilter::NotNull { property } => {
                        table
                            .rows
                            .retain(|row| row.get(property).copied().flatten().is_some());
                    }
                    PropertyFilter::Eq { property, value } => {
                        let wanted = match value {
                            geoscope_core::FilterValue::Num(n) => *n,
                            geoscope_core::FilterValue::Str(_) => {
                                return Err(CloudError::UnsupportedExpression {
                                    op: "filterProperty",
                                    context: "mock tables only hold numeric columns",
                                })
                            }
                        };
                        table.rows.retain(|row| {
                            row.get(property).copied().flatten() == Some(wanted)
                        });
                    }
                }
                Ok(table)
            }
            Expr::ClassifyTable { input, classifier } => {
                let model = self.train_model(classifier)?;
                let mut table = self.eval_table(input)?;
                for row in &mut table.rows {
                    let predicted = model.predict(row);
                    row.insert(
                        "classification".to_string(),
                        predicted.map(|class| class as f64),
                    );
                }
                Ok(table)
            }
            other => Err(CloudError::UnsupportedExpression {
                op: other.op_name(),
                context: "where a sampled table was expected",
            }),
        }
    }

    /// Fit the stand-in classifier described by a train node.
    fn train_model(&self, expr: &Expr) -> Result<CentroidModel> {
        let Expr::TrainClassifier {
            features,
            class_property,
            input_properties,
            ..
        } = expr
        else {
            return Err(CloudError::UnsupportedExpression {
                op: expr.op_name(),
                context: "where a trained classifier was expected",
            });
        };

        let table = self.eval_table(features)?;
        CentroidModel::fit(&table, class_property, input_properties)
    }

    fn eval_matrix(&self, expr: &Expr) -> Result<ConfusionMatrix> {
        match expr {
            // Resubstitution: predict the training rows themselves.
            Expr::ConfusionMatrix { classifier } => {
                let Expr::TrainClassifier { features, .. } = classifier.as_ref() else {
                    return Err(CloudError::UnsupportedExpression {
                        op: classifier.op_name(),
                        context: "where a trained classifier was expected",
                    });
                };
                let model = self.train_model(classifier)?;
                let table = self.eval_table(features)?;
                let truth = model.class_property.clone();
                Ok(model.error_matrix(&table, &truth))
            }
            Expr::ErrorMatrix {
                table,
                truth,
                predicted,
            } => {
                let table = self.eval_table(table)?;
                let pairs: Vec<(u32, u32)> = table
                    .rows
                    .iter()
                    .filter_map(|row| {
                        let t = row.get(truth).copied().flatten()?;
                        let p = row.get(predicted).copied().flatten()?;
                        Some((t.round() as u32, p.round() as u32))
                    })
                    .collect();
                Ok(ConfusionMatrix::from_pairs(&pairs))
            }
            other => Err(CloudError::UnsupportedExpression {
                op: other.op_name(),
                context: "where an accuracy assessment was expected",
            }),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_table(&self, set: &FeatureSet) -> Result<Table> {
        self.eval_table(set.expr())
    }

    async fn confusion_matrix(&self, matrix: &ErrorMatrix) -> Result<ConfusionMatrix> {
        self.eval_matrix(matrix.expr())
    }

    async fn scene_metadata(&self, image: &Image) -> Result<SceneMetadata> {
        self.resolve_scene(image.expr())
    }

    async fn render(&self, map: &MapView) -> Result<RenderedMap> {
        let layers = map
            .layers
            .iter()
            .enumerate()
            .map(|(i, layer)| RenderedLayer {
                name: layer.name.clone(),
                url: format!("mock://tiles/{i}/{}", layer.name.replace(' ', "-")),
            })
            .collect();
        Ok(RenderedMap { layers })
    }
}

// ---------------------------------------------------------------------------
// Stand-in classifier
// ---------------------------------------------------------------------------

/// Nearest-centroid model: each class is represented by the mean of its
/// training rows over the input properties. Rows with a null in any
/// input or in the label are dropped from fitting, mirroring how the
/// service ignores masked pixels.
struct CentroidModel {
    class_property: String,
    input_properties: Vec<String>,
    centroids: Vec<(u32, Vec<f64>)>,
}

impl CentroidModel {
    fn fit(table: &Table, class_property: &str, input_properties: &[String]) -> Result<Self> {
        let mut sums: BTreeMap<u32, (Vec<f64>, u64)> = BTreeMap::new();

        for row in &table.rows {
            let Some(label) = row.get(class_property).copied().flatten() else {
                continue;
            };
            let Some(features) = feature_vector(row, input_properties) else {
                continue;
            };
            let entry = sums
                .entry(label.round() as u32)
                .or_insert_with(|| (vec![0.0; input_properties.len()], 0));
            for (acc, v) in entry.0.iter_mut().zip(&features) {
                *acc += v;
            }
            entry.1 += 1;
        }

        if sums.is_empty() {
            return Err(CloudError::MissingColumn(class_property.to_string()));
        }

        let centroids = sums
            .into_iter()
            .map(|(label, (sum, n))| {
                let mean = sum.into_iter().map(|s| s / n as f64).collect();
                (label, mean)
            })
            .collect();

        Ok(Self {
            class_property: class_property.to_string(),
            input_properties: input_properties.to_vec(),
            centroids,
        })
    }

    /// Predict a row's class; null when any input feature is null.
    /// Ties go to the lowest class code.
    fn predict(&self, row: &Row) -> Option<u32> {
        let features = feature_vector(row, &self.input_properties)?;
        let mut best: Option<(u32, f64)> = None;
        for (label, centroid) in &self.centroids {
            let dist: f64 = centroid
                .iter()
                .zip(&features)
                .map(|(c, f)| (c - f) * (c - f))
                .sum();
            if best.map(|(_, d)| dist < d).unwrap_or(true) {
                best = Some((*label, dist));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Cross-tabulate predictions over a labeled table.
    fn error_matrix(&self, table: &Table, truth_column: &str) -> ConfusionMatrix {
        let pairs: Vec<(u32, u32)> = table
            .rows
            .iter()
            .filter_map(|row| {
                let truth = row.get(truth_column).copied().flatten()?;
                let predicted = self.predict(row)?;
                Some((truth.round() as u32, predicted))
            })
            .collect();
        ConfusionMatrix::from_pairs(&pairs)
    }
}

fn feature_vector(row: &Row, properties: &[String]) -> Option<Vec<f64>> {
    properties
        .iter()
        .map(|p| row.get(p).copied().flatten())
        .collect()
}

// ---------------------------------------------------------------------------
// Demo fixtures
// ---------------------------------------------------------------------------

/// Deterministic labeled rows for the demo backend: three well-separated
/// spectral clusters labeled with IGBP codes 0 (water), 12 (croplands)
/// and 16 (barren). A handful of rows carry a null B1 so the validation
/// null filter has something to drop.
fn demo_rows(seed: u64, count: usize) -> Vec<Row> {
    let classes: [(u32, f64); 3] = [(0, 0.05), (12, 0.35), (16, 0.75)];
    let bands = ["B1", "B2", "B3", "B4", "B5", "B6", "B7"];

    (0..count)
        .map(|i| {
            let (label, base) = classes[i % classes.len()];
            // Small per-row deterministic offset, different per seed.
            let jitter = ((i as u64 * 37 + seed * 101) % 13) as f64 * 0.003;
            let mut row: Row = Row::new();
            for (b, band) in bands.iter().enumerate() {
                let value = base + jitter + b as f64 * 0.004;
                let null_b1 = b == 0 && i % 17 == 0;
                row.insert(band.to_string(), (!null_b1).then_some(value));
            }
            row.insert("Land_Cover_Type_1".to_string(), Some(label as f64));
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscope_core::{DateRange, Geometry, ImageCollection, RandomForest, SampleParams};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn backend_with_cloud_covers(covers: &[f64]) -> MockBackend {
        let scenes = covers
            .iter()
            .enumerate()
            .map(|(i, &c)| SceneFixture::new(&format!("scene-{i}"), c, date(2011, 6, 1)))
            .collect();
        MockBackend::new().with_scenes("LANDSAT/LT05/C01/T1_TOA", scenes)
    }

    fn least_cloudy() -> Image {
        ImageCollection::load("LANDSAT/LT05/C01/T1_TOA")
            .filter_date(DateRange::parse("2011-01-01", "2020-01-31").unwrap())
            .filter_bounds(Geometry::point(88.9414, 25.8483))
            .sort("CLOUD_COVER")
            .first()
    }

    #[tokio::test]
    async fn selects_minimum_cloud_cover() {
        let backend = backend_with_cloud_covers(&[20.0, 5.0, 40.0]);
        let meta = backend.scene_metadata(&least_cloudy()).await.unwrap();
        assert_eq!(meta.id, "scene-1");
        assert_eq!(meta.cloud_cover, Some(5.0));
    }

    #[tokio::test]
    async fn ties_break_by_collection_order() {
        let backend = backend_with_cloud_covers(&[7.0, 3.0, 3.0, 9.0]);
        let meta = backend.scene_metadata(&least_cloudy()).await.unwrap();
        assert_eq!(meta.id, "scene-1");
    }

    #[tokio::test]
    async fn date_filter_excludes_scenes() {
        let scenes = vec![
            SceneFixture::new("early", 1.0, date(2010, 6, 1)),
            SceneFixture::new("inside", 50.0, date(2015, 6, 1)),
        ];
        let backend = MockBackend::new().with_scenes("LANDSAT/LT05/C01/T1_TOA", scenes);
        let meta = backend.scene_metadata(&least_cloudy()).await.unwrap();
        // The cleaner scene is outside the window, so the cloudier one wins.
        assert_eq!(meta.id, "inside");
    }

    #[tokio::test]
    async fn empty_collection_is_an_error() {
        let backend = backend_with_cloud_covers(&[]);
        assert!(matches!(
            backend.scene_metadata(&least_cloudy()).await,
            Err(CloudError::EmptyCollection(_))
        ));
    }

    #[tokio::test]
    async fn unknown_collection_is_not_found() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.scene_metadata(&least_cloudy()).await,
            Err(CloudError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn sample_truncates_to_num_pixels() {
        let backend = MockBackend::new().with_samples(0, demo_rows(0, 50));
        let sample = Image::load("scene").sample(SampleParams::new(10, 0));
        let table = backend.fetch_table(&sample).await.unwrap();
        assert_eq!(table.len(), 10);
    }

    #[tokio::test]
    async fn null_filter_drops_rows() {
        let backend = MockBackend::new().with_samples(1, demo_rows(1, 60));
        let sample = Image::load("scene").sample(SampleParams::new(60, 1));

        let raw = backend.fetch_table(&sample).await.unwrap();
        assert!(raw.has_nulls_in("B1"));

        let filtered = backend
            .fetch_table(&sample.filter_not_null("B1"))
            .await
            .unwrap();
        assert!(!filtered.has_nulls_in("B1"));
        assert!(filtered.len() < raw.len());
    }

    #[tokio::test]
    async fn resubstitution_on_separable_clusters_is_perfect() {
        let backend = MockBackend::new().with_samples(0, demo_rows(0, 90));
        let training = Image::load("scene").sample(SampleParams::new(90, 0));
        let classifier = RandomForest::new(10)
            .train(
                &training,
                "Land_Cover_Type_1",
                &["B1", "B2", "B3", "B4", "B5", "B6", "B7"],
            )
            .unwrap();

        let matrix = backend
            .confusion_matrix(&classifier.confusion_matrix())
            .await
            .unwrap();
        assert_eq!(matrix.labels(), &[0, 12, 16]);
        assert!((matrix.accuracy() - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn classify_table_appends_column() {
        let backend = MockBackend::new()
            .with_samples(0, demo_rows(0, 90))
            .with_samples(1, demo_rows(1, 90));
        let image = Image::load("scene");
        let training = image.sample(SampleParams::new(90, 0));
        let validation = image.sample(SampleParams::new(90, 1)).filter_not_null("B1");
        let classifier = RandomForest::new(10)
            .train(
                &training,
                "Land_Cover_Type_1",
                &["B1", "B2", "B3", "B4", "B5", "B6", "B7"],
            )
            .unwrap();

        let classified = backend
            .fetch_table(&validation.classify(&classifier))
            .await
            .unwrap();
        assert!(classified
            .rows
            .iter()
            .all(|row| row.contains_key("classification")));
    }

    #[tokio::test]
    async fn render_returns_one_url_per_layer() {
        use geoscope_colormap::ColorRamp;
        use geoscope_map::{Layer, MapView, VisParams};

        let img = Image::load("scene");
        let vis = VisParams::continuous(0.0, 1.0, ColorRamp::parse("white,blue,red").unwrap());
        let map = MapView::centered(0.0, 0.0, 5)
            .add_layer(Layer::new("Feb 2019", &img, vis.clone()))
            .add_layer(Layer::new("Feb 2020", &img, vis));

        let rendered = MockBackend::new().render(&map).await.unwrap();
        assert_eq!(rendered.layers.len(), 2);
        assert!(rendered.layer("Feb 2019").unwrap().url.starts_with("mock://"));
    }

    #[test]
    fn demo_rows_differ_across_seeds() {
        let a = demo_rows(0, 30);
        let b = demo_rows(1, 30);
        assert_ne!(a, b);
    }
}
