//! End-to-end pipeline runs against the mock backend.
//!
//! These exercise the full descriptor graphs the pipelines build, with
//! fixture data small enough to reason about by hand.

use chrono::NaiveDate;

use geoscope_cloud::{Backend, MockBackend, Row, SceneFixture};
use geoscope_pipelines::{NdviChange, No2Comparison, SupervisedClassification};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A sampled pixel with every feature band set to `value`.
fn labeled_row(value: Option<f64>, label: f64) -> Row {
    let mut row = Row::new();
    for band in ["B1", "B2", "B3", "B4", "B5", "B6", "B7"] {
        // B1 carries the null when asked; other bands stay valid.
        let v = if band == "B1" { value } else { value.or(Some(0.9)) };
        row.insert(band.to_string(), v);
    }
    row.insert("Land_Cover_Type_1".to_string(), Some(label));
    row
}

fn landsat5_scenes(covers: &[f64]) -> Vec<SceneFixture> {
    covers
        .iter()
        .enumerate()
        .map(|(i, &c)| SceneFixture::new(&format!("scene-{i}"), c, date(2011, 6, 1)))
        .collect()
}

#[tokio::test]
async fn classification_selects_least_cloudy_scene() {
    let backend = MockBackend::new()
        .with_scenes("LANDSAT/LT05/C01/T1_TOA", landsat5_scenes(&[20.0, 5.0, 40.0]))
        .with_samples(0, vec![labeled_row(Some(0.0), 1.0), labeled_row(Some(1.0), 2.0)])
        .with_samples(1, vec![labeled_row(Some(0.1), 1.0)]);

    let report = SupervisedClassification::default()
        .run(&backend)
        .await
        .unwrap();

    assert_eq!(report.scene.id, "scene-1");
    assert_eq!(report.scene.cloud_cover, Some(5.0));
}

#[tokio::test]
async fn training_uses_only_seed_zero_rows() {
    // Seed 0: two separable classes at 0.0 and 1.0.
    let training_rows = vec![
        labeled_row(Some(0.0), 1.0),
        labeled_row(Some(0.0), 1.0),
        labeled_row(Some(1.0), 2.0),
        labeled_row(Some(1.0), 2.0),
    ];
    // Seed 1: two easy rows plus one at 0.45 labeled 2. Trained on the
    // seed-0 centroids (0.0 and 1.0) it lands on class 1, a miss. If
    // training had leaked seed-1 rows the centroids would shift and the
    // miss would disappear, so 2/3 proves seed separation.
    let validation_rows = vec![
        labeled_row(Some(0.1), 1.0),
        labeled_row(Some(0.9), 2.0),
        labeled_row(Some(0.45), 2.0),
        labeled_row(None, 2.0), // dropped by the null filter
    ];

    let backend = MockBackend::new()
        .with_scenes("LANDSAT/LT05/C01/T1_TOA", landsat5_scenes(&[12.0]))
        .with_samples(0, training_rows)
        .with_samples(1, validation_rows);

    let pipeline = SupervisedClassification::default();
    let report = pipeline.run(&backend).await.unwrap();

    // Resubstitution on separable training data is perfect.
    assert!((report.training_accuracy - 1.0).abs() < 1e-12);
    // Held-out accuracy reflects only the seed-1 rows.
    assert!((report.validation_accuracy - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(report.validation_matrix.total(), 3);

    // The null-filtered validation table kept 3 of 4 rows.
    let artifacts = pipeline.build().unwrap();
    let validation = backend.fetch_table(&artifacts.validation).await.unwrap();
    assert_eq!(validation.len(), 3);
    assert!(!validation.has_nulls_in("B1"));
}

#[tokio::test]
async fn classification_renders_both_layers() {
    let backend = MockBackend::new()
        .with_scenes("LANDSAT/LT05/C01/T1_TOA", landsat5_scenes(&[1.0]))
        .with_samples(0, vec![labeled_row(Some(0.0), 1.0), labeled_row(Some(1.0), 2.0)])
        .with_samples(1, vec![labeled_row(Some(0.0), 1.0)]);

    let report = SupervisedClassification::default()
        .run(&backend)
        .await
        .unwrap();

    assert!(report.map.layer("landsat").is_some());
    assert!(report.map.layer("classification").is_some());
}

#[tokio::test]
async fn demo_fixtures_run_the_stock_classification() {
    let backend = MockBackend::demo();
    let report = SupervisedClassification::default()
        .run(&backend)
        .await
        .unwrap();

    // Demo clusters are well separated, so both numbers are high; the
    // exact values are a property of the mock, not of the service.
    assert!(report.training_accuracy > 0.9);
    assert!(report.validation_accuracy > 0.9);
    assert_eq!(report.training_matrix.labels(), &[0, 12, 16]);
    assert_eq!(report.scene.id, "LT05_138042_20111201");
}

#[tokio::test]
async fn no2_comparison_renders_two_named_overlays() {
    let backend = MockBackend::demo();
    let rendered = No2Comparison::default().run(&backend).await.unwrap();

    assert_eq!(rendered.layers.len(), 2);
    assert_eq!(rendered.layers[0].name, "Feb 2019");
    assert_eq!(rendered.layers[1].name, "Feb 2020");
    assert!(rendered.layers.iter().all(|l| l.url.starts_with("mock://")));
}

#[tokio::test]
async fn ndvi_change_renders_single_layer() {
    let backend = MockBackend::demo();
    let rendered = NdviChange::default().run(&backend).await.unwrap();

    assert_eq!(rendered.layers.len(), 1);
    assert_eq!(rendered.layers[0].name, "Changes of NDVI  from 2014 to 2017");
}
