use super::*;
use crate::logic::features::{CategoryEncoding, SERVICE_CATEGORY};
use crate::logic::features::layout::QUEUE_LENGTH_COLUMNS;
use crate::logic::model::{ForestParams, ForestRegressor, Regressor};
use ndarray::{array, Array2};

fn fitted_slot(kind: ModelKind) -> ModelSlot<ForestRegressor> {
    let mut model = ForestRegressor::new(ForestParams { n_estimators: 3, ..Default::default() });
    let x = Array2::from_shape_fn((6, 5), |(r, c)| (r + c) as f64);
    model.fit(&x, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

    let mut slot = ModelSlot::new(kind, model);
    slot.record_fit(QUEUE_LENGTH_COLUMNS.to_vec(), 6);
    slot
}

#[test]
fn test_open_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("models");

    let store = ModelStore::open(&path).unwrap();
    assert!(path.is_dir());
    assert_eq!(store.dir(), path.as_path());
}

#[test]
fn test_missing_artifacts_load_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::open(dir.path()).unwrap();

    assert!(store.load_slot::<ForestRegressor>(ModelKind::QueueLength).unwrap().is_none());
    assert!(store.load_encoders().unwrap().is_none());
    assert!(store.load_metadata().unwrap().is_none());
    assert!(!store.has_slot(ModelKind::QueueLength));
}

#[test]
fn test_save_load_slot_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::open(dir.path()).unwrap();
    let slot = fitted_slot(ModelKind::QueueLength);

    store.save_slot(&slot).unwrap();
    assert!(dir.path().join("queue_length_model.json").exists());

    let loaded = store.load_slot::<ForestRegressor>(ModelKind::QueueLength).unwrap().unwrap();
    assert!(loaded.is_fitted());
    assert_eq!(loaded.columns, slot.columns);
    assert_eq!(loaded.trained_samples, 6);

    let row = array![1.0, 2.0, 3.0, 4.0, 5.0];
    let diff = loaded.model.predict(row.view()).unwrap() - slot.model.predict(row.view()).unwrap();
    assert!(diff.abs() < 1e-9);
}

#[test]
fn test_reject_tampered_layout() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::open(dir.path()).unwrap();
    let mut slot = fitted_slot(ModelKind::QueueLength);
    slot.layout_hash = !slot.layout_hash;
    store.save_slot(&slot).unwrap();

    match store.load_slot::<ForestRegressor>(ModelKind::QueueLength) {
        Err(StorageError::LayoutMismatch { kind, .. }) => assert_eq!(kind, ModelKind::QueueLength),
        other => panic!("Expected LayoutMismatch error, got {:?}", other.map(|s| s.is_some())),
    }
}

#[test]
fn test_reject_wrong_kind() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::open(dir.path()).unwrap();
    let slot = fitted_slot(ModelKind::PeakHours);
    std::fs::write(
        store.slot_path(ModelKind::QueueLength),
        serde_json::to_vec(&slot).unwrap(),
    )
    .unwrap();

    assert!(matches!(
        store.load_slot::<ForestRegressor>(ModelKind::QueueLength),
        Err(StorageError::KindMismatch { found: ModelKind::PeakHours, .. })
    ));
}

#[test]
fn test_corrupt_artifact_is_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::open(dir.path()).unwrap();
    std::fs::write(dir.path().join(METADATA_FILE), b"{not json").unwrap();

    assert!(matches!(store.load_metadata(), Err(StorageError::Serialization(_))));
}

#[test]
fn test_encoders_and_metadata_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::open(dir.path()).unwrap();

    let mut encoders = LabelEncoders::new();
    encoders.set(SERVICE_CATEGORY, CategoryEncoding::fit(["General", "Cardiology"]));
    store.save_encoders(&encoders).unwrap();
    assert_eq!(store.load_encoders().unwrap(), Some(encoders));

    let metadata = AggregateMetadata { is_trained: true, total_records: 15 };
    store.save_metadata(&metadata).unwrap();
    assert_eq!(store.load_metadata().unwrap(), Some(metadata));
}
