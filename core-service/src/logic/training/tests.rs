use super::*;
use super::split::train_test_split;
use crate::logic::features::{QueueStatus, SERVICE_CATEGORY, transform};

fn config(dir: &std::path::Path) -> MlConfig {
    MlConfig {
        n_estimators: 8,
        ..MlConfig::with_models_dir(dir)
    }
}

fn record(service: &str, hour: u32, waiting: f64, no_show: bool, status: QueueStatus) -> QueueEventRecord {
    QueueEventRecord {
        service: Some(service.to_string()),
        position_in_queue: Some(f64::from(hour % 4 + 1)),
        total_in_queue: Some(f64::from(hour)),
        waiting_time: Some(waiting),
        no_show: Some(no_show),
        status: Some(status),
        joined_at: Some(format!("2024-03-15T{:02}:15:00", hour)),
        ..Default::default()
    }
}

fn batch(n: usize) -> Vec<QueueEventRecord> {
    (0..n)
        .map(|i| {
            let service = if i % 2 == 0 { "General" } else { "Cardiology" };
            record(service, 9 + (i % 4) as u32, 5.0 + 3.0 * i as f64, i % 3 == 0, QueueStatus::Waiting)
        })
        .collect()
}

#[test]
fn test_split_sizes_and_determinism() {
    let split = train_test_split(5, 0.2, 42);
    assert_eq!(split.test.len(), 1);
    assert_eq!(split.train.len(), 4);

    let split = train_test_split(11, 0.2, 42);
    assert_eq!(split.test.len(), 3);

    let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..11).collect::<Vec<_>>());

    assert_eq!(train_test_split(11, 0.2, 42), split);
}

#[test]
fn test_split_keeps_one_training_row() {
    let split = train_test_split(5, 0.99, 7);
    assert_eq!(split.train.len(), 1);
    assert_eq!(split.test.len(), 4);

    let single = train_test_split(1, 0.2, 7);
    assert_eq!(single.train, vec![0]);
    assert!(single.test.is_empty());
}

#[test]
fn test_queue_length_labels_count_waiting_per_slot() {
    let records = vec![
        record("General", 9, 1.0, false, QueueStatus::Waiting),
        record("General", 9, 1.0, false, QueueStatus::Completed),
        record("General", 9, 1.0, false, QueueStatus::Waiting),
        record("General", 10, 1.0, false, QueueStatus::Completed),
    ];
    let table = transform(&records, &LabelEncoders::new());

    assert_eq!(labels::queue_length(&records, &table), vec![2.0, 2.0, 2.0, 0.0]);
    assert_eq!(labels::peak_density(&records, &table), vec![3.0, 3.0, 3.0, 1.0]);
}

#[test]
fn test_labels_fall_back_to_total_in_queue_without_status() {
    let mut records = batch(3);
    records.iter_mut().for_each(|r| r.status = None);
    let table = transform(&records, &LabelEncoders::new());

    let expected: Vec<f64> = records.iter().map(|r| r.total_in_queue.unwrap()).collect();
    assert_eq!(labels::queue_length(&records, &table), expected);
    assert_eq!(labels::peak_density(&records, &table), expected);
}

#[test]
fn test_rows_without_time_key_get_zero() {
    let mut records = batch(2);
    records[1].joined_at = None;
    let table = transform(&records, &LabelEncoders::new());

    assert_eq!(labels::peak_density(&records, &table), vec![1.0, 0.0]);
}

#[test]
fn test_no_show_labels() {
    let mut records = batch(3);
    records[2].no_show = None;
    assert_eq!(labels::no_show(&records), vec![1, 0, 0]);
}

#[test]
fn test_insufficient_rows_skip_every_task() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let store = ModelStore::open(dir.path()).unwrap();
    let mut encoders = LabelEncoders::new();
    let mut slots = ModelSlots::new(config.forest_params());

    let mut pipeline = TrainingPipeline { config: &config, store: &store, encoders: &mut encoders, slots: &mut slots };
    let report = pipeline.train_all(&batch(4)).unwrap();

    assert!(!report.any_scored());
    for (_, task) in report.tasks() {
        assert!(task.message.as_deref().unwrap().contains("Waiting for real data"));
    }
    assert!(!store.has_slot(ModelKind::WaitingTime));
    assert!(!slots.is_fitted(ModelKind::WaitingTime));
}

#[test]
fn test_full_pass_fits_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let store = ModelStore::open(dir.path()).unwrap();
    let mut encoders = LabelEncoders::new();
    let mut slots = ModelSlots::new(config.forest_params());

    let mut pipeline = TrainingPipeline { config: &config, store: &store, encoders: &mut encoders, slots: &mut slots };
    let report = pipeline.train_all(&batch(12)).unwrap();

    assert!(report.waiting_time.is_scored());
    assert!(report.queue_length.is_scored());
    assert!(report.no_show.is_scored());
    assert!(report.peak_hours.is_scored());

    for kind in ModelKind::ALL {
        assert!(slots.is_fitted(kind), "{} should be fitted", kind);
        assert!(store.has_slot(kind));
    }
    assert_eq!(slots.waiting_time.columns.len(), 6);
    assert_eq!(slots.queue_length.columns.len(), 5);
    assert_eq!(slots.waiting_time.trained_samples, 9);

    let persisted = store.load_encoders().unwrap().unwrap();
    assert_eq!(persisted.get(SERVICE_CATEGORY).unwrap().classes(), &["Cardiology", "General"]);
}

#[test]
fn test_no_show_single_class_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let store = ModelStore::open(dir.path()).unwrap();
    let mut encoders = LabelEncoders::new();
    let mut slots = ModelSlots::new(config.forest_params());

    let mut records = batch(8);
    records.iter_mut().for_each(|r| r.no_show = Some(false));

    let mut pipeline = TrainingPipeline { config: &config, store: &store, encoders: &mut encoders, slots: &mut slots };
    let report = pipeline.train_no_show(&records).unwrap();

    assert_eq!(report.score, None);
    assert!(!slots.no_show.is_fitted());
    assert!(!store.has_slot(ModelKind::NoShow));
}

#[test]
fn test_columns_follow_batch_presence() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let store = ModelStore::open(dir.path()).unwrap();
    let mut encoders = LabelEncoders::new();
    let mut slots = ModelSlots::new(config.forest_params());

    let records: Vec<QueueEventRecord> = (0..6)
        .map(|i| QueueEventRecord {
            position_in_queue: Some(i as f64),
            waiting_time: Some(2.0 * i as f64),
            ..Default::default()
        })
        .collect();

    let mut pipeline = TrainingPipeline { config: &config, store: &store, encoders: &mut encoders, slots: &mut slots };
    assert!(pipeline.train_waiting_time(&records).unwrap().is_scored());

    assert_eq!(slots.waiting_time.columns, vec![FeatureColumn::PositionInQueue]);
    // No service column, nothing to persist for the encoder
    assert!(store.load_encoders().unwrap().is_none());
}

#[test]
fn test_report_serialises_like_the_http_contract() {
    let report = TaskReport::insufficient("Waiting for real data");
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json, serde_json::json!({ "score": null, "message": "Waiting for real data" }));

    let json = serde_json::to_value(TaskReport::scored(0.75)).unwrap();
    assert_eq!(json, serde_json::json!({ "score": 0.75 }));
}
