use chrono::NaiveDate;
use tempfile::tempdir;

use super::*;
use crate::logic::config::MlConfig;
use crate::logic::features::QueueStatus;
use crate::logic::storage::ModelStore;
use crate::logic::training::TrainingPipeline;

fn trained(dir: &std::path::Path) -> (LabelEncoders, ModelSlots) {
    let config = MlConfig {
        n_estimators: 10,
        ..MlConfig::with_models_dir(dir)
    };
    let store = ModelStore::open(dir).unwrap();
    let mut encoders = LabelEncoders::new();
    let mut slots = ModelSlots::new(config.forest_params());

    let records: Vec<QueueEventRecord> = (0..12)
        .map(|i| QueueEventRecord {
            service: Some(if i % 2 == 0 { "General" } else { "Cardiology" }.to_string()),
            position_in_queue: Some(f64::from(i % 5 + 1)),
            total_in_queue: Some(f64::from(i + 2)),
            waiting_time: Some(4.0 * f64::from(i % 5 + 1)),
            no_show: Some(i % 4 == 0),
            status: Some(QueueStatus::Waiting),
            joined_at: Some(format!("2024-03-{:02}T{:02}:00:00", 11 + i % 5, 9 + i % 8)),
            ..Default::default()
        })
        .collect();

    TrainingPipeline {
        config: &config,
        store: &store,
        encoders: &mut encoders,
        slots: &mut slots,
    }
    .train_all(&records)
    .unwrap();

    (encoders, slots)
}

#[test]
fn test_untrained_slots_report_not_fitted() {
    let encoders = LabelEncoders::new();
    let slots = ModelSlots::new(Default::default());
    let predictor = Predictor { encoders: &encoders, slots: &slots };
    let record = QueueEventRecord::default();

    assert_eq!(predictor.waiting_time(&record), Err(PredictError::NotFitted(ModelKind::WaitingTime)));
    assert_eq!(predictor.queue_length(&record), Err(PredictError::NotFitted(ModelKind::QueueLength)));
    assert_eq!(predictor.no_show(&record), Err(PredictError::NotFitted(ModelKind::NoShow)));
    assert_eq!(predictor.peak_density(&record), Err(PredictError::NotFitted(ModelKind::PeakHours)));
}

#[test]
fn test_predictions_are_in_range() {
    let dir = tempdir().unwrap();
    let (encoders, slots) = trained(dir.path());
    let predictor = Predictor { encoders: &encoders, slots: &slots };

    let record = QueueEventRecord {
        service: Some("General".to_string()),
        position_in_queue: Some(3.0),
        joined_at: Some("2024-03-13T10:00:00".to_string()),
        ..Default::default()
    };

    let wait = predictor.waiting_time(&record).unwrap();
    assert!(wait >= 0.0);
    assert_eq!(wait, round_to(wait, 2));

    assert!(predictor.queue_length(&record).unwrap() >= 0);

    let p = predictor.no_show(&record).unwrap();
    assert!((0.0..=1.0).contains(&p));
    assert_eq!(p, round_to(p, 3));

    assert!(predictor.peak_density(&record).unwrap() >= 0.0);
}

#[test]
fn test_unseen_service_and_missing_fields_still_predict() {
    let dir = tempdir().unwrap();
    let (encoders, slots) = trained(dir.path());
    let predictor = Predictor { encoders: &encoders, slots: &slots };

    let unseen = QueueEventRecord {
        service: Some("Dermatology".to_string()),
        position_in_queue: Some(2.0),
        ..Default::default()
    };
    assert!(predictor.waiting_time(&unseen).unwrap() >= 0.0);
    assert!(predictor.no_show(&unseen).is_ok());

    let empty = QueueEventRecord::default();
    assert!(predictor.queue_length(&empty).is_ok());
}

#[test]
fn test_fallback_values() {
    let record = QueueEventRecord {
        position_in_queue: Some(4.0),
        ..Default::default()
    };
    assert_eq!(fallback::waiting_time(&record), 8.0);
    assert_eq!(fallback::waiting_time(&QueueEventRecord::default()), 0.0);
    assert_eq!(fallback::queue_length(), 10);
    assert_eq!(fallback::no_show(), 0.15);
    assert_eq!(fallback::peak_density(), 20.0);

    let hours: Vec<u32> = fallback::best_times().iter().map(|s| s.hour).collect();
    assert_eq!(hours, vec![10, 14, 16]);
}

#[test]
fn test_candidates_cover_opening_hours() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let candidates = best_time::candidate_records("General", 2, today);

    assert_eq!(candidates.len(), 9);
    assert_eq!(candidates.first().map(|(h, _)| *h), Some(9));
    assert_eq!(candidates.last().map(|(h, _)| *h), Some(17));

    let (_, record) = &candidates[0];
    assert_eq!(record.day_of_week, Some(2));
    assert_eq!(record.month, Some(3));
    assert_eq!(record.day_of_month, Some(15));
    assert_eq!(record.position_in_queue, Some(1.0));
}

#[test]
fn test_rank_is_stable_and_truncated() {
    let slot = |hour, queue_length, waiting_time| BestTimeSlot { hour, queue_length, waiting_time };
    let ranked = best_time::rank(vec![
        slot(9, 10, 10.0),
        slot(10, 2, 5.0),
        slot(11, 4, 6.0),
        slot(12, 2, 5.0),
        slot(13, 1, 1.0),
    ])
    .unwrap();

    let hours: Vec<u32> = ranked.iter().map(|s| s.hour).collect();
    assert_eq!(hours, vec![13, 10, 12]);

    assert!(best_time::rank(vec![slot(9, 1, f64::NAN)]).is_none());
}

#[test]
fn test_best_times_ranked_within_opening_hours() {
    let dir = tempdir().unwrap();
    let (encoders, slots) = trained(dir.path());
    let predictor = Predictor { encoders: &encoders, slots: &slots };
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    let best = predictor.best_times("General", 2, today).unwrap();
    assert_eq!(best.len(), 3);
    assert!(best.iter().all(|s| best_time::CANDIDATE_HOURS.contains(&s.hour)));
    assert!(best.windows(2).all(|w| w[0].score() <= w[1].score()));

    assert!(matches!(
        predictor.best_times("General", 7, today),
        Err(PredictError::InvalidRequest(_))
    ));
}

#[test]
fn test_untrained_best_times_rank_fallback_candidates() {
    let encoders = LabelEncoders::new();
    let slots = ModelSlots::new(Default::default());
    let predictor = Predictor { encoders: &encoders, slots: &slots };
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    let best = predictor.best_times("General", 2, today).unwrap();
    let expected: Vec<BestTimeSlot> = [9, 10, 11]
        .into_iter()
        .map(|hour| BestTimeSlot { hour, queue_length: 10, waiting_time: 2.0 })
        .collect();
    assert_eq!(best, expected);
    assert_ne!(best, fallback::best_times());
}
