//! Service Module - the explicit owner of all mutable prediction state
//!
//! `QueueMlService` holds the ingestion buffer, the four model slots, the
//! category encoding and the aggregate metadata. Callers share it behind a
//! single lock ([`SharedService`]); a retrain runs while that lock is held,
//! so no caller observes a half-updated buffer/encoder pair.


use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::logic::bootstrap;
use crate::logic::buffer::{BufferStatus, IngestionBuffer};
use crate::logic::config::MlConfig;
use crate::logic::features::{LabelEncoders, QueueEventRecord};
use crate::logic::model::{Estimator, ModelKind, ModelSlot, ModelSlots};
use crate::logic::predict::{fallback, BestTimeSlot, PredictError, Predictor};
use crate::logic::storage::{AggregateMetadata, ModelStore, StorageError};
use crate::logic::training::{TrainError, TrainingPipeline, TrainingReport};

pub type SharedService = Arc<Mutex<QueueMlService>>;

// ============================================================================
// RESULTS
// ============================================================================

/// Returned by every ingestion call
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IngestReceipt {
    pub buffered: bool,
    pub buffer_size: usize,
    pub trains_at: usize,
    pub total_records: u64,
}

/// What a retrain cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum RetrainOutcome {
    /// Buffer below the minimum-sample bar, nothing touched
    NotEnoughData { buffered: usize },
    /// At least one task scored; buffer consumed into `total_records`
    Trained(TrainingReport),
    /// Every task skipped; buffer discarded
    NothingTrained(TrainingReport),
    /// A task errored; buffer kept for the next cycle
    Failed(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelStatus {
    pub kind: ModelKind,
    pub fitted: bool,
    pub trained_samples: usize,
    pub trained_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceStatus {
    pub is_trained: bool,
    pub total_records: u64,
    pub buffer_size: usize,
    pub retrain_threshold: usize,
    pub buffer: BufferStatus,
    pub models: Vec<ModelStatus>,
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct QueueMlService {
    config: MlConfig,
    store: ModelStore,
    encoders: LabelEncoders,
    slots: ModelSlots,
    buffer: IngestionBuffer,
    metadata: AggregateMetadata,
}

impl QueueMlService {
    /// Open the models directory and restore whatever was persisted.
    ///
    /// Only failing to create the directory is fatal; unreadable artifacts
    /// are logged and treated as absent.
    pub fn open(config: MlConfig) -> Result<Self, StorageError> {
        let store = ModelStore::open(&config.models_dir)?;
        let mut service = Self {
            slots: ModelSlots::new(config.forest_params()),
            buffer: IngestionBuffer::new(config.retrain_every),
            encoders: LabelEncoders::new(),
            metadata: AggregateMetadata::default(),
            store,
            config,
        };

        service.encoders = load_or_absent("label encoders", service.store.load_encoders()).unwrap_or_default();
        service.metadata = load_or_absent("metadata", service.store.load_metadata()).unwrap_or_default();
        for kind in ModelKind::ALL {
            service.ensure_loaded(kind);
        }

        log::info!(
            "Prediction service ready at {} (trained: {}, total records: {})",
            service.store.dir().display(),
            service.metadata.is_trained,
            service.metadata.total_records
        );
        Ok(service)
    }

    pub fn into_shared(self) -> SharedService {
        Arc::new(Mutex::new(self))
    }

    pub fn encoders(&self) -> &LabelEncoders {
        &self.encoders
    }

    pub fn slots(&self) -> &ModelSlots {
        &self.slots
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Buffer one record; crossing the threshold retrains before returning
    pub fn ingest(&mut self, record: QueueEventRecord) -> IngestReceipt {
        let size = self.buffer.push(record);
        log::debug!("Buffered record {}/{}", size, self.buffer.threshold());

        if self.buffer.is_ready() {
            self.retrain();
        }

        IngestReceipt {
            buffered: true,
            buffer_size: self.buffer.len(),
            trains_at: self.buffer.threshold(),
            total_records: self.metadata.total_records,
        }
    }

    /// Run all four tasks over the buffered records
    pub fn retrain(&mut self) -> RetrainOutcome {
        let buffered = self.buffer.len();
        if buffered < self.config.min_samples {
            log::debug!("Retrain skipped, {} buffered records", buffered);
            return RetrainOutcome::NotEnoughData { buffered };
        }

        log::info!("Retraining on {} buffered records", buffered);
        let records = self.buffer.snapshot();
        let report = match self.pipeline().train_all(&records) {
            Ok(report) => report,
            Err(e) => {
                log::error!("Retrain failed, keeping {} buffered records: {}", buffered, e);
                return RetrainOutcome::Failed(e.to_string());
            }
        };

        self.buffer.clear();
        if !report.any_scored() {
            log::warn!("No model trained, discarding {} buffered records", buffered);
            return RetrainOutcome::NothingTrained(report);
        }

        self.metadata.is_trained = true;
        self.metadata.total_records += buffered as u64;
        if let Err(e) = self.store.save_metadata(&self.metadata) {
            log::error!("Failed to save metadata: {}", e);
        }
        log::info!("Retrain complete, total records {}", self.metadata.total_records);
        RetrainOutcome::Trained(report)
    }

    /// Train every task on an explicit batch, bypassing the buffer
    pub fn bulk_train(&mut self, records: &[QueueEventRecord]) -> Result<TrainingReport, TrainError> {
        log::info!("Bulk training on {} records", records.len());
        let report = self.pipeline().train_all(records)?;
        if report.any_scored() {
            self.metadata.is_trained = true;
        }
        Ok(report)
    }

    /// Ingest the bootstrap sample records joined before the current time
    pub fn seed(&mut self) -> ServiceStatus {
        self.seed_with(Local::now().naive_local())
    }

    pub fn seed_with(&mut self, now: NaiveDateTime) -> ServiceStatus {
        for record in bootstrap::sample_records(now) {
            self.ingest(record);
        }
        self.status()
    }

    fn pipeline(&mut self) -> TrainingPipeline<'_> {
        TrainingPipeline {
            config: &self.config,
            store: &self.store,
            encoders: &mut self.encoders,
            slots: &mut self.slots,
        }
    }

    // ------------------------------------------------------------------
    // Prediction
    // ------------------------------------------------------------------

    pub fn predict_waiting_time(&mut self, record: &QueueEventRecord) -> f64 {
        self.ensure_loaded(ModelKind::WaitingTime);
        self.predictor()
            .waiting_time(record)
            .unwrap_or_else(|e| fallen_back(e, fallback::waiting_time(record)))
    }

    pub fn predict_queue_length(&mut self, record: &QueueEventRecord) -> i64 {
        self.ensure_loaded(ModelKind::QueueLength);
        self.predictor()
            .queue_length(record)
            .unwrap_or_else(|e| fallen_back(e, fallback::queue_length()))
    }

    pub fn predict_no_show(&mut self, record: &QueueEventRecord) -> f64 {
        self.ensure_loaded(ModelKind::NoShow);
        self.predictor()
            .no_show(record)
            .unwrap_or_else(|e| fallen_back(e, fallback::no_show()))
    }

    pub fn predict_peak_density(&mut self, record: &QueueEventRecord) -> f64 {
        self.ensure_loaded(ModelKind::PeakHours);
        self.predictor()
            .peak_density(record)
            .unwrap_or_else(|e| fallen_back(e, fallback::peak_density()))
    }

    /// Three best hours; `day_of_week` (0 = Monday) defaults to today
    pub fn suggest_best_time(&mut self, service: &str, day_of_week: Option<u32>) -> Vec<BestTimeSlot> {
        self.suggest_best_time_on(service, day_of_week, Local::now().date_naive())
    }

    pub fn suggest_best_time_on(
        &mut self,
        service: &str,
        day_of_week: Option<u32>,
        today: NaiveDate,
    ) -> Vec<BestTimeSlot> {
        self.ensure_loaded(ModelKind::QueueLength);
        self.ensure_loaded(ModelKind::WaitingTime);

        let day = day_of_week.unwrap_or_else(|| today.weekday().num_days_from_monday());
        self.predictor()
            .best_times(service, day, today)
            .unwrap_or_else(|e| fallen_back(e, fallback::best_times()))
    }

    fn predictor(&self) -> Predictor<'_> {
        Predictor {
            encoders: &self.encoders,
            slots: &self.slots,
        }
    }

    /// Lazily pull a persisted slot (and the encodings) into memory
    fn ensure_loaded(&mut self, kind: ModelKind) {
        if self.slots.is_fitted(kind) || !self.store.has_slot(kind) {
            return;
        }

        let loaded = match kind {
            ModelKind::WaitingTime => reload(&self.store, &mut self.slots.waiting_time),
            ModelKind::QueueLength => reload(&self.store, &mut self.slots.queue_length),
            ModelKind::NoShow => reload(&self.store, &mut self.slots.no_show),
            ModelKind::PeakHours => reload(&self.store, &mut self.slots.peak_hours),
        };

        if loaded && kind.uses_encoding() && self.encoders.is_empty() {
            if let Some(encoders) = load_or_absent("label encoders", self.store.load_encoders()) {
                self.encoders = encoders;
            }
        }
    }

    // ------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            is_trained: self.metadata.is_trained,
            total_records: self.metadata.total_records,
            buffer_size: self.buffer.len(),
            retrain_threshold: self.buffer.threshold(),
            buffer: self.buffer.status(),
            models: vec![
                model_status(&self.slots.waiting_time),
                model_status(&self.slots.queue_length),
                model_status(&self.slots.no_show),
                model_status(&self.slots.peak_hours),
            ],
        }
    }
}

fn model_status<M: Estimator>(slot: &ModelSlot<M>) -> ModelStatus {
    ModelStatus {
        kind: slot.kind,
        fitted: slot.is_fitted(),
        trained_samples: slot.trained_samples,
        trained_at: slot.trained_at,
    }
}

fn fallen_back<T>(error: PredictError, value: T) -> T {
    log::warn!("Prediction fell back to heuristic: {}", error);
    value
}

fn load_or_absent<T>(what: &str, loaded: Result<Option<T>, StorageError>) -> Option<T> {
    loaded.unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable {}: {}", what, e);
        None
    })
}

/// Replace `slot` with its persisted version; true when one was loaded
fn reload<M: DeserializeOwned>(store: &ModelStore, slot: &mut ModelSlot<M>) -> bool {
    let kind = slot.kind;
    match load_or_absent(kind.label(), store.load_slot::<M>(kind)) {
        Some(loaded) => {
            log::info!("Loaded {} model ({} samples)", kind, loaded.trained_samples);
            *slot = loaded;
            true
        }
        None => false,
    }
}
