//! Training Module - Training Pipeline
//!
//! One operation per task. Each refits the category encoding from the batch,
//! derives its label column, checks the minimum-data bar, fits on an 80/20
//! seeded split, scores on the held-out rows and persists the slot.
//!
//! Insufficient data is a normal outcome (`score: None`), not an error.

pub mod labels;
pub mod split;

#[cfg(test)]
mod tests;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::config::MlConfig;
use crate::logic::features::{fit_transform, FeatureColumn, FeatureTable, LabelEncoders, QueueEventRecord};
use crate::logic::model::metrics::{round_to, score_classifier, score_regressor};
use crate::logic::model::{Classifier, ModelError, ModelKind, ModelSlot, ModelSlots, Regressor};
use crate::logic::storage::{ModelStore, StorageError};
use split::train_test_split;

const SCORE_DECIMALS: i32 = 4;

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of one training task
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskReport {
    /// Held-out score, `None` when the task was skipped
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TaskReport {
    pub fn scored(score: f64) -> Self {
        Self { score: Some(score), message: None }
    }

    pub fn insufficient(reason: impl Into<String>) -> Self {
        Self { score: None, message: Some(reason.into()) }
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }
}

/// Per-task outcomes of a full training pass
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub waiting_time: TaskReport,
    pub queue_length: TaskReport,
    pub no_show: TaskReport,
    pub peak_hours: TaskReport,
}

impl TrainingReport {
    pub fn any_scored(&self) -> bool {
        self.tasks().iter().any(|(_, r)| r.is_scored())
    }

    pub fn tasks(&self) -> [(ModelKind, &TaskReport); 4] {
        [
            (ModelKind::WaitingTime, &self.waiting_time),
            (ModelKind::QueueLength, &self.queue_length),
            (ModelKind::NoShow, &self.no_show),
            (ModelKind::PeakHours, &self.peak_hours),
        ]
    }
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("{kind} fit failed: {source}")]
    Model {
        kind: ModelKind,
        #[source]
        source: ModelError,
    },

    #[error("{kind} could not be persisted: {source}")]
    Storage {
        kind: ModelKind,
        #[source]
        source: StorageError,
    },
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Borrowed view of the state a training pass mutates
pub struct TrainingPipeline<'a> {
    pub config: &'a MlConfig,
    pub store: &'a ModelStore,
    pub encoders: &'a mut LabelEncoders,
    pub slots: &'a mut ModelSlots,
}

/// Feature table, trained columns and dense matrix for one task
struct Prepared {
    table: FeatureTable,
    columns: Vec<FeatureColumn>,
    x: Array2<f64>,
}

impl TrainingPipeline<'_> {
    /// All four tasks, in order; insufficient data never stops the pass
    pub fn train_all(&mut self, records: &[QueueEventRecord]) -> Result<TrainingReport, TrainError> {
        Ok(TrainingReport {
            waiting_time: self.train_waiting_time(records)?,
            queue_length: self.train_queue_length(records)?,
            no_show: self.train_no_show(records)?,
            peak_hours: self.train_peak_hours(records)?,
        })
    }

    pub fn train_waiting_time(&mut self, records: &[QueueEventRecord]) -> Result<TaskReport, TrainError> {
        let prepared = self.prepare(ModelKind::WaitingTime, records);
        let y = labels::waiting_time(records);
        fit_regression(self.config, self.store, self.encoders, &mut self.slots.waiting_time, prepared, y)
    }

    pub fn train_queue_length(&mut self, records: &[QueueEventRecord]) -> Result<TaskReport, TrainError> {
        let prepared = self.prepare(ModelKind::QueueLength, records);
        let y = labels::queue_length(records, &prepared.table);
        fit_regression(self.config, self.store, self.encoders, &mut self.slots.queue_length, prepared, y)
    }

    pub fn train_peak_hours(&mut self, records: &[QueueEventRecord]) -> Result<TaskReport, TrainError> {
        let prepared = self.prepare(ModelKind::PeakHours, records);
        let y = labels::peak_density(records, &prepared.table);
        fit_regression(self.config, self.store, self.encoders, &mut self.slots.peak_hours, prepared, y)
    }

    pub fn train_no_show(&mut self, records: &[QueueEventRecord]) -> Result<TaskReport, TrainError> {
        let prepared = self.prepare(ModelKind::NoShow, records);
        let y = labels::no_show(records);
        fit_classification(self.config, self.store, self.encoders, &mut self.slots.no_show, prepared, y)
    }

    fn prepare(&mut self, kind: ModelKind, records: &[QueueEventRecord]) -> Prepared {
        let table = fit_transform(records, self.encoders);
        let columns = table.present_columns(kind.columns());
        let x = table.matrix(&columns);
        Prepared { table, columns, x }
    }
}

fn check_min_samples(config: &MlConfig, kind: ModelKind, rows: usize) -> Option<TaskReport> {
    if rows >= config.min_samples {
        return None;
    }
    log::info!(
        "Not enough real data yet, skipping {} model ({}/{})",
        kind, rows, config.min_samples
    );
    Some(TaskReport::insufficient(format!(
        "Waiting for real data: need {} records, have {}",
        config.min_samples, rows
    )))
}

fn fit_regression<R: Regressor + Serialize>(
    config: &MlConfig,
    store: &ModelStore,
    encoders: &LabelEncoders,
    slot: &mut ModelSlot<R>,
    prepared: Prepared,
    y: Vec<f64>,
) -> Result<TaskReport, TrainError> {
    let kind = slot.kind;
    if let Some(report) = check_min_samples(config, kind, prepared.table.len()) {
        return Ok(report);
    }

    let split = train_test_split(y.len(), config.test_fraction, config.random_seed);
    let x_train = prepared.x.select(Axis(0), &split.train);
    let x_test = prepared.x.select(Axis(0), &split.test);
    let y_train: Vec<f64> = split.train.iter().map(|&i| y[i]).collect();
    let y_test: Vec<f64> = split.test.iter().map(|&i| y[i]).collect();

    slot.model
        .fit(&x_train, &y_train)
        .map_err(|source| TrainError::Model { kind, source })?;
    slot.record_fit(prepared.columns, split.train.len());

    let score = score_regressor(&slot.model, &x_test, &y_test)
        .map_err(|source| TrainError::Model { kind, source })?;

    persist(store, slot, encoders)?;
    Ok(scored(kind, score))
}

fn fit_classification<C: Classifier + Serialize>(
    config: &MlConfig,
    store: &ModelStore,
    encoders: &LabelEncoders,
    slot: &mut ModelSlot<C>,
    prepared: Prepared,
    y: Vec<u32>,
) -> Result<TaskReport, TrainError> {
    let kind = slot.kind;
    if let Some(report) = check_min_samples(config, kind, prepared.table.len()) {
        return Ok(report);
    }

    let mut distinct = y.clone();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() < 2 {
        log::info!("Not enough real data yet, skipping {} model (single class)", kind);
        return Ok(TaskReport::insufficient(
            "Waiting for real data: labels hold a single class",
        ));
    }

    let split = train_test_split(y.len(), config.test_fraction, config.random_seed);
    let x_train = prepared.x.select(Axis(0), &split.train);
    let x_test = prepared.x.select(Axis(0), &split.test);
    let y_train: Vec<u32> = split.train.iter().map(|&i| y[i]).collect();
    let y_test: Vec<u32> = split.test.iter().map(|&i| y[i]).collect();

    slot.model
        .fit(&x_train, &y_train)
        .map_err(|source| TrainError::Model { kind, source })?;
    slot.record_fit(prepared.columns, split.train.len());

    let score = score_classifier(&slot.model, &x_test, &y_test)
        .map_err(|source| TrainError::Model { kind, source })?;

    persist(store, slot, encoders)?;
    Ok(scored(kind, score))
}

fn scored(kind: ModelKind, score: f64) -> TaskReport {
    let score = round_to(score, SCORE_DECIMALS);
    log::info!("Trained {} model, held-out score {}", kind, score);
    TaskReport::scored(score)
}

/// Save the slot, plus the encodings when its columns depend on them
fn persist<M: Serialize>(
    store: &ModelStore,
    slot: &ModelSlot<M>,
    encoders: &LabelEncoders,
) -> Result<(), TrainError> {
    let kind = slot.kind;
    store
        .save_slot(slot)
        .map_err(|source| TrainError::Storage { kind, source })?;

    if slot.columns.contains(&FeatureColumn::ServiceEncoded) {
        store
            .save_encoders(encoders)
            .map_err(|source| TrainError::Storage { kind, source })?;
    }
    Ok(())
}
