//! Predict Module - Prediction Facade
//!
//! [`Predictor`] is the inference layer: every call returns an explicit
//! `Result`. Substituting the heuristic fallback is a separate, explicit
//! step taken by the service (see [`fallback`]).

pub mod best_time;
pub mod fallback;

#[cfg(test)]
mod tests;

use chrono::NaiveDate;
use ndarray::Array1;
use thiserror::Error;

use crate::logic::features::{transform, LabelEncoders, QueueEventRecord};
use crate::logic::model::metrics::round_to;
use crate::logic::model::{Classifier, Estimator, ModelError, ModelKind, ModelSlot, ModelSlots, Regressor};
pub use best_time::BestTimeSlot;

/// Label of the positive no-show class
const NO_SHOW_CLASS: u32 = 1;

#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    #[error("{0} model is not trained")]
    NotFitted(ModelKind),

    #[error("{kind} inference failed: {source}")]
    Model {
        kind: ModelKind,
        #[source]
        source: ModelError,
    },

    #[error("{0} produced a non-finite value")]
    NonFinite(ModelKind),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Read-only inference over the current slots and encodings
pub struct Predictor<'a> {
    pub encoders: &'a LabelEncoders,
    pub slots: &'a ModelSlots,
}

impl Predictor<'_> {
    /// Minutes, clamped to >= 0, two decimals
    pub fn waiting_time(&self, record: &QueueEventRecord) -> Result<f64, PredictError> {
        let value = self.regress(&self.slots.waiting_time, record)?;
        Ok(round_to(value.max(0.0), 2))
    }

    /// Entries, clamped to >= 0, nearest integer
    pub fn queue_length(&self, record: &QueueEventRecord) -> Result<i64, PredictError> {
        let value = self.regress(&self.slots.queue_length, record)?;
        Ok(round_to(value, 0).max(0.0) as i64)
    }

    /// Positive-class probability, three decimals
    pub fn no_show(&self, record: &QueueEventRecord) -> Result<f64, PredictError> {
        let slot = &self.slots.no_show;
        let row = self.features(slot, record)?;
        let probability = slot
            .model
            .probability_of(row.view(), NO_SHOW_CLASS)
            .map_err(|source| PredictError::Model { kind: slot.kind, source })?;

        if !probability.is_finite() {
            return Err(PredictError::NonFinite(slot.kind));
        }
        Ok(round_to(probability.clamp(0.0, 1.0), 3))
    }

    /// Density, clamped to >= 0, two decimals
    pub fn peak_density(&self, record: &QueueEventRecord) -> Result<f64, PredictError> {
        let value = self.regress(&self.slots.peak_hours, record)?;
        Ok(round_to(value.max(0.0), 2))
    }

    /// Three best candidate hours for `service` on `day_of_week` (0 = Monday).
    ///
    /// A candidate whose inference fails takes the per-task fallback; only an
    /// invalid day or an unrankable result is an error.
    pub fn best_times(
        &self,
        service: &str,
        day_of_week: u32,
        today: NaiveDate,
    ) -> Result<Vec<BestTimeSlot>, PredictError> {
        if day_of_week > 6 {
            return Err(PredictError::InvalidRequest(format!(
                "day of week {} is outside 0..=6",
                day_of_week
            )));
        }

        let mut slots = Vec::with_capacity(best_time::CANDIDATE_HOURS.count());
        for (hour, record) in best_time::candidate_records(service, day_of_week, today) {
            let queue_length = self.queue_length(&record).unwrap_or_else(|e| {
                log::debug!("Candidate {}h queue length fell back: {}", hour, e);
                fallback::queue_length()
            });
            let waiting_time = self.waiting_time(&record).unwrap_or_else(|e| {
                log::debug!("Candidate {}h waiting time fell back: {}", hour, e);
                fallback::waiting_time(&record)
            });
            slots.push(BestTimeSlot { hour, queue_length, waiting_time });
        }

        best_time::rank(slots).ok_or(PredictError::NonFinite(ModelKind::WaitingTime))
    }

    fn regress<R: Regressor>(&self, slot: &ModelSlot<R>, record: &QueueEventRecord) -> Result<f64, PredictError> {
        let row = self.features(slot, record)?;
        let value = slot
            .model
            .predict(row.view())
            .map_err(|source| PredictError::Model { kind: slot.kind, source })?;

        if !value.is_finite() {
            return Err(PredictError::NonFinite(slot.kind));
        }
        Ok(value)
    }

    /// Transform-mode features restricted to the slot's trained columns
    fn features<M: Estimator>(&self, slot: &ModelSlot<M>, record: &QueueEventRecord) -> Result<Array1<f64>, PredictError> {
        if !slot.is_fitted() {
            return Err(PredictError::NotFitted(slot.kind));
        }

        let table = transform(std::slice::from_ref(record), self.encoders);
        table
            .row_vector(0, &slot.columns)
            .ok_or_else(|| PredictError::InvalidRequest("empty feature table".to_string()))
    }
}
