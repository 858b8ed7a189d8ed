//! Model Slots - one trainable artifact plus its column contract

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::estimator::Estimator;
use super::forest::{ForestClassifier, ForestParams, ForestRegressor};
use crate::logic::features::layout::{
    self, FeatureColumn, LayoutMismatchError,
    NO_SHOW_COLUMNS, PEAK_HOURS_COLUMNS, QUEUE_LENGTH_COLUMNS, WAITING_TIME_COLUMNS,
};

/// The four predictive capabilities
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    WaitingTime,
    QueueLength,
    NoShow,
    PeakHours,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::WaitingTime,
        ModelKind::QueueLength,
        ModelKind::NoShow,
        ModelKind::PeakHours,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ModelKind::WaitingTime => "waiting_time",
            ModelKind::QueueLength => "queue_length",
            ModelKind::NoShow => "no_show",
            ModelKind::PeakHours => "peak_hours",
        }
    }

    /// Artifact file name inside the models directory
    pub fn file_name(self) -> &'static str {
        match self {
            ModelKind::WaitingTime => "waiting_time_model.json",
            ModelKind::QueueLength => "queue_length_model.json",
            ModelKind::NoShow => "no_show_model.json",
            ModelKind::PeakHours => "peak_hours_model.json",
        }
    }

    /// Full column list this task draws from
    pub fn columns(self) -> &'static [FeatureColumn] {
        match self {
            ModelKind::WaitingTime => WAITING_TIME_COLUMNS,
            ModelKind::QueueLength => QUEUE_LENGTH_COLUMNS,
            ModelKind::NoShow => NO_SHOW_COLUMNS,
            ModelKind::PeakHours => PEAK_HOURS_COLUMNS,
        }
    }

    /// Whether the persisted artifact depends on the category encoding
    pub fn uses_encoding(self) -> bool {
        self.columns().contains(&FeatureColumn::ServiceEncoded)
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A model plus the exact columns (and order) it was last fitted on.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModelSlot<M> {
    pub kind: ModelKind,
    pub model: M,
    pub columns: Vec<FeatureColumn>,
    pub layout_hash: u32,
    pub trained_samples: usize,
    pub trained_at: Option<DateTime<Utc>>,
}

impl<M> ModelSlot<M> {
    pub fn new(kind: ModelKind, model: M) -> Self {
        Self {
            kind,
            model,
            columns: Vec::new(),
            layout_hash: layout::layout_hash(&[]),
            trained_samples: 0,
            trained_at: None,
        }
    }

    /// Stamp the column contract after a successful fit
    pub fn record_fit(&mut self, columns: Vec<FeatureColumn>, samples: usize) {
        self.layout_hash = layout::layout_hash(&columns);
        self.columns = columns;
        self.trained_samples = samples;
        self.trained_at = Some(Utc::now());
    }

    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        layout::validate_layout(&self.columns, self.layout_hash)
    }
}

impl<M: Estimator> ModelSlot<M> {
    pub fn is_fitted(&self) -> bool {
        self.model.is_fitted()
    }
}

/// The four slots owned by the service
#[derive(Debug, Clone)]
pub struct ModelSlots {
    pub waiting_time: ModelSlot<ForestRegressor>,
    pub queue_length: ModelSlot<ForestRegressor>,
    pub no_show: ModelSlot<ForestClassifier>,
    pub peak_hours: ModelSlot<ForestRegressor>,
}

impl ModelSlots {
    /// Untrained slots
    pub fn new(params: ForestParams) -> Self {
        Self {
            waiting_time: ModelSlot::new(ModelKind::WaitingTime, ForestRegressor::new(params)),
            queue_length: ModelSlot::new(ModelKind::QueueLength, ForestRegressor::new(params)),
            no_show: ModelSlot::new(ModelKind::NoShow, ForestClassifier::new(params)),
            peak_hours: ModelSlot::new(ModelKind::PeakHours, ForestRegressor::new(params)),
        }
    }

    pub fn is_fitted(&self, kind: ModelKind) -> bool {
        match kind {
            ModelKind::WaitingTime => self.waiting_time.is_fitted(),
            ModelKind::QueueLength => self.queue_length.is_fitted(),
            ModelKind::NoShow => self.no_show.is_fitted(),
            ModelKind::PeakHours => self.peak_hours.is_fitted(),
        }
    }
}
