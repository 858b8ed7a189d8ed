//! Queue ML Core
//!
//! Adaptive queue prediction: buffers live queue events, periodically
//! retrains four tree-ensemble models (waiting time, queue length, no-show,
//! peak density) and serves predictions with heuristic fallbacks.

pub mod constants;
pub mod logic;

pub use logic::buffer::BufferStatus;
pub use logic::config::MlConfig;
pub use logic::features::{QueueEventRecord, QueueStatus};
pub use logic::model::ModelKind;
pub use logic::predict::BestTimeSlot;
pub use logic::service::{
    IngestReceipt, ModelStatus, QueueMlService, RetrainOutcome, ServiceStatus, SharedService,
};
pub use logic::storage::StorageError;
pub use logic::training::{TaskReport, TrainError, TrainingReport};
