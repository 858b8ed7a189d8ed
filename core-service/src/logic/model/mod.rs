//! Model Module - Model Slots and tree-ensemble estimators
//!
//! Training and inference go through the `Regressor` / `Classifier` traits,
//! so the forest can be swapped without touching the pipeline.

pub mod estimator;
pub mod tree;
pub mod forest;
pub mod metrics;
pub mod slot;


// Re-export common types
pub use estimator::{Classifier, Estimator, ModelError, Regressor};
pub use forest::{ForestClassifier, ForestParams, ForestRegressor};
pub use slot::{ModelKind, ModelSlot, ModelSlots};
