//! Logic Module - Prediction engine
//!
//! ## Architecture
//! - `features/` - Feature encoder (records -> numeric tables, category encodings)
//! - `model/` - Model slots and tree-ensemble estimators
//! - `training/` - Per-task training pipeline
//! - `storage/` - JSON artifact persistence
//! - `predict/` - Inference facade and heuristic fallbacks
//! - `service/` - The state owner tying everything together

pub mod config;
pub mod bootstrap;
pub mod buffer;

pub mod features;
pub mod model;
pub mod training;
pub mod storage;
pub mod predict;
pub mod service;
