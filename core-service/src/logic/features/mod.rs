//! Features Module - Feature Encoder
//!
//! Turns raw queue-event records into numeric feature tables and owns the
//! categorical-to-integer mapping state.

pub mod record;
pub mod layout;
pub mod time;
pub mod encoder;
pub mod table;


// Re-export common types
pub use record::{QueueEventRecord, QueueStatus};
pub use layout::{FeatureColumn, layout_hash, validate_layout, LayoutMismatchError};
pub use encoder::{CategoryEncoding, LabelEncoders, SERVICE_CATEGORY, UNSEEN_CATEGORY};
pub use table::{FeatureTable, fit_transform, transform};
