use serde::{Deserialize, Serialize};

/// Summary state persisted after every scoring retrain cycle.
///
/// `total_records` only counts records consumed by a retrain that trained
/// at least one model; buffered records are not included.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateMetadata {
    #[serde(default)]
    pub is_trained: bool,
    #[serde(default)]
    pub total_records: u64,
}
