//! Ingestion Buffer - records awaiting the next retrain cycle

use serde::{Deserialize, Serialize};

use crate::logic::features::QueueEventRecord;

/// Ordered records plus the length that triggers a retrain.
#[derive(Debug, Clone)]
pub struct IngestionBuffer {
    records: Vec<QueueEventRecord>,
    threshold: usize,
}

/// Buffer status information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferStatus {
    pub current_size: usize,
    pub required_size: usize,
    pub is_ready: bool,
    pub fill_percent: f32,
}

impl IngestionBuffer {
    pub fn new(threshold: usize) -> Self {
        Self {
            records: Vec::new(),
            threshold: threshold.max(1),
        }
    }

    /// Append a record, returning the new length
    pub fn push(&mut self, record: QueueEventRecord) -> usize {
        self.records.push(record);
        self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Has the buffer reached the retrain threshold?
    pub fn is_ready(&self) -> bool {
        self.records.len() >= self.threshold
    }

    /// Copy of the buffered records for a training pass
    pub fn snapshot(&self) -> Vec<QueueEventRecord> {
        self.records.clone()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn status(&self) -> BufferStatus {
        BufferStatus {
            current_size: self.records.len(),
            required_size: self.threshold,
            is_ready: self.is_ready(),
            fill_percent: (self.records.len() as f32 / self.threshold as f32 * 100.0).min(100.0),
        }
    }
}
