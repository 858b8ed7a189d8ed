//! Heuristic fallbacks substituted when inference fails

use super::best_time::BestTimeSlot;
use crate::logic::features::QueueEventRecord;

pub const MINUTES_PER_POSITION: f64 = 2.0;
pub const QUEUE_LENGTH: i64 = 10;
pub const NO_SHOW_PROBABILITY: f64 = 0.15;
pub const PEAK_DENSITY: f64 = 20.0;

/// Two minutes per position ahead
pub fn waiting_time(record: &QueueEventRecord) -> f64 {
    (record.position_in_queue.unwrap_or(0.0) * MINUTES_PER_POSITION).max(0.0)
}

pub fn queue_length() -> i64 {
    QUEUE_LENGTH
}

pub fn no_show() -> f64 {
    NO_SHOW_PROBABILITY
}

pub fn peak_density() -> f64 {
    PEAK_DENSITY
}

/// Fixed suggestion list
pub fn best_times() -> Vec<BestTimeSlot> {
    vec![
        BestTimeSlot { hour: 10, queue_length: 5, waiting_time: 10.0 },
        BestTimeSlot { hour: 14, queue_length: 7, waiting_time: 14.0 },
        BestTimeSlot { hour: 16, queue_length: 6, waiting_time: 12.0 },
    ]
}
