//! Best-time suggestion: candidate synthesis and ranking

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::logic::features::QueueEventRecord;

/// Opening hours scanned for suggestions
pub const CANDIDATE_HOURS: RangeInclusive<u32> = 9..=17;

/// Suggestions returned
pub const SUGGESTION_COUNT: usize = 3;

const QUEUE_WEIGHT: f64 = 0.6;
const WAIT_WEIGHT: f64 = 0.4;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BestTimeSlot {
    pub hour: u32,
    pub queue_length: i64,
    pub waiting_time: f64,
}

impl BestTimeSlot {
    /// Lower is better
    pub fn score(&self) -> f64 {
        self.queue_length as f64 * QUEUE_WEIGHT + self.waiting_time * WAIT_WEIGHT
    }
}

/// One synthetic record per candidate hour, first in queue
pub fn candidate_records(service: &str, day_of_week: u32, today: NaiveDate) -> Vec<(u32, QueueEventRecord)> {
    CANDIDATE_HOURS
        .map(|hour| {
            let record = QueueEventRecord {
                service: Some(service.to_string()),
                day_of_week: Some(day_of_week),
                hour_of_day: Some(hour),
                month: Some(today.month()),
                day_of_month: Some(today.day()),
                position_in_queue: Some(1.0),
                ..Default::default()
            };
            (hour, record)
        })
        .collect()
}

/// Stable ascending sort by score, keep the best [`SUGGESTION_COUNT`].
///
/// `None` when a score is not finite.
pub fn rank(mut slots: Vec<BestTimeSlot>) -> Option<Vec<BestTimeSlot>> {
    if slots.iter().any(|s| !s.score().is_finite()) {
        return None;
    }
    slots.sort_by(|a, b| a.score().total_cmp(&b.score()));
    slots.truncate(SUGGESTION_COUNT);
    Some(slots)
}
