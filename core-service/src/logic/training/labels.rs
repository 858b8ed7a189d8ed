//! Label derivation per training task

use std::collections::HashMap;

use crate::logic::features::{FeatureColumn, FeatureTable, QueueEventRecord};

/// Raw waiting time, 0 when missing
pub fn waiting_time(records: &[QueueEventRecord]) -> Vec<f64> {
    records.iter().map(|r| r.waiting_time.unwrap_or(0.0)).collect()
}

/// Waiting entries in the same (day-of-week, hour) slot.
///
/// Batches without any status fall back to `totalInQueue`.
pub fn queue_length(records: &[QueueEventRecord], table: &FeatureTable) -> Vec<f64> {
    if has_status(records) {
        slot_counts(records, table, QueueEventRecord::is_waiting)
    } else {
        total_in_queue(records)
    }
}

/// No-show flag as {0, 1}, missing counts as 0
pub fn no_show(records: &[QueueEventRecord]) -> Vec<u32> {
    records.iter().map(|r| u32::from(r.no_show.unwrap_or(false))).collect()
}

/// Entries with a status in the same (day-of-week, hour) slot.
///
/// Batches without any status fall back to `totalInQueue`.
pub fn peak_density(records: &[QueueEventRecord], table: &FeatureTable) -> Vec<f64> {
    if has_status(records) {
        slot_counts(records, table, |r| r.status.is_some())
    } else {
        total_in_queue(records)
    }
}

fn has_status(records: &[QueueEventRecord]) -> bool {
    records.iter().any(|r| r.status.is_some())
}

fn total_in_queue(records: &[QueueEventRecord]) -> Vec<f64> {
    records.iter().map(|r| r.total_in_queue.unwrap_or(0.0)).collect()
}

/// Per-row count of matching rows sharing its (day-of-week, hour) key.
/// Rows without a full key are not grouped and get 0.
fn slot_counts<F>(records: &[QueueEventRecord], table: &FeatureTable, matches: F) -> Vec<f64>
where
    F: Fn(&QueueEventRecord) -> bool,
{
    let keys: Vec<Option<(i64, i64)>> = (0..records.len())
        .map(|i| {
            let day = table.value(i, FeatureColumn::DayOfWeek)?;
            let hour = table.value(i, FeatureColumn::HourOfDay)?;
            Some((day as i64, hour as i64))
        })
        .collect();

    let mut counts: HashMap<(i64, i64), f64> = HashMap::new();
    for (record, key) in records.iter().zip(&keys) {
        if let Some(key) = key {
            let entry = counts.entry(*key).or_insert(0.0);
            if matches(record) {
                *entry += 1.0;
            }
        }
    }

    keys.iter()
        .map(|key| key.and_then(|k| counts.get(&k).copied()).unwrap_or(0.0))
        .collect()
}
