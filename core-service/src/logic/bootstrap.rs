//! Seed records for bootstrapping a fresh deployment

use chrono::{Duration, NaiveDateTime};

use crate::logic::features::{QueueEventRecord, QueueStatus};

/// Five sample observations joined 5..1 hours before `now`
pub fn sample_records(now: NaiveDateTime) -> Vec<QueueEventRecord> {
    let rows: [(&str, f64, f64, f64, bool, QueueStatus, i64); 5] = [
        ("General", 1.0, 4.0, 8.0, false, QueueStatus::Waiting, 5),
        ("General", 2.0, 6.0, 14.0, false, QueueStatus::Waiting, 4),
        ("Cardiology", 3.0, 10.0, 22.0, true, QueueStatus::NoShow, 3),
        ("General", 1.0, 3.0, 6.0, false, QueueStatus::Completed, 2),
        ("Cardiology", 5.0, 12.0, 30.0, false, QueueStatus::Waiting, 1),
    ];

    rows.into_iter()
        .map(|(service, position, total, waiting, no_show, status, hours_ago)| QueueEventRecord {
            service: Some(service.to_string()),
            position_in_queue: Some(position),
            total_in_queue: Some(total),
            waiting_time: Some(waiting),
            no_show: Some(no_show),
            status: Some(status),
            joined_at: Some(
                (now - Duration::hours(hours_ago))
                    .format("%Y-%m-%dT%H:%M:%S%.f")
                    .to_string(),
            ),
            ..Default::default()
        })
        .collect()
}
