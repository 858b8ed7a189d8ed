//! Timestamp decomposition for `joinedAt`

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::record::QueueEventRecord;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Calendar columns derived from one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub day_of_week: u32,
    pub hour_of_day: u32,
    pub month: u32,
    pub day_of_month: u32,
}

impl CalendarFields {
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            day_of_week: dt.weekday().num_days_from_monday(),
            hour_of_day: dt.hour(),
            month: dt.month(),
            day_of_month: dt.day(),
        }
    }
}

/// Parse a `joinedAt` value.
///
/// Offset-carrying timestamps keep the wall-clock time of their own offset.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Calendar fields for a record: parsed `joined_at` wins, otherwise the
/// explicit per-field values (each may be missing on its own).
pub fn calendar_of(record: &QueueEventRecord) -> [Option<u32>; 4] {
    if let Some(fields) = record
        .joined_at
        .as_deref()
        .and_then(parse_timestamp)
        .map(|dt| CalendarFields::from_datetime(&dt))
    {
        return [
            Some(fields.day_of_week),
            Some(fields.hour_of_day),
            Some(fields.month),
            Some(fields.day_of_month),
        ];
    }

    if record.joined_at.is_some() {
        log::debug!("Unparseable joinedAt {:?}, ignoring", record.joined_at);
    }

    [
        record.day_of_week,
        record.hour_of_day,
        record.month,
        record.day_of_month,
    ]
}
