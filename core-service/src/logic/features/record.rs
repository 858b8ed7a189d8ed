use serde::{Deserialize, Serialize};

/// Lifecycle state of a queue entry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    #[serde(alias = "waiting")]
    Waiting,
    #[serde(alias = "serving")]
    Serving,
    #[serde(alias = "completed")]
    Completed,
    #[serde(rename = "No Show", alias = "no_show", alias = "noShow")]
    NoShow,
    #[serde(alias = "cancelled")]
    Cancelled,
    #[serde(other)]
    Other,
}

/// One observation from the queue-management application.
///
/// Every field is optional on the wire: missing numeric fields count as 0
/// downstream, missing categorical fields are unknown. A field holding a
/// value of the wrong shape reads as missing instead of failing the record.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueEventRecord {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub position_in_queue: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub total_in_queue: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub waiting_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub no_show: Option<bool>,
    #[serde(default, deserialize_with = "lenient::status", skip_serializing_if = "Option::is_none")]
    pub status: Option<QueueStatus>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,

    // Explicit calendar fields, used when `joined_at` is absent or unparseable
    #[serde(default, deserialize_with = "lenient::weekday", skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
    #[serde(default, deserialize_with = "lenient::hour", skip_serializing_if = "Option::is_none")]
    pub hour_of_day: Option<u32>,
    #[serde(default, deserialize_with = "lenient::month", skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, deserialize_with = "lenient::day", skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
}

impl QueueEventRecord {
    pub fn is_waiting(&self) -> bool {
        self.status == Some(QueueStatus::Waiting)
    }
}

/// Field readers that map unusable values to `None`
mod lenient {
    use std::ops::RangeInclusive;

    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::QueueStatus;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
    }

    /// Finite number, numeric strings included
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(as_number(Value::deserialize(d)?))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => Some(b),
            Value::Number(n) => n.as_f64().map(|v| v != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    pub fn status<'de, D: Deserializer<'de>>(d: D) -> Result<Option<QueueStatus>, D::Error> {
        Ok(match Value::deserialize(d)? {
            value @ Value::String(_) => QueueStatus::deserialize(value).ok(),
            _ => None,
        })
    }

    pub fn weekday<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        bounded(d, 0..=6)
    }

    pub fn hour<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        bounded(d, 0..=23)
    }

    pub fn month<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        bounded(d, 1..=12)
    }

    pub fn day<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        bounded(d, 1..=31)
    }

    /// Whole number inside `range`
    fn bounded<'de, D: Deserializer<'de>>(d: D, range: RangeInclusive<u32>) -> Result<Option<u32>, D::Error> {
        Ok(as_number(Value::deserialize(d)?)
            .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX))
            .map(|v| v as u32)
            .filter(|v| range.contains(v)))
    }

    fn as_number(value: Value) -> Option<f64> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number.filter(|v| v.is_finite())
    }
}
