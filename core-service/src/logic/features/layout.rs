//! Feature Layout - Column definitions per prediction task
//!
//! **This file controls the feature schema shared by training and inference.**
//!
//! A model is only ever fed the columns it was trained with, in the same
//! order. The CRC32 layout hash persisted with every model lets a loader
//! reject artifacts written against a different column contract.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when a column is added, removed or renamed
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// COLUMNS
// ============================================================================

/// A single numeric feature column.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum FeatureColumn {
    DayOfWeek,
    HourOfDay,
    Month,
    DayOfMonth,
    ServiceEncoded,
    PositionInQueue,
}

/// Total number of known columns
pub const COLUMN_COUNT: usize = 6;

/// Canonical column order
pub const ALL_COLUMNS: [FeatureColumn; COLUMN_COUNT] = [
    FeatureColumn::DayOfWeek,       // 0: Monday = 0 .. Sunday = 6
    FeatureColumn::HourOfDay,       // 1: 0..23
    FeatureColumn::Month,           // 2: 1..12
    FeatureColumn::DayOfMonth,      // 3: 1..31
    FeatureColumn::ServiceEncoded,  // 4: category id, -1 when unseen
    FeatureColumn::PositionInQueue, // 5: raw position
];

impl FeatureColumn {
    pub fn index(self) -> usize {
        match self {
            FeatureColumn::DayOfWeek => 0,
            FeatureColumn::HourOfDay => 1,
            FeatureColumn::Month => 2,
            FeatureColumn::DayOfMonth => 3,
            FeatureColumn::ServiceEncoded => 4,
            FeatureColumn::PositionInQueue => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::DayOfWeek => "dayOfWeek",
            FeatureColumn::HourOfDay => "hourOfDay",
            FeatureColumn::Month => "month",
            FeatureColumn::DayOfMonth => "dayOfMonth",
            FeatureColumn::ServiceEncoded => "service_encoded",
            FeatureColumn::PositionInQueue => "positionInQueue",
        }
    }
}

// ============================================================================
// TASK LAYOUTS
// ============================================================================

/// Calendar + service columns, shared by every task
const BASE: [FeatureColumn; 5] = [
    FeatureColumn::DayOfWeek,
    FeatureColumn::HourOfDay,
    FeatureColumn::Month,
    FeatureColumn::DayOfMonth,
    FeatureColumn::ServiceEncoded,
];

pub const WAITING_TIME_COLUMNS: &[FeatureColumn] = &[
    BASE[0], BASE[1], BASE[2], BASE[3], BASE[4],
    FeatureColumn::PositionInQueue,
];

pub const QUEUE_LENGTH_COLUMNS: &[FeatureColumn] = &BASE;

pub const NO_SHOW_COLUMNS: &[FeatureColumn] = &[
    BASE[0], BASE[1], BASE[2], BASE[3], BASE[4],
    FeatureColumn::PositionInQueue,
];

pub const PEAK_HOURS_COLUMNS: &[FeatureColumn] = &BASE;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version byte and the ordered column names
pub fn layout_hash(columns: &[FeatureColumn]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for column in columns {
        hasher.update(column.name().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Raised when a persisted column contract does not match its hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMismatchError {
    pub expected_hash: u32,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected {:08x}, got {:08x}",
            self.expected_hash, self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

pub fn validate_layout(columns: &[FeatureColumn], hash: u32) -> Result<(), LayoutMismatchError> {
    let expected = layout_hash(columns);
    if expected == hash {
        Ok(())
    } else {
        Err(LayoutMismatchError {
            expected_hash: expected,
            actual_hash: hash,
        })
    }
}
