//! Feature Table - numeric rows derived from raw records
//!
//! Two modes:
//! - [`fit_transform`] refits the categorical encodings from the batch.
//! - [`transform`] only reads them; unseen values map to the sentinel.

use ndarray::{Array1, Array2};

use super::encoder::{CategoryEncoding, LabelEncoders, SERVICE_CATEGORY};
use super::layout::{FeatureColumn, ALL_COLUMNS, COLUMN_COUNT};
use super::record::QueueEventRecord;
use super::time::calendar_of;

type Row = [Option<f64>; COLUMN_COUNT];

/// Rows of optional values plus the set of columns present in the batch.
///
/// A column is present when at least one record provides it.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    rows: Vec<Row>,
    present: [bool; COLUMN_COUNT],
}

impl FeatureTable {
    fn from_rows(rows: Vec<Row>) -> Self {
        let mut present = [false; COLUMN_COUNT];
        for row in &rows {
            for (i, value) in row.iter().enumerate() {
                present[i] |= value.is_some();
            }
        }
        Self { rows, present }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: FeatureColumn) -> bool {
        self.present[column.index()]
    }

    /// `wanted` restricted to the present columns, order preserved
    pub fn present_columns(&self, wanted: &[FeatureColumn]) -> Vec<FeatureColumn> {
        wanted.iter().copied().filter(|c| self.has_column(*c)).collect()
    }

    pub fn value(&self, row: usize, column: FeatureColumn) -> Option<f64> {
        self.rows.get(row).and_then(|r| r[column.index()])
    }

    /// Dense matrix over `columns`, missing values filled with 0
    pub fn matrix(&self, columns: &[FeatureColumn]) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), columns.len()), |(r, c)| {
            self.rows[r][columns[c].index()].unwrap_or(0.0)
        })
    }

    /// One row over `columns`, missing values filled with 0
    pub fn row_vector(&self, row: usize, columns: &[FeatureColumn]) -> Option<Array1<f64>> {
        let values = self.rows.get(row)?;
        Some(columns.iter().map(|c| values[c.index()].unwrap_or(0.0)).collect())
    }
}

fn build_rows(records: &[QueueEventRecord], encoders: &LabelEncoders) -> Vec<Row> {
    records
        .iter()
        .map(|record| {
            let calendar = calendar_of(record);
            let mut row: Row = [None; COLUMN_COUNT];

            for (column, value) in ALL_COLUMNS.iter().take(4).zip(calendar) {
                row[column.index()] = value.map(f64::from);
            }
            row[FeatureColumn::ServiceEncoded.index()] = record
                .service
                .as_deref()
                .map(|s| encoders.encode(SERVICE_CATEGORY, s) as f64);
            row[FeatureColumn::PositionInQueue.index()] = record.position_in_queue;

            row
        })
        .collect()
}

/// Derive features and refit the service encoding from this batch.
///
/// When no record carries a service the previous encoding is left alone.
pub fn fit_transform(records: &[QueueEventRecord], encoders: &mut LabelEncoders) -> FeatureTable {
    let services: Vec<&str> = records.iter().filter_map(|r| r.service.as_deref()).collect();

    if !services.is_empty() {
        let encoding = CategoryEncoding::fit(services);
        log::debug!("Refit service encoding: {} classes", encoding.len());
        encoders.set(SERVICE_CATEGORY, encoding);
    }

    FeatureTable::from_rows(build_rows(records, encoders))
}

/// Derive features using the existing encodings only.
pub fn transform(records: &[QueueEventRecord], encoders: &LabelEncoders) -> FeatureTable {
    FeatureTable::from_rows(build_rows(records, encoders))
}
