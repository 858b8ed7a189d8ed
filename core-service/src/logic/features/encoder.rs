//! Categorical encoding state
//!
//! Ids are dense (`0..k`) over the sorted distinct values of the most recent
//! fit batch. Every fit replaces the previous mapping entirely, so ids are
//! not stable across retrains.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Deserialize, Serialize};

/// Category key for the service name
pub const SERVICE_CATEGORY: &str = "service";

/// Encoded value for a category unseen during the last fit
pub const UNSEEN_CATEGORY: i64 = -1;

/// Mapping from category value to dense integer id.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryEncoding {
    /// Sorted distinct values; the id of a value is its index
    classes: Vec<String>,
}

impl CategoryEncoding {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        Self {
            classes: distinct.into_iter().map(str::to_string).collect(),
        }
    }

    /// Id of `value`, or [`UNSEEN_CATEGORY`]
    pub fn encode(&self, value: &str) -> i64 {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map(|i| i as i64)
            .unwrap_or(UNSEEN_CATEGORY)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// All category encodings known to the process, keyed by category name.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelEncoders {
    encoders: BTreeMap<String, CategoryEncoding>,
}

impl LabelEncoders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: &str) -> Option<&CategoryEncoding> {
        self.encoders.get(category)
    }

    /// Replace the encoding for `category`
    pub fn set(&mut self, category: &str, encoding: CategoryEncoding) {
        self.encoders.insert(category.to_string(), encoding);
    }

    /// Read-only lookup; no encoding at all also yields the sentinel
    pub fn encode(&self, category: &str, value: &str) -> i64 {
        self.get(category)
            .map(|e| e.encode(value))
            .unwrap_or(UNSEEN_CATEGORY)
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}
