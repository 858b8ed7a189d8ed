//! Storage Module - Persistence Layer
//!
//! One JSON artifact per model slot, one for the category encodings and one
//! for the aggregate metadata, all inside a single models directory.

pub mod metadata;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::logic::features::{LabelEncoders, LayoutMismatchError};
use crate::logic::model::{ModelKind, ModelSlot};
pub use metadata::AggregateMetadata;

pub const ENCODERS_FILE: &str = "label_encoders.json";
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} artifact rejected: {source}")]
    LayoutMismatch {
        kind: ModelKind,
        #[source]
        source: LayoutMismatchError,
    },

    #[error("{kind} artifact holds a {found} model")]
    KindMismatch { kind: ModelKind, found: ModelKind },
}

/// Directory-backed artifact store
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Open the store, creating the directory on first use
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, kind: ModelKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    pub fn has_slot(&self, kind: ModelKind) -> bool {
        self.slot_path(kind).exists()
    }

    /// Persist a fitted slot, overwriting any prior version
    pub fn save_slot<M: Serialize>(&self, slot: &ModelSlot<M>) -> Result<(), StorageError> {
        write_json(&self.slot_path(slot.kind), slot)
    }

    /// Load a slot; `Ok(None)` when no artifact exists
    pub fn load_slot<M: DeserializeOwned>(
        &self,
        kind: ModelKind,
    ) -> Result<Option<ModelSlot<M>>, StorageError> {
        let Some(slot) = read_json::<ModelSlot<M>>(&self.slot_path(kind))? else {
            return Ok(None);
        };

        if slot.kind != kind {
            return Err(StorageError::KindMismatch { kind, found: slot.kind });
        }
        slot.validate()
            .map_err(|source| StorageError::LayoutMismatch { kind, source })?;

        Ok(Some(slot))
    }

    pub fn save_encoders(&self, encoders: &LabelEncoders) -> Result<(), StorageError> {
        write_json(&self.dir.join(ENCODERS_FILE), encoders)
    }

    pub fn load_encoders(&self) -> Result<Option<LabelEncoders>, StorageError> {
        read_json(&self.dir.join(ENCODERS_FILE))
    }

    pub fn save_metadata(&self, metadata: &AggregateMetadata) -> Result<(), StorageError> {
        write_json(&self.dir.join(METADATA_FILE), metadata)
    }

    pub fn load_metadata(&self) -> Result<Option<AggregateMetadata>, StorageError> {
        read_json(&self.dir.join(METADATA_FILE))
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read(path)?;
    Ok(Some(serde_json::from_slice(&data)?))
}
