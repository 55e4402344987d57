//! Filesystem data lake operations.
//!
//! Handles reading and writing the cup data:
//! - Normalized JSONL files, one per entity type
//! - Loading a validated, read-only snapshot for the standings engine

pub mod jsonl;
pub mod snapshot;

use std::path::PathBuf;
use thiserror::Error;

pub use jsonl::{EntityType, JsonlReader, JsonlWriter};
pub use snapshot::CupSnapshot;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Data that breaks a model invariant, rejected at load time
    #[error("Inconsistent data: {0}")]
    Inconsistent(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Path of the JSONL file holding one entity type.
    pub fn entity_path(&self, entity: EntityType) -> PathBuf {
        self.data_dir.join(entity.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
