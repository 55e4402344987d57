//! JSONL (JSON Lines) storage.
//!
//! JSONL is the source of truth for all cup data.
//! Each line is a valid JSON object representing one entity.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};
use crate::models::ResultType;

/// Entity types for JSONL storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Cup,
    Player,
    Team,
    Group,
    Arena,
    ResultType,
    Game,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Cup => "cups.jsonl",
            EntityType::Player => "players.jsonl",
            EntityType::Team => "teams.jsonl",
            EntityType::Group => "groups.jsonl",
            EntityType::Arena => "arenas.jsonl",
            EntityType::ResultType => "result_types.jsonl",
            EntityType::Game => "games.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a specific entity type.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.entity_path(entity))
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single entity to the file.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.append_batch(std::slice::from_ref(entity)).map(|_| ())
    }

    /// Append multiple entities to the file.
    pub fn append_batch(&self, entities: &[T]) -> Result<usize, StorageError> {
        if entities.is_empty() {
            return Ok(0);
        }

        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let count = write_lines(file, entities)?;
        debug!("Appended {} entities to {:?}", count, self.path);

        Ok(count)
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let count = write_lines(file, entities)?;
        info!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

fn write_lines<T: Serialize>(file: File, entities: &[T]) -> Result<usize, StorageError> {
    let mut writer = BufWriter::new(file);
    for entity in entities {
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;
    Ok(entities.len())
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a specific entity type.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.entity_path(entity))
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entities from the file. A missing file reads as empty;
    /// lines that fail to parse are logged and skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        index + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Read the file, failing if it does not exist.
    pub fn read_existing(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::PathNotFound(self.path.clone()));
        }
        self.read_all()
    }
}

/// Append the standard result types whose codes are not stored yet.
/// Returns how many were added.
pub fn merge_standard_result_types(config: &StorageConfig) -> Result<usize, StorageError> {
    let reader: JsonlReader<ResultType> = JsonlReader::for_entity(config, EntityType::ResultType);
    let known: HashSet<String> = reader.read_all()?.into_iter().map(|rt| rt.code).collect();

    let missing: Vec<ResultType> = ResultType::standard_set()
        .into_iter()
        .filter(|rt| !known.contains(&rt.code))
        .collect();

    let writer = JsonlWriter::for_entity(config, EntityType::ResultType);
    let added = writer.append_batch(&missing)?;
    info!("Added {} result types ({} already present)", added, known.len());
    Ok(added)
}
