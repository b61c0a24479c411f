//! Raw snapshot file storage.
//!
//! Reads and writes the snapshot as JSON at a fixed path, using a tmp file
//! plus atomic rename so a crash mid-write never leaves a torn snapshot.
//! Each write gets its own uniquely-named tmp file, so saves scheduled from
//! rapid successive mutations can overlap without clobbering one another's
//! in-flight data. Returns `serde_json::Value` so migration can run before
//! hydration.

use serde_json::Value;
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur during snapshot storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("home directory unavailable")]
    HomeDirUnavailable,
    #[error("invalid snapshot path: {0}")]
    InvalidPath(String),
}

/// File-backed storage for the raw persisted snapshot.
pub struct SnapshotStorage {
    path: PathBuf,
}

impl SnapshotStorage {
    /// Creates a storage handle for the given snapshot file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a storage handle at the default location
    /// (`~/.recall/snapshot.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_location() -> Result<Self, StorageError> {
        let home_dir = dirs::home_dir().ok_or(StorageError::HomeDirUnavailable)?;
        Ok(Self::new(home_dir.join(".recall").join("snapshot.json")))
    }

    /// Returns the path this storage reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the raw snapshot.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: file existed and parsed as JSON
    /// - `Ok(None)`: file missing or empty (first launch)
    /// - `Err`: file exists but could not be read or parsed
    pub fn load(&self) -> Result<Option<Value>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    /// Saves the raw snapshot atomically.
    ///
    /// Writes to a uniquely-named tmp file in the same directory, fsyncs,
    /// then renames over the target, so the old snapshot stays intact on
    /// failure and overlapping saves each rename a complete file.
    pub fn save(&self, value: &Value) -> Result<(), StorageError> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| StorageError::InvalidPath("no parent directory".to_string()))?;
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(value)?;

        let mut tmp_file = NamedTempFile::new_in(parent)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.as_file().sync_all()?;
        tmp_file.persist(&self.path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }
}
