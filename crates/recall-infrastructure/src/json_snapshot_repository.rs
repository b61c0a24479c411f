//! File-backed snapshot repository.
//!
//! Composes the raw file storage with the migration ladder: load reads the
//! raw value, upgrades it to the current schema, and hydrates the typed
//! snapshot. Durability is best-effort by contract, so every failure is
//! logged and swallowed here rather than surfaced to the store.

use crate::migration;
use crate::storage::{SnapshotStorage, StorageError};
use anyhow::{Context, Result};
use recall_core::snapshot::Snapshot;
use recall_core::SnapshotRepository;
use serde_json::Value;

/// Persists snapshots as a JSON file, migrating legacy data on load.
pub struct JsonSnapshotRepository {
    storage: SnapshotStorage,
}

impl JsonSnapshotRepository {
    /// Creates a repository over the given storage.
    pub fn new(storage: SnapshotStorage) -> Self {
        Self { storage }
    }

    /// Creates a repository at the default location (`~/.recall`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_location() -> Result<Self, StorageError> {
        Ok(Self::new(SnapshotStorage::default_location()?))
    }

    fn load_inner(&self) -> Result<Option<Snapshot>> {
        let Some(raw) = self.storage.load().context("failed to read snapshot file")? else {
            return Ok(None);
        };

        let stored_version = stored_version(&raw);
        let migrated = migration::migrate(raw, stored_version);
        let snapshot: Snapshot = serde_json::from_value(migrated)
            .context("migrated snapshot does not match the current schema")?;
        Ok(Some(snapshot))
    }

    fn save_inner(&self, snapshot: &Snapshot) -> Result<()> {
        let value = serde_json::to_value(snapshot).context("failed to serialize snapshot")?;
        self.storage
            .save(&value)
            .context("failed to write snapshot file")?;
        Ok(())
    }
}

/// Reads the stored schema version, treating anything unreadable as 0.
fn stored_version(raw: &Value) -> u32 {
    raw.get("version")
        .and_then(Value::as_u64)
        .map(|v| v.min(u64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

impl SnapshotRepository for JsonSnapshotRepository {
    fn load(&self) -> Option<Snapshot> {
        match self.load_inner() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    "unreadable snapshot at {:?}, starting from defaults: {:#}",
                    self.storage.path(),
                    e
                );
                None
            }
        }
    }

    fn save(&self, snapshot: Snapshot) {
        if let Err(e) = self.save_inner(&snapshot) {
            tracing::warn!("snapshot write failed (best-effort, not retried): {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::snapshot::SCHEMA_VERSION;
    use recall_core::ChatMessage;
    use serde_json::json;
    use tempfile::TempDir;

    fn repository_at(dir: &TempDir) -> JsonSnapshotRepository {
        JsonSnapshotRepository::new(SnapshotStorage::new(dir.path().join("snapshot.json")))
    }

    #[test]
    fn test_first_launch_loads_none() {
        let dir = TempDir::new().unwrap();
        assert!(repository_at(&dir).load().is_none());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let repository = repository_at(&dir);

        let mut snapshot = Snapshot {
            version: SCHEMA_VERSION,
            ..Default::default()
        };
        snapshot
            .conversations
            .insert("conv-1-abcdef".to_string(), vec![ChatMessage::user("hi")]);
        snapshot.conversation_id = "conv-1-abcdef".to_string();

        repository.save(snapshot.clone());
        assert_eq!(repository.load(), Some(snapshot));
    }

    #[test]
    fn test_legacy_snapshot_is_migrated_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        let legacy = json!({
            "version": 9,
            "retrievalHistory": [
                {"role": "user", "content": "q"},
                {"role": "assistant", "content": "a"}
            ]
        });
        std::fs::write(&path, serde_json::to_string(&legacy).unwrap()).unwrap();

        let repository = JsonSnapshotRepository::new(SnapshotStorage::new(path));
        let snapshot = repository.load().unwrap();

        assert_eq!(snapshot.version, SCHEMA_VERSION);
        assert_eq!(snapshot.conversations.len(), 1);
        let history = &snapshot.conversations[&snapshot.conversation_id];
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "q");
        assert_eq!(history[1].content, "a");
    }

    #[test]
    fn test_corrupt_file_loads_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{definitely not json").unwrap();

        let repository = JsonSnapshotRepository::new(SnapshotStorage::new(path));
        assert!(repository.load().is_none());
    }

    #[test]
    fn test_missing_version_field_treated_as_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{}").unwrap();

        let repository = JsonSnapshotRepository::new(SnapshotStorage::new(path));
        let snapshot = repository.load().unwrap();
        assert_eq!(snapshot.version, SCHEMA_VERSION);
        // The full ladder ran, so the registry has its synthesized entry.
        assert_eq!(snapshot.conversations.len(), 1);
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        // The parent "directory" is a regular file, so the write fails;
        // save must not panic or surface the error.
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let repository =
            JsonSnapshotRepository::new(SnapshotStorage::new(blocker.join("snapshot.json")));
        repository.save(Snapshot::default());
    }
}
