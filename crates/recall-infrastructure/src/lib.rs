//! Persistence layer of the Recall state store.
//!
//! Provides the JSON file storage, the snapshot migration ladder, and the
//! [`JsonSnapshotRepository`] wired into `recall-core` through its
//! `SnapshotRepository` seam.

pub mod json_snapshot_repository;
pub mod migration;
pub mod storage;

#[cfg(test)]
mod test_store_persistence;

pub use crate::json_snapshot_repository::JsonSnapshotRepository;
pub use crate::storage::{SnapshotStorage, StorageError};
