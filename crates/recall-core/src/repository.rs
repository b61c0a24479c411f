//! Seams between the store and its external collaborators.
//!
//! The store is constructed with implementations of these traits injected,
//! decoupling it from the concrete storage mechanism and from the
//! localization subsystem.

use crate::snapshot::Snapshot;

/// An abstract repository for snapshot persistence.
///
/// Durability is best-effort by contract: `save` swallows failures and
/// `load` treats anything unreadable as first launch. Implementations must
/// never surface errors to the store.
pub trait SnapshotRepository: Send + Sync {
    /// Loads the last saved snapshot, upgraded to the current schema.
    ///
    /// Returns `None` on first launch or when the stored data is
    /// unreadable.
    fn load(&self) -> Option<Snapshot>;

    /// Persists the snapshot, best-effort.
    ///
    /// Takes ownership so implementations can hand the write to a
    /// background task. Failures are logged and dropped, never retried.
    fn save(&self, snapshot: Snapshot);
}

/// Receives locale-change notifications when the language setting changes.
///
/// Fire-and-forget: a failed or ignored notification has no effect on
/// store consistency.
pub trait LocaleNotifier: Send + Sync {
    fn locale_changed(&self, language: &str);
}

/// A repository that never loads and discards every save.
///
/// Useful for ephemeral stores and tests.
#[derive(Debug, Default)]
pub struct NullSnapshotRepository;

impl SnapshotRepository for NullSnapshotRepository {
    fn load(&self) -> Option<Snapshot> {
        None
    }

    fn save(&self, _snapshot: Snapshot) {}
}

/// A notifier that drops every notification.
#[derive(Debug, Default)]
pub struct NullLocaleNotifier;

impl LocaleNotifier for NullLocaleNotifier {
    fn locale_changed(&self, _language: &str) {}
}
