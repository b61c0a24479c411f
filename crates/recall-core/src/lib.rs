//! Domain layer of the Recall state store.
//!
//! Holds the typed setting domains, the conversation registry, the
//! serializable snapshot, and the [`StateStore`] facade the UI reads.
//! Persistence and schema migration live in `recall-infrastructure`,
//! injected through the [`SnapshotRepository`] seam.

pub mod conversation;
pub mod message;
pub mod repository;
pub mod settings;
pub mod snapshot;
pub mod store;

pub use conversation::{generate_conversation_id, ConversationRegistry, MAX_HISTORY_MESSAGES};
pub use message::{ChatMessage, MessageRole};
pub use repository::{LocaleNotifier, NullLocaleNotifier, NullSnapshotRepository, SnapshotRepository};
pub use settings::{
    AppSettings, DisplaySettings, GraphSettings, QueryMode, QuerySettings, QuerySettingsUpdate,
    Settings, Theme,
};
pub use snapshot::{Snapshot, SCHEMA_VERSION};
pub use store::StateStore;
