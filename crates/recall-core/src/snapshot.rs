//! The serializable snapshot persisted between launches.
//!
//! The wire format uses camelCase field names, inherited from the snapshot
//! layout this store replaces. Every field carries a serde default so a
//! partially-populated snapshot still hydrates; present-but-malformed data
//! is treated as corrupt by the repository and falls back to defaults.

use crate::message::ChatMessage;
use crate::settings::{QuerySettings, Settings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The current snapshot schema version.
///
/// Snapshots stored under an older version are upgraded by the migration
/// ladder before hydration; the version never decreases.
pub const SCHEMA_VERSION: u32 = 14;

/// The complete serializable state of the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// Schema version this snapshot conforms to.
    pub version: u32,
    /// Typed setting domains.
    pub settings: Settings,
    /// Query defaults merged into outgoing retrieval requests.
    pub query_settings: QuerySettings,
    /// Conversation id to message history.
    pub conversations: BTreeMap<String, Vec<ChatMessage>>,
    /// Id of the active conversation; a key of `conversations`.
    pub conversation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ChatMessage;
    use serde_json::json;

    #[test]
    fn test_wire_names_are_camel_case() {
        let mut snapshot = Snapshot {
            version: SCHEMA_VERSION,
            ..Default::default()
        };
        snapshot
            .conversations
            .insert("conv-1-abcdef".to_string(), vec![ChatMessage::user("hi")]);
        snapshot.conversation_id = "conv-1-abcdef".to_string();

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["version"], 14);
        assert!(value.get("querySettings").is_some());
        assert!(value.get("conversationId").is_some());
        assert!(value["settings"]["display"].get("showPropertyPanel").is_some());
    }

    #[test]
    fn test_missing_fields_hydrate_to_defaults() {
        let snapshot: Snapshot = serde_json::from_value(json!({"version": 14})).unwrap();
        assert_eq!(snapshot, Snapshot {
            version: SCHEMA_VERSION,
            ..Default::default()
        });
    }

    #[test]
    fn test_round_trip_preserves_message_metadata() {
        let mut msg = ChatMessage::assistant("answer");
        msg.extra.insert("sources".to_string(), json!(["doc-1", "doc-2"]));
        let mut snapshot = Snapshot::default();
        snapshot.conversations.insert("conv-1-abcdef".to_string(), vec![msg.clone()]);

        let value = serde_json::to_value(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back.conversations["conv-1-abcdef"][0], msg);
    }
}
