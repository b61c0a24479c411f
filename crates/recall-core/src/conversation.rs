//! Conversation registry and id generation.
//!
//! The registry owns every chat transcript plus the pointer to the active
//! conversation. The active history is derived on read from the map rather
//! than cached, so there is no redundant field to keep in sync.

use crate::message::ChatMessage;
use chrono::Utc;
use rand::Rng;
use std::collections::BTreeMap;

/// Maximum number of messages retained per conversation when appending.
pub const MAX_HISTORY_MESSAGES: usize = 20;

const ID_SUFFIX_LEN: usize = 6;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a conversation id of the form `conv-<millis>-<6 base36 chars>`.
///
/// Uniqueness is probabilistic: the timestamp plus random suffix makes a
/// collision unlikely, and collisions are accepted rather than detected.
pub fn generate_conversation_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("conv-{}-{}", millis, suffix)
}

/// The mapping from conversation id to message history, plus the active id.
///
/// Invariants held after every public operation:
/// - the registry is never empty (deleting the last conversation synthesizes
///   a fresh one)
/// - the active history is always `conversations[active_id]`, read through
///   [`ConversationRegistry::active_history`]
///
/// Exception: [`ConversationRegistry::switch`] with an unknown id leaves
/// `active_id` pointing at a non-existent entry while the derived history
/// reads empty. The upstream behavior never specified whether to auto-create
/// or reject, so the observed behavior is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRegistry {
    conversations: BTreeMap<String, Vec<ChatMessage>>,
    active_id: String,
}

impl ConversationRegistry {
    /// Creates a registry containing a single fresh empty conversation.
    pub fn new() -> Self {
        let id = generate_conversation_id();
        let mut conversations = BTreeMap::new();
        conversations.insert(id.clone(), Vec::new());
        Self {
            conversations,
            active_id: id,
        }
    }

    /// Rebuilds a registry from persisted parts, repairing broken invariants.
    ///
    /// An empty map gets a fresh conversation; an active id that is not a
    /// key falls back to the first stored key.
    pub fn from_parts(
        conversations: BTreeMap<String, Vec<ChatMessage>>,
        active_id: String,
    ) -> Self {
        if conversations.is_empty() {
            return Self::new();
        }
        let active_id = if conversations.contains_key(&active_id) {
            active_id
        } else {
            // Keys are BTreeMap-ordered, so this pick is stable.
            let first = conversations.keys().next().cloned().unwrap_or_default();
            tracing::debug!(
                "active conversation '{}' missing from snapshot, falling back to '{}'",
                active_id,
                first
            );
            first
        };
        Self {
            conversations,
            active_id,
        }
    }

    /// Returns the id of the active conversation.
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// Returns the active conversation's history, derived from the map.
    ///
    /// Reads empty when the active id has no entry (see [`Self::switch`]).
    pub fn active_history(&self) -> &[ChatMessage] {
        self.conversations
            .get(&self.active_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns all stored conversations in id order.
    pub fn conversations(&self) -> &BTreeMap<String, Vec<ChatMessage>> {
        &self.conversations
    }

    /// Looks up a conversation's history by id.
    pub fn history(&self, id: &str) -> Option<&[ChatMessage]> {
        self.conversations.get(id).map(Vec::as_slice)
    }

    /// Creates a fresh empty conversation, makes it active, returns its id.
    pub fn create(&mut self) -> String {
        let id = generate_conversation_id();
        self.conversations.insert(id.clone(), Vec::new());
        self.active_id = id.clone();
        id
    }

    /// Makes `id` the active conversation.
    ///
    /// An unknown id is not auto-created: the pointer is set anyway and the
    /// derived history reads empty until something writes to it.
    pub fn switch(&mut self, id: impl Into<String>) {
        self.active_id = id.into();
    }

    /// Removes `id` from the registry; no-op when unknown.
    ///
    /// When the active conversation is removed, the first remaining key
    /// becomes active; when none remain, a fresh empty conversation is
    /// synthesized so the registry never goes empty.
    pub fn delete(&mut self, id: &str) {
        if self.conversations.remove(id).is_none() {
            return;
        }
        if self.active_id == id {
            match self.conversations.keys().next() {
                Some(next) => self.active_id = next.clone(),
                None => {
                    self.create();
                }
            }
        }
    }

    /// Replaces the active conversation's stored history.
    ///
    /// If the active id has no entry (dangling pointer after a switch to an
    /// unknown id), the entry is created by this write.
    pub fn set_history(&mut self, history: Vec<ChatMessage>) {
        self.conversations.insert(self.active_id.clone(), history);
    }

    /// Appends messages to the active conversation, keeping at most the
    /// most recent [`MAX_HISTORY_MESSAGES`] entries.
    pub fn append_history(&mut self, messages: Vec<ChatMessage>) {
        let history = self.conversations.entry(self.active_id.clone()).or_default();
        history.extend(messages);
        if history.len() > MAX_HISTORY_MESSAGES {
            let excess = history.len() - MAX_HISTORY_MESSAGES;
            history.drain(..excess);
        }
    }
}

impl Default for ConversationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
