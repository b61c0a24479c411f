//! The reactive store facade read by the UI.
//!
//! A `StateStore` is constructed once at application start and passed by
//! reference to the UI layer. Every mutation runs synchronously, updates
//! in-memory state, then schedules a best-effort persistence write carrying
//! the full current snapshot. Writes never block the caller; completion
//! order does not matter because each write is a complete snapshot.

use crate::conversation::ConversationRegistry;
use crate::message::ChatMessage;
use crate::repository::{LocaleNotifier, SnapshotRepository};
use crate::settings::{QuerySettings, QuerySettingsUpdate, Settings, Theme};
use crate::snapshot::{Snapshot, SCHEMA_VERSION};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Holds settings, query defaults, and the conversation registry, and keeps
/// the persisted snapshot in sync with every mutation.
pub struct StateStore {
    settings: Settings,
    query_settings: QuerySettings,
    registry: ConversationRegistry,
    repository: Arc<dyn SnapshotRepository>,
    locale_notifier: Arc<dyn LocaleNotifier>,
}

impl StateStore {
    /// Creates a store hydrated from the repository's last snapshot, or
    /// from compile-time defaults on first launch.
    pub fn new(
        repository: Arc<dyn SnapshotRepository>,
        locale_notifier: Arc<dyn LocaleNotifier>,
    ) -> Self {
        match repository.load() {
            Some(snapshot) => Self::from_snapshot(snapshot, repository, locale_notifier),
            None => Self {
                settings: Settings::default(),
                query_settings: QuerySettings::default(),
                registry: ConversationRegistry::new(),
                repository,
                locale_notifier,
            },
        }
    }

    /// Rebuilds a store from an already-migrated snapshot.
    pub fn from_snapshot(
        snapshot: Snapshot,
        repository: Arc<dyn SnapshotRepository>,
        locale_notifier: Arc<dyn LocaleNotifier>,
    ) -> Self {
        Self {
            settings: snapshot.settings,
            query_settings: snapshot.query_settings,
            registry: ConversationRegistry::from_parts(
                snapshot.conversations,
                snapshot.conversation_id,
            ),
            repository,
            locale_notifier,
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Returns the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the current query defaults.
    pub fn query_settings(&self) -> &QuerySettings {
        &self.query_settings
    }

    /// Returns the id of the active conversation.
    pub fn active_conversation_id(&self) -> &str {
        self.registry.active_id()
    }

    /// Returns the active conversation's history.
    pub fn active_history(&self) -> &[ChatMessage] {
        self.registry.active_history()
    }

    /// Returns all stored conversations in id order.
    pub fn conversations(&self) -> &BTreeMap<String, Vec<ChatMessage>> {
        self.registry.conversations()
    }

    /// Computes the serializable snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SCHEMA_VERSION,
            settings: self.settings.clone(),
            query_settings: self.query_settings.clone(),
            conversations: self.registry.conversations().clone(),
            conversation_id: self.registry.active_id().to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Display settings
    // ------------------------------------------------------------------

    pub fn set_show_property_panel(&mut self, show: bool) {
        self.settings.display.show_property_panel = show;
        self.persist();
    }

    pub fn set_show_node_search_bar(&mut self, show: bool) {
        self.settings.display.show_node_search_bar = show;
        self.persist();
    }

    pub fn set_show_node_label(&mut self, show: bool) {
        self.settings.display.show_node_label = show;
        self.persist();
    }

    pub fn set_show_edge_label(&mut self, show: bool) {
        self.settings.display.show_edge_label = show;
        self.persist();
    }

    pub fn set_show_legend(&mut self, show: bool) {
        self.settings.display.show_legend = show;
        self.persist();
    }

    // ------------------------------------------------------------------
    // Graph settings (bounded fields clamp)
    // ------------------------------------------------------------------

    pub fn set_graph_query_max_depth(&mut self, depth: u32) {
        self.settings.graph.set_query_max_depth(depth);
        self.persist();
    }

    pub fn set_graph_max_nodes(&mut self, max_nodes: u32) {
        self.settings.graph.set_max_nodes(max_nodes);
        self.persist();
    }

    pub fn set_graph_layout_max_iterations(&mut self, iterations: u32) {
        self.settings.graph.set_layout_max_iterations(iterations);
        self.persist();
    }

    pub fn set_enable_node_drag(&mut self, enable: bool) {
        self.settings.graph.enable_node_drag = enable;
        self.persist();
    }

    pub fn set_enable_hide_unselected_edges(&mut self, enable: bool) {
        self.settings.graph.enable_hide_unselected_edges = enable;
        self.persist();
    }

    // ------------------------------------------------------------------
    // App settings
    // ------------------------------------------------------------------

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.app.theme = theme;
        self.persist();
    }

    /// Sets the UI language and notifies the localization subsystem.
    ///
    /// The notification is fire-and-forget; store consistency does not
    /// depend on it being delivered.
    pub fn set_language(&mut self, language: impl Into<String>) {
        let language = language.into();
        self.settings.app.language = language.clone();

        let notifier = Arc::clone(&self.locale_notifier);
        spawn_or_inline(move || notifier.locale_changed(&language));
        self.persist();
    }

    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.settings.app.api_key = api_key;
        self.persist();
    }

    pub fn set_enable_health_check(&mut self, enable: bool) {
        self.settings.app.enable_health_check = enable;
        self.persist();
    }

    // ------------------------------------------------------------------
    // Query defaults
    // ------------------------------------------------------------------

    /// Shallow-merges a partial update into the query defaults.
    pub fn update_query_settings(&mut self, update: QuerySettingsUpdate) {
        update.apply(&mut self.query_settings);
        self.persist();
    }

    // ------------------------------------------------------------------
    // Conversations
    // ------------------------------------------------------------------

    /// Creates a fresh empty conversation, makes it active, returns its id.
    pub fn create_conversation(&mut self) -> String {
        let id = self.registry.create();
        self.persist();
        id
    }

    /// Makes `id` the active conversation. Unknown ids are not auto-created.
    pub fn switch_conversation(&mut self, id: impl Into<String>) {
        self.registry.switch(id);
        self.persist();
    }

    /// Deletes a conversation; no-op for unknown ids.
    pub fn delete_conversation(&mut self, id: &str) {
        self.registry.delete(id);
        self.persist();
    }

    /// Replaces the active conversation's history.
    pub fn set_history(&mut self, history: Vec<ChatMessage>) {
        self.registry.set_history(history);
        self.persist();
    }

    /// Appends messages to the active conversation, truncating to the
    /// retention limit.
    pub fn append_history(&mut self, messages: Vec<ChatMessage>) {
        self.registry.append_history(messages);
        self.persist();
    }

    // ------------------------------------------------------------------

    /// Schedules a best-effort write of the full current snapshot.
    fn persist(&self) {
        let snapshot = self.snapshot();
        let repository = Arc::clone(&self.repository);
        spawn_or_inline(move || repository.save(snapshot));
    }
}

/// Runs `task` on the tokio blocking pool when a runtime is available,
/// inline otherwise. Either way the caller never observes a failure.
fn spawn_or_inline<F>(task: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(task);
        }
        Err(_) => task(),
    }
}
