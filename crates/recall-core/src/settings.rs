//! Typed setting domains and query defaults.
//!
//! Every field has a compile-time default so a fresh launch (or a snapshot
//! missing the field) always yields a fully-populated record. Unrecognized
//! fields present in a loaded snapshot are ignored by serde and never
//! propagated back out.

use serde::{Deserialize, Serialize};

/// Bounds for the graph traversal depth used by the knowledge-graph panel.
pub const QUERY_MAX_DEPTH_BOUNDS: (u32, u32) = (1, 10);
/// Bounds for the number of nodes the graph view will render.
pub const MAX_NODES_BOUNDS: (u32, u32) = (10, 10_000);
/// Bounds for force-layout iterations.
pub const LAYOUT_MAX_ITERATIONS_BOUNDS: (u32, u32) = (1, 30);

/// UI color scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Retrieval mode merged into outgoing query requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Naive,
    Local,
    Global,
    Hybrid,
    #[default]
    Mix,
    Bypass,
}

/// Display flags for the main UI panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub show_property_panel: bool,
    pub show_node_search_bar: bool,
    pub show_node_label: bool,
    pub show_edge_label: bool,
    pub show_legend: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_property_panel: true,
            show_node_search_bar: true,
            show_node_label: true,
            show_edge_label: false,
            show_legend: false,
        }
    }
}

/// Rendering thresholds and interaction flags for the knowledge-graph view.
///
/// The integer fields are bounded; use the setters to keep values in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphSettings {
    pub query_max_depth: u32,
    pub max_nodes: u32,
    pub layout_max_iterations: u32,
    pub enable_node_drag: bool,
    pub enable_hide_unselected_edges: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            query_max_depth: 3,
            max_nodes: 1000,
            layout_max_iterations: 15,
            enable_node_drag: true,
            enable_hide_unselected_edges: true,
        }
    }
}

impl GraphSettings {
    /// Sets the traversal depth, clamped to its bounds.
    pub fn set_query_max_depth(&mut self, depth: u32) {
        let (lo, hi) = QUERY_MAX_DEPTH_BOUNDS;
        self.query_max_depth = depth.clamp(lo, hi);
    }

    /// Sets the node render limit, clamped to its bounds.
    pub fn set_max_nodes(&mut self, max_nodes: u32) {
        let (lo, hi) = MAX_NODES_BOUNDS;
        self.max_nodes = max_nodes.clamp(lo, hi);
    }

    /// Sets the layout iteration limit, clamped to its bounds.
    pub fn set_layout_max_iterations(&mut self, iterations: u32) {
        let (lo, hi) = LAYOUT_MAX_ITERATIONS_BOUNDS;
        self.layout_max_iterations = iterations.clamp(lo, hi);
    }
}

/// Application-level settings: theme, language, backend credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub theme: Theme,
    pub language: String,
    pub api_key: Option<String>,
    pub enable_health_check: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            language: "en".to_string(),
            api_key: None,
            enable_health_check: true,
        }
    }
}

/// All persisted setting domains.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub graph: GraphSettings,
    pub app: AppSettings,
}

/// Query defaults merged into every outgoing retrieval request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuerySettings {
    pub mode: QueryMode,
    pub response_type: String,
    pub top_k: u32,
    pub max_token_for_text_unit: u32,
    pub max_token_for_global_context: u32,
    pub max_token_for_local_context: u32,
    pub history_turns: u32,
    pub hl_keywords: Vec<String>,
    pub ll_keywords: Vec<String>,
    pub only_need_context: bool,
    pub only_need_prompt: bool,
    pub stream: bool,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            mode: QueryMode::Mix,
            response_type: "Multiple Paragraphs".to_string(),
            top_k: 10,
            max_token_for_text_unit: 4000,
            max_token_for_global_context: 4000,
            max_token_for_local_context: 4000,
            history_turns: 3,
            hl_keywords: Vec::new(),
            ll_keywords: Vec::new(),
            only_need_context: false,
            only_need_prompt: false,
            stream: true,
        }
    }
}

/// A partial update for [`QuerySettings`].
///
/// Unset fields retain their prior values; set fields overwrite. The merge
/// is shallow: keyword lists are replaced wholesale, not appended.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuerySettingsUpdate {
    pub mode: Option<QueryMode>,
    pub response_type: Option<String>,
    pub top_k: Option<u32>,
    pub max_token_for_text_unit: Option<u32>,
    pub max_token_for_global_context: Option<u32>,
    pub max_token_for_local_context: Option<u32>,
    pub history_turns: Option<u32>,
    pub hl_keywords: Option<Vec<String>>,
    pub ll_keywords: Option<Vec<String>>,
    pub only_need_context: Option<bool>,
    pub only_need_prompt: Option<bool>,
    pub stream: Option<bool>,
}

impl QuerySettingsUpdate {
    /// Applies this partial update to `target`, field by field.
    pub fn apply(self, target: &mut QuerySettings) {
        if let Some(mode) = self.mode {
            target.mode = mode;
        }
        if let Some(response_type) = self.response_type {
            target.response_type = response_type;
        }
        if let Some(top_k) = self.top_k {
            target.top_k = top_k;
        }
        if let Some(v) = self.max_token_for_text_unit {
            target.max_token_for_text_unit = v;
        }
        if let Some(v) = self.max_token_for_global_context {
            target.max_token_for_global_context = v;
        }
        if let Some(v) = self.max_token_for_local_context {
            target.max_token_for_local_context = v;
        }
        if let Some(v) = self.history_turns {
            target.history_turns = v;
        }
        if let Some(v) = self.hl_keywords {
            target.hl_keywords = v;
        }
        if let Some(v) = self.ll_keywords {
            target.ll_keywords = v;
        }
        if let Some(v) = self.only_need_context {
            target.only_need_context = v;
        }
        if let Some(v) = self.only_need_prompt {
            target.only_need_prompt = v;
        }
        if let Some(v) = self.stream {
            target.stream = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.display.show_property_panel);
        assert!(!settings.display.show_edge_label);
        assert_eq!(settings.graph.query_max_depth, 3);
        assert_eq!(settings.graph.max_nodes, 1000);
        assert_eq!(settings.app.theme, Theme::System);
        assert_eq!(settings.app.language, "en");
        assert!(settings.app.api_key.is_none());
    }

    #[test]
    fn test_graph_setters_clamp() {
        let mut graph = GraphSettings::default();
        graph.set_query_max_depth(0);
        assert_eq!(graph.query_max_depth, 1);
        graph.set_query_max_depth(99);
        assert_eq!(graph.query_max_depth, 10);
        graph.set_max_nodes(1);
        assert_eq!(graph.max_nodes, 10);
        graph.set_max_nodes(1_000_000);
        assert_eq!(graph.max_nodes, 10_000);
        graph.set_layout_max_iterations(500);
        assert_eq!(graph.layout_max_iterations, 30);
    }

    #[test]
    fn test_query_settings_partial_merge() {
        let mut qs = QuerySettings::default();
        let update = QuerySettingsUpdate {
            mode: Some(QueryMode::Hybrid),
            top_k: Some(20),
            hl_keywords: Some(vec!["security".to_string()]),
            ..Default::default()
        };
        update.apply(&mut qs);

        assert_eq!(qs.mode, QueryMode::Hybrid);
        assert_eq!(qs.top_k, 20);
        assert_eq!(qs.hl_keywords, vec!["security".to_string()]);
        // Unspecified fields keep their prior values.
        assert_eq!(qs.response_type, "Multiple Paragraphs");
        assert_eq!(qs.history_turns, 3);
        assert!(qs.stream);
    }

    #[test]
    fn test_update_deserializes_from_partial_json() {
        let update: QuerySettingsUpdate =
            serde_json::from_value(json!({"mode": "local", "stream": false})).unwrap();
        let mut qs = QuerySettings::default();
        update.apply(&mut qs);
        assert_eq!(qs.mode, QueryMode::Local);
        assert!(!qs.stream);
    }

    #[test]
    fn test_unknown_fields_are_ignored_on_load() {
        let raw = json!({
            "display": {"showPropertyPanel": false, "legacyToolbar": true},
            "app": {"language": "fr"}
        });
        let settings: Settings = serde_json::from_value(raw).unwrap();
        assert!(!settings.display.show_property_panel);
        assert_eq!(settings.app.language, "fr");

        let out = serde_json::to_value(&settings).unwrap();
        assert!(out["display"].get("legacyToolbar").is_none());
    }
}
