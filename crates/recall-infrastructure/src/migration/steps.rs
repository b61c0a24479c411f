//! The migration ladder.
//!
//! Thresholds are strictly increasing; each step documents the schema
//! change it repairs. Steps only touch the fields they own and coerce
//! malformed values to defaults rather than failing.

use super::{MigrationStep, StepFn};
use serde_json::{json, Map, Value};

const MAX_NODES_MIN: u64 = 10;
const MAX_NODES_MAX: u64 = 10_000;

/// All migration steps, in application order.
pub(crate) const LADDER: &[MigrationStep] = &[
    MigrationStep {
        threshold: 2,
        name: "add display.showEdgeLabel",
        apply: add_show_edge_label as StepFn,
    },
    MigrationStep {
        threshold: 4,
        name: "add querySettings.historyTurns",
        apply: add_history_turns as StepFn,
    },
    MigrationStep {
        threshold: 5,
        name: "drop deprecated display.sidebarCollapsed",
        apply: drop_sidebar_collapsed as StepFn,
    },
    MigrationStep {
        threshold: 7,
        name: "add graph.layoutMaxIterations, clamp legacy maxNodes",
        apply: repair_graph_settings as StepFn,
    },
    MigrationStep {
        threshold: 9,
        name: "coerce querySettings keyword lists to string arrays",
        apply: coerce_keyword_lists as StepFn,
    },
    MigrationStep {
        threshold: 10,
        name: "collapse retrievalHistory into the conversation registry",
        apply: collapse_retrieval_history as StepFn,
    },
    MigrationStep {
        threshold: 12,
        name: "add app.enableHealthCheck, drop deprecated app.apiBase",
        apply: repair_app_settings as StepFn,
    },
    MigrationStep {
        threshold: 14,
        name: "add querySettings.stream",
        apply: add_stream_flag as StepFn,
    },
];

/// Returns the object under `key`, replacing anything that is not an
/// object with an empty one.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    if !map.get(key).is_some_and(Value::is_object) {
        map.insert(key.to_string(), Value::Object(Map::new()));
    }
    // Safe to unwrap: the entry was just ensured to be an object.
    map.get_mut(key).and_then(Value::as_object_mut).unwrap()
}

fn settings_domain<'a>(root: &'a mut Map<String, Value>, domain: &str) -> &'a mut Map<String, Value> {
    let settings = object_entry(root, "settings");
    object_entry(settings, domain)
}

fn ensure_default(map: &mut Map<String, Value>, key: &str, default: Value) {
    if !map.contains_key(key) {
        map.insert(key.to_string(), default);
    }
}

fn add_show_edge_label(root: &mut Map<String, Value>, _ids: &mut dyn FnMut() -> String) {
    let display = settings_domain(root, "display");
    ensure_default(display, "showEdgeLabel", json!(false));
}

fn add_history_turns(root: &mut Map<String, Value>, _ids: &mut dyn FnMut() -> String) {
    let query_settings = object_entry(root, "querySettings");
    ensure_default(query_settings, "historyTurns", json!(3));
}

fn drop_sidebar_collapsed(root: &mut Map<String, Value>, _ids: &mut dyn FnMut() -> String) {
    settings_domain(root, "display").remove("sidebarCollapsed");
}

fn repair_graph_settings(root: &mut Map<String, Value>, _ids: &mut dyn FnMut() -> String) {
    let graph = settings_domain(root, "graph");
    ensure_default(graph, "layoutMaxIterations", json!(15));

    // Early builds let maxNodes grow unbounded; clamp into today's range.
    // A malformed value is removed so hydration falls back to the default.
    match graph.get("maxNodes").map(Value::as_u64) {
        Some(Some(n)) => {
            graph.insert(
                "maxNodes".to_string(),
                json!(n.clamp(MAX_NODES_MIN, MAX_NODES_MAX)),
            );
        }
        Some(None) => {
            graph.remove("maxNodes");
        }
        None => {}
    }
}

fn coerce_keyword_lists(root: &mut Map<String, Value>, _ids: &mut dyn FnMut() -> String) {
    let query_settings = object_entry(root, "querySettings");
    for key in ["hlKeywords", "llKeywords"] {
        let coerced = match query_settings.get(key) {
            None => continue,
            Some(Value::Array(items)) => {
                Value::Array(items.iter().filter(|v| v.is_string()).cloned().collect())
            }
            Some(_) => Value::Array(Vec::new()),
        };
        query_settings.insert(key.to_string(), coerced);
    }
}

/// Pre-v10 snapshots stored a single linear retrieval history. It becomes
/// the sole entry of the conversation registry, carried over unchanged,
/// keyed by a freshly generated id.
fn collapse_retrieval_history(root: &mut Map<String, Value>, ids: &mut dyn FnMut() -> String) {
    let history = match root.remove("retrievalHistory") {
        Some(history @ Value::Array(_)) => history,
        _ => Value::Array(Vec::new()),
    };

    if root.get("conversations").is_some_and(Value::is_object) {
        // A registry already exists (out-of-band repair); drop the legacy list.
        return;
    }

    let id = ids();
    let mut conversations = Map::new();
    conversations.insert(id.clone(), history);
    root.insert("conversations".to_string(), Value::Object(conversations));
    root.insert("conversationId".to_string(), Value::String(id));
}

fn repair_app_settings(root: &mut Map<String, Value>, _ids: &mut dyn FnMut() -> String) {
    let app = settings_domain(root, "app");
    ensure_default(app, "enableHealthCheck", json!(true));
    app.remove("apiBase");
}

fn add_stream_flag(root: &mut Map<String, Value>, _ids: &mut dyn FnMut() -> String) {
    let query_settings = object_entry(root, "querySettings");
    ensure_default(query_settings, "stream", json!(true));
}
