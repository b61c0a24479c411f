//! Snapshot schema migration.
//!
//! Legacy snapshots are upgraded by an ordered ladder of version-gated
//! steps folded over the raw JSON value. Each step is keyed by the minimum
//! version below which it must run and is defensive: an absent or
//! malformed optional field coerces to its default instead of failing.
//! Migration never raises.
//!
//! The fold is deterministic; the only non-pure input, conversation id
//! generation for the retrieval-history collapse, is injected so tests can
//! pin it.

mod steps;

use recall_core::generate_conversation_id;
use recall_core::snapshot::SCHEMA_VERSION;
use serde_json::{json, Map, Value};

pub(crate) type StepFn = fn(&mut Map<String, Value>, &mut dyn FnMut() -> String);

/// One version-gated transformation in the ladder.
///
/// Runs when the stored version is below `threshold`. Steps are ordered by
/// strictly increasing threshold and always apply in that order.
pub struct MigrationStep {
    pub(crate) threshold: u32,
    pub(crate) name: &'static str,
    pub(crate) apply: StepFn,
}

/// Upgrades a raw snapshot to the current schema version.
///
/// A snapshot already at (or somehow beyond) the current version is
/// returned unchanged.
pub fn migrate(raw: Value, stored_version: u32) -> Value {
    migrate_with(raw, stored_version, &mut generate_conversation_id)
}

/// Like [`migrate`], with the conversation id source injected.
///
/// Identical input, target version, and id sequence yield byte-identical
/// output.
pub fn migrate_with(
    raw: Value,
    stored_version: u32,
    ids: &mut dyn FnMut() -> String,
) -> Value {
    if stored_version >= SCHEMA_VERSION {
        tracing::debug!(
            "snapshot already at version {}, no migration needed",
            stored_version
        );
        return raw;
    }

    let mut root = match raw {
        Value::Object(map) => map,
        _ => {
            tracing::warn!("snapshot root is not an object, rebuilding from defaults");
            Map::new()
        }
    };

    let pending: Vec<&MigrationStep> = steps::LADDER
        .iter()
        .filter(|step| stored_version < step.threshold)
        .collect();
    tracing::info!(
        "migrating snapshot from version {} to {} ({} steps)",
        stored_version,
        SCHEMA_VERSION,
        pending.len()
    );

    for step in pending {
        tracing::debug!("migration step v{}: {}", step.threshold, step.name);
        (step.apply)(&mut root, ids);
    }

    root.insert("version".to_string(), json!(SCHEMA_VERSION));
    Value::Object(root)
}
