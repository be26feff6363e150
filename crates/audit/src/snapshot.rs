//! Claim-snapshot sanitation.
//!
//! Tokens can carry arbitrary claims; the audit log may persist only a small
//! whitelisted subset so that snapshots never leak unexpected PII or
//! provider-internal fields.

use serde_json::{Map, Value};

/// The only claim keys that may appear in a persisted snapshot.
pub const SNAPSHOT_KEYS: &[&str] = &["sub", "org_id", "org_role", "sid", "iss", "session_id"];

/// Project a raw claim map onto [`SNAPSHOT_KEYS`].
///
/// Unknown keys are dropped silently. An empty projection yields `None`
/// (stored as SQL NULL), never an empty object.
pub fn sanitize_snapshot(raw: &Map<String, Value>) -> Option<Map<String, Value>> {
    let projected: Map<String, Value> = raw
        .iter()
        .filter(|(key, _)| SNAPSHOT_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if projected.is_empty() {
        None
    } else {
        Some(projected)
    }
}
