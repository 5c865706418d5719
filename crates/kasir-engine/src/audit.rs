//! Audit rows written alongside every state change.
//!
//! Display and querying of the trail live outside this core; the write path
//! does not: each mutating service operation records exactly one entry in
//! the SAME database transaction as the change, so the trail cannot drift
//! from the data it describes.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use kasir_core::{Actor, AuditEntry};

/// Builds the audit row for one state-changing operation.
///
/// `detail` is a JSON object with the operation's load-bearing figures
/// (amounts, invoice numbers, differences), stored as text.
pub(crate) fn entry(
    actor: &Actor,
    action: &str,
    entity_type: &str,
    entity_id: &str,
    detail: Value,
) -> AuditEntry {
    AuditEntry {
        id: Uuid::new_v4().to_string(),
        actor_id: actor.actor_id.clone(),
        action: action.to_string(),
        entity_type: entity_type.to_string(),
        entity_id: entity_id.to_string(),
        detail: Some(detail.to_string()),
        created_at: Utc::now(),
    }
}
