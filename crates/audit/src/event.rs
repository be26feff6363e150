use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use dealgate_core::{OrgId, UserId};

/// Action tag of an audit event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    RoleChange,
    UserDeleted,
    UserRestored,
    ClaimMismatch,
    Impersonation,
    ResourceScopeViolation,
}

impl AuditAction {
    /// Stable tag persisted in the audit log table.
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::RoleChange => "ROLE_CHANGE",
            AuditAction::UserDeleted => "USER_DELETED",
            AuditAction::UserRestored => "USER_RESTORED",
            AuditAction::ClaimMismatch => "CLAIM_MISMATCH",
            AuditAction::Impersonation => "IMPERSONATION",
            AuditAction::ResourceScopeViolation => "RESOURCE_SCOPE_VIOLATION",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ROLE_CHANGE" => Some(AuditAction::RoleChange),
            "USER_DELETED" => Some(AuditAction::UserDeleted),
            "USER_RESTORED" => Some(AuditAction::UserRestored),
            "CLAIM_MISMATCH" => Some(AuditAction::ClaimMismatch),
            "IMPERSONATION" => Some(AuditAction::Impersonation),
            "RESOURCE_SCOPE_VIOLATION" => Some(AuditAction::ResourceScopeViolation),
            _ => None,
        }
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only audit record.
///
/// # Invariants
/// - `actor_id` is always present; `target_id` equals `actor_id` for
///   self-affecting events (e.g. claim mismatches).
/// - `claim_snapshot` holds only whitelisted claim keys, or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub actor_id: UserId,
    pub target_id: UserId,
    pub organization_id: Option<OrgId>,
    pub action: AuditAction,
    pub detail: String,
    pub claim_snapshot: Option<Map<String, Value>>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        actor_id: UserId,
        target_id: UserId,
        organization_id: Option<OrgId>,
        action: AuditAction,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            actor_id,
            target_id,
            organization_id,
            action,
            detail: detail.into(),
            claim_snapshot: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_snapshot(mut self, snapshot: Option<Map<String, Value>>) -> Self {
        self.claim_snapshot = snapshot;
        self
    }
}
