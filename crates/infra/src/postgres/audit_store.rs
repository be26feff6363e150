use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use dealgate_audit::{AuditEvent, AuditStore};
use dealgate_core::StoreError;

use super::map_sqlx_error;

/// Postgres-backed audit log. Append-only; rows are never updated.
#[derive(Debug, Clone)]
pub struct PgAuditStore {
    pool: Arc<PgPool>,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn append(&self, event: &AuditEvent) -> Result<(), StoreError> {
        let snapshot = event
            .claim_snapshot
            .as_ref()
            .map(|m| Value::Object(m.clone()));

        sqlx::query(
            r#"
            INSERT INTO audit_events
                (id, actor_id, target_id, organization_id, action, detail,
                 claim_snapshot, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.id)
        .bind(event.actor_id.as_uuid())
        .bind(event.target_id.as_uuid())
        .bind(event.organization_id.as_ref().map(|o| o.as_str().to_string()))
        .bind(event.action.as_str())
        .bind(&event.detail)
        .bind(snapshot)
        .bind(event.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append audit event", e))?;
        Ok(())
    }
}
