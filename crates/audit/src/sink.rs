use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use dealgate_core::{OrgId, StoreError, UserId};

use crate::event::{AuditAction, AuditEvent};
use crate::snapshot::sanitize_snapshot;

/// Persistence seam for audit events.
///
/// Implementations append a single row; they never retry and never swallow
/// errors. The caller decides what a failed audit write means (for claim
/// enforcement it fails the request).
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, event: &AuditEvent) -> Result<(), StoreError>;
}

/// Optional telemetry hook, invoked synchronously after persistence.
pub trait AuditPublisher: Send + Sync {
    fn publish(&self, event: &AuditEvent);
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Programmer error: an action tag outside the operation's domain.
    #[error("unsupported audit action: {0}")]
    UnsupportedAction(AuditAction),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Append-only audit sink.
///
/// One logging operation per action tag. Every operation persists the event
/// and then notifies the publisher, if one is registered.
#[derive(Clone)]
pub struct AuditSink {
    store: Arc<dyn AuditStore>,
    publisher: Option<Arc<dyn AuditPublisher>>,
}

impl AuditSink {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self {
            store,
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn AuditPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    async fn record(&self, event: AuditEvent) -> Result<AuditEvent, StoreError> {
        self.store.append(&event).await?;

        if let Some(publisher) = &self.publisher {
            publisher.publish(&event);
        }

        info!(
            action = %event.action,
            actor = %event.actor_id,
            target = %event.target_id,
            "audit event recorded"
        );

        Ok(event)
    }

    /// Record a role change performed by `actor` on `target`.
    pub async fn log_role_change(
        &self,
        actor: UserId,
        target: UserId,
        organization_id: Option<OrgId>,
        detail: impl Into<String>,
    ) -> Result<AuditEvent, StoreError> {
        self.record(AuditEvent::new(
            actor,
            target,
            organization_id,
            AuditAction::RoleChange,
            detail,
        ))
        .await
    }

    /// Record a user status transition.
    ///
    /// Accepts only `USER_DELETED` and `USER_RESTORED`; any other tag is a
    /// domain-rule violation, not a user-facing error.
    pub async fn log_user_status_change(
        &self,
        actor: UserId,
        target: UserId,
        organization_id: Option<OrgId>,
        action: AuditAction,
        detail: impl Into<String>,
    ) -> Result<AuditEvent, AuditError> {
        if !matches!(action, AuditAction::UserDeleted | AuditAction::UserRestored) {
            return Err(AuditError::UnsupportedAction(action));
        }

        Ok(self
            .record(AuditEvent::new(actor, target, organization_id, action, detail))
            .await?)
    }

    /// Record a claim mismatch detected during reconciliation.
    ///
    /// The event is self-affecting (`target == actor`) and carries the
    /// sanitized snapshot of the offending token's claims.
    pub async fn log_claim_mismatch(
        &self,
        actor: UserId,
        organization_id: Option<OrgId>,
        detail: impl Into<String>,
        claims: &Map<String, Value>,
    ) -> Result<AuditEvent, StoreError> {
        let event = AuditEvent::new(
            actor,
            actor,
            organization_id,
            AuditAction::ClaimMismatch,
            detail,
        )
        .with_snapshot(sanitize_snapshot(claims));

        self.record(event).await
    }

    /// Record the start of an impersonation session.
    pub async fn log_impersonation(
        &self,
        actor: UserId,
        target: UserId,
        organization_id: Option<OrgId>,
        detail: impl Into<String>,
    ) -> Result<AuditEvent, StoreError> {
        self.record(AuditEvent::new(
            actor,
            target,
            organization_id,
            AuditAction::Impersonation,
            detail,
        ))
        .await
    }

    /// Record a cross-tenant resource access detected below the core.
    pub async fn log_scope_violation(
        &self,
        actor: UserId,
        organization_id: Option<OrgId>,
        detail: impl Into<String>,
    ) -> Result<AuditEvent, StoreError> {
        self.record(AuditEvent::new(
            actor,
            actor,
            organization_id,
            AuditAction::ResourceScopeViolation,
            detail,
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    #[derive(Default)]
    struct MemStore {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditStore for MemStore {
        async fn append(&self, event: &AuditEvent) -> Result<(), StoreError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingPublisher {
        published: Mutex<Vec<AuditAction>>,
    }

    impl AuditPublisher for CountingPublisher {
        fn publish(&self, event: &AuditEvent) {
            self.published.lock().unwrap().push(event.action);
        }
    }

    struct FailingStore;

    #[async_trait]
    impl AuditStore for FailingStore {
        async fn append(&self, _event: &AuditEvent) -> Result<(), StoreError> {
            Err(StoreError::new("connection reset"))
        }
    }

    #[tokio::test]
    async fn role_change_is_persisted_and_published() {
        let store = Arc::new(MemStore::default());
        let publisher = Arc::new(CountingPublisher::default());
        let sink = AuditSink::new(store.clone()).with_publisher(publisher.clone());

        let actor = UserId::new();
        let target = UserId::new();
        let event = sink
            .log_role_change(actor, target, Some(OrgId::new("org_1")), "solo -> growth")
            .await
            .unwrap();

        assert_eq!(event.action, AuditAction::RoleChange);
        assert_eq!(event.actor_id, actor);
        assert_eq!(event.target_id, target);
        assert_eq!(store.events.lock().unwrap().len(), 1);
        assert_eq!(
            publisher.published.lock().unwrap().as_slice(),
            &[AuditAction::RoleChange]
        );
    }

    #[tokio::test]
    async fn status_change_rejects_foreign_actions() {
        let sink = AuditSink::new(Arc::new(MemStore::default()));
        let actor = UserId::new();

        let err = sink
            .log_user_status_change(actor, actor, None, AuditAction::RoleChange, "nope")
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::UnsupportedAction(AuditAction::RoleChange)));

        sink.log_user_status_change(actor, actor, None, AuditAction::UserDeleted, "bye")
            .await
            .unwrap();
        sink.log_user_status_change(actor, actor, None, AuditAction::UserRestored, "back")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn claim_mismatch_sanitizes_snapshot_and_targets_self() {
        let store = Arc::new(MemStore::default());
        let sink = AuditSink::new(store.clone());
        let actor = UserId::new();

        let claims = match json!({
            "sub": "user_ext",
            "org_id": "org_b",
            "email": "leak@example.com",
        }) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };

        let event = sink
            .log_claim_mismatch(actor, Some(OrgId::new("org_a")), "mismatch", &claims)
            .await
            .unwrap();

        assert_eq!(event.target_id, actor);
        let snapshot = event.claim_snapshot.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.contains_key("email"));

        let stored = &store.events.lock().unwrap()[0];
        assert_eq!(stored.action, AuditAction::ClaimMismatch);
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let sink = AuditSink::new(Arc::new(FailingStore));
        let actor = UserId::new();

        let result = sink.log_scope_violation(actor, None, "cross-tenant read").await;
        assert!(result.is_err());
    }
}
