//! Claim guard: per-request reconciliation of token claims with the
//! persisted user/organization record.
//!
//! The database is authoritative for the user's role; the identity provider
//! is authoritative for organization membership. Benign drift (a trusted
//! token naming an organization the database has not seen yet) is
//! auto-healed; everything else fails closed with a `CLAIM_MISMATCH` audit.

use std::sync::Arc;

use tracing::{debug, info, warn};

use dealgate_audit::AuditSink;
use dealgate_core::{OrgId, StoreError};

use crate::claims::TokenClaims;
use crate::error::AuthError;
use crate::models::{Organization, User};
use crate::roles::Role;
use crate::store::{OrganizationStore, UserStore};
use crate::verifier::TokenVerifier;

/// Produces a consistent `(User, Organization)` view per request or fails
/// closed.
#[derive(Clone)]
pub struct ClaimGuard {
    users: Arc<dyn UserStore>,
    orgs: Arc<dyn OrganizationStore>,
    verifier: Arc<dyn TokenVerifier>,
    audit: AuditSink,
}

impl ClaimGuard {
    pub fn new(
        users: Arc<dyn UserStore>,
        orgs: Arc<dyn OrganizationStore>,
        verifier: Arc<dyn TokenVerifier>,
        audit: AuditSink,
    ) -> Self {
        Self {
            users,
            orgs,
            verifier,
            audit,
        }
    }

    /// Authenticate a request from its (optional) bearer token.
    ///
    /// Returns the persisted user after claim reconciliation, possibly with a
    /// freshly populated `organization_id`.
    pub async fn authenticate(&self, bearer_token: Option<&str>) -> Result<User, AuthError> {
        let token = bearer_token.ok_or(AuthError::AuthRequired)?;

        let claims = self.verifier.verify(token).inspect_err(|e| {
            debug!(error = %e, "token verification failed");
        })?;

        let sub = claims.sub().ok_or(AuthError::InvalidClaims)?;

        let user = self
            .users
            .find_by_external_id(sub)
            .await?
            .ok_or(AuthError::UserUnregistered)?;

        self.enforce_claim_integrity(user, &claims).await
    }

    /// Reconcile token claims against the persisted record.
    ///
    /// Organization rules:
    /// - DB has an organization: the token must claim the same one.
    /// - DB has none but the token claims one: trust the token, lazily
    ///   create the organization, and persist the membership.
    ///
    /// Role rules: a role claim, when present, must decode to exactly the
    /// persisted role. An absent role claim is fine (role is a property of
    /// the DB, not of every token).
    pub async fn enforce_claim_integrity(
        &self,
        mut user: User,
        claims: &TokenClaims,
    ) -> Result<User, AuthError> {
        let org_claim = claims.organization_id();

        match (&user.organization_id, org_claim) {
            (Some(_), None) => {
                return Err(self
                    .claim_mismatch(&user, claims, "Missing organization claim".to_string())
                    .await);
            }
            (Some(db_org), Some(token_org)) if token_org != db_org.as_str() => {
                let detail = format!(
                    "Organization claim mismatch (token={token_org}, db={db_org})"
                );
                return Err(self.claim_mismatch(&user, claims, detail).await);
            }
            (Some(_), Some(_)) => {}
            (None, Some(token_org)) => {
                self.adopt_organization(&mut user, token_org).await?;
            }
            (None, None) => {}
        }

        if let Some(role_claim) = claims.org_role() {
            match role_claim.parse::<Role>() {
                Err(_) => {
                    return Err(self
                        .claim_mismatch(&user, claims, "Unknown role claim".to_string())
                        .await);
                }
                Ok(token_role) if token_role != user.role => {
                    let detail = format!(
                        "Role claim mismatch (token={token_role}, db={})",
                        user.role
                    );
                    return Err(self.claim_mismatch(&user, claims, detail).await);
                }
                Ok(_) => {}
            }
        }

        Ok(user)
    }

    /// Trusted token names an organization the DB is silent about: create it
    /// if needed and persist the membership. Covers the race where the
    /// provider provisions an org before its webhook lands.
    async fn adopt_organization(&self, user: &mut User, token_org: &str) -> Result<(), StoreError> {
        let org_id = OrgId::new(token_org);

        if self.orgs.find(&org_id).await?.is_none() {
            let org = Organization::provisional(org_id.clone());
            self.orgs.insert(&org).await?;
            info!(org_id = %org_id, "auto-created organization from trusted claim");
        }

        self.users.set_organization(user.id, &org_id).await?;
        user.organization_id = Some(org_id);
        Ok(())
    }

    /// Record exactly one `CLAIM_MISMATCH` audit (with sanitized snapshot)
    /// and fail the request. A failed audit write outranks the mismatch: it
    /// propagates as a store error so the request rolls back.
    async fn claim_mismatch(&self, user: &User, claims: &TokenClaims, detail: String) -> AuthError {
        warn!(user = %user.id, detail = %detail, "claim mismatch");

        match self
            .audit
            .log_claim_mismatch(user.id, user.organization_id.clone(), detail, claims.as_map())
            .await
        {
            Ok(_) => AuthError::InvalidClaims,
            Err(e) => AuthError::Store(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use dealgate_audit::{AuditAction, AuditEvent, AuditStore, SNAPSHOT_KEYS};
    use dealgate_core::UserId;

    #[derive(Default)]
    struct MemUsers {
        by_id: Mutex<HashMap<UserId, User>>,
    }

    impl MemUsers {
        fn seed(&self, user: User) {
            self.by_id.lock().unwrap().insert(user.id, user);
        }

        fn get(&self, id: UserId) -> Option<User> {
            self.by_id.lock().unwrap().get(&id).cloned()
        }
    }

    #[async_trait]
    impl UserStore for MemUsers {
        async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, StoreError> {
            Ok(self
                .by_id
                .lock()
                .unwrap()
                .values()
                .find(|u| u.external_id == external_id && u.deleted_at.is_none())
                .cloned())
        }

        async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
            Ok(self.get(id).filter(|u| u.deleted_at.is_none()))
        }

        async fn set_organization(&self, id: UserId, org_id: &OrgId) -> Result<(), StoreError> {
            if let Some(user) = self.by_id.lock().unwrap().get_mut(&id) {
                user.organization_id = Some(org_id.clone());
            }
            Ok(())
        }

        async fn set_role(&self, id: UserId, role: Role) -> Result<(), StoreError> {
            if let Some(user) = self.by_id.lock().unwrap().get_mut(&id) {
                user.role = role;
            }
            Ok(())
        }

        async fn set_deleted(&self, id: UserId, deleted: bool) -> Result<(), StoreError> {
            if let Some(user) = self.by_id.lock().unwrap().get_mut(&id) {
                user.deleted_at = deleted.then(chrono::Utc::now);
                user.is_active = !deleted;
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemOrgs {
        orgs: Mutex<HashMap<OrgId, Organization>>,
    }

    #[async_trait]
    impl OrganizationStore for MemOrgs {
        async fn find(&self, id: &OrgId) -> Result<Option<Organization>, StoreError> {
            Ok(self.orgs.lock().unwrap().get(id).cloned())
        }

        async fn insert(&self, org: &Organization) -> Result<(), StoreError> {
            self.orgs
                .lock()
                .unwrap()
                .entry(org.id.clone())
                .or_insert_with(|| org.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemAudit {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditStore for MemAudit {
        async fn append(&self, event: &AuditEvent) -> Result<(), StoreError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    /// Accepts any token and returns a fixed claim map.
    struct StaticVerifier(TokenClaims);

    impl TokenVerifier for StaticVerifier {
        fn verify(&self, _token: &str) -> Result<TokenClaims, crate::verifier::TokenError> {
            Ok(self.0.clone())
        }
    }

    struct Fixture {
        users: Arc<MemUsers>,
        orgs: Arc<MemOrgs>,
        audit_log: Arc<MemAudit>,
        guard: ClaimGuard,
    }

    fn fixture(claims: Value) -> Fixture {
        let users = Arc::new(MemUsers::default());
        let orgs = Arc::new(MemOrgs::default());
        let audit_log = Arc::new(MemAudit::default());

        let token_claims = match claims {
            Value::Object(m) => TokenClaims::new(m),
            _ => panic!("expected object"),
        };

        let guard = ClaimGuard::new(
            users.clone(),
            orgs.clone(),
            Arc::new(StaticVerifier(token_claims)),
            AuditSink::new(audit_log.clone()),
        );

        Fixture {
            users,
            orgs,
            audit_log,
            guard,
        }
    }

    fn mismatches(fix: &Fixture) -> Vec<AuditEvent> {
        fix.audit_log
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.action == AuditAction::ClaimMismatch)
            .cloned()
            .collect()
    }

    #[tokio::test]
    async fn missing_credentials_fail_closed() {
        let fix = fixture(json!({ "sub": "user_ext" }));
        let err = fix.guard.authenticate(None).await.unwrap_err();
        assert!(matches!(err, AuthError::AuthRequired));
    }

    #[tokio::test]
    async fn unknown_subject_is_unregistered() {
        let fix = fixture(json!({ "sub": "user_ghost" }));
        let err = fix.guard.authenticate(Some("token")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserUnregistered));
    }

    #[tokio::test]
    async fn token_without_sub_is_invalid() {
        let fix = fixture(json!({ "org_id": "org_a" }));
        let err = fix.guard.authenticate(Some("token")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClaims));
    }

    #[tokio::test]
    async fn org_mismatch_fails_and_audits_exactly_once() {
        let fix = fixture(json!({ "sub": "user_ext", "org_id": "org_b", "email": "x@y.z" }));
        let user =
            User::new("user_ext", "a@example.com", Role::Solo).with_organization(OrgId::new("org_a"));
        fix.users.seed(user);

        let err = fix.guard.authenticate(Some("token")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClaims));

        let events = mismatches(&fix);
        assert_eq!(events.len(), 1);
        assert!(events[0].detail.contains("org_b"));
        assert!(events[0].detail.contains("org_a"));

        let snapshot = events[0].claim_snapshot.as_ref().unwrap();
        assert_eq!(snapshot["sub"], json!("user_ext"));
        for key in snapshot.keys() {
            assert!(SNAPSHOT_KEYS.contains(&key.as_str()));
        }
    }

    #[tokio::test]
    async fn missing_org_claim_with_db_org_fails() {
        let fix = fixture(json!({ "sub": "user_ext" }));
        let user =
            User::new("user_ext", "a@example.com", Role::Solo).with_organization(OrgId::new("org_a"));
        fix.users.seed(user);

        let err = fix.guard.authenticate(Some("token")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClaims));

        let events = mismatches(&fix);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].detail, "Missing organization claim");
    }

    #[tokio::test]
    async fn trusted_claim_auto_creates_organization() {
        let fix = fixture(json!({ "sub": "user_ext", "org_id": "org_new", "org_role": "growth" }));
        let user = User::new("user_ext", "a@example.com", Role::Growth);
        let user_id = user.id;
        fix.users.seed(user);

        let resolved = fix.guard.authenticate(Some("token")).await.unwrap();
        assert_eq!(resolved.organization_id, Some(OrgId::new("org_new")));

        // Membership persisted, org created at starter.
        let persisted = fix.users.get(user_id).unwrap();
        assert_eq!(persisted.organization_id, Some(OrgId::new("org_new")));

        let org = fix.orgs.orgs.lock().unwrap().get(&OrgId::new("org_new")).cloned().unwrap();
        assert_eq!(org.subscription_tier, dealgate_core::Tier::Starter);
        assert_eq!(org.name, "Organization org_new");

        assert!(mismatches(&fix).is_empty());
    }

    #[tokio::test]
    async fn adoption_is_idempotent_when_org_exists() {
        let fix = fixture(json!({ "sub": "user_ext", "org_id": "org_known" }));
        let user = User::new("user_ext", "a@example.com", Role::Solo);
        fix.users.seed(user);
        fix.orgs
            .orgs
            .lock()
            .unwrap()
            .insert(OrgId::new("org_known"), Organization {
                id: OrgId::new("org_known"),
                name: "Acme Holdings".to_string(),
                slug: "acme".to_string(),
                subscription_tier: dealgate_core::Tier::Premium,
            });

        let resolved = fix.guard.authenticate(Some("token")).await.unwrap();
        assert_eq!(resolved.organization_id, Some(OrgId::new("org_known")));

        // Existing record is untouched.
        let org = fix.orgs.orgs.lock().unwrap().get(&OrgId::new("org_known")).cloned().unwrap();
        assert_eq!(org.name, "Acme Holdings");
        assert_eq!(org.subscription_tier, dealgate_core::Tier::Premium);
    }

    #[tokio::test]
    async fn role_claim_disagreement_fails_and_audits() {
        let fix = fixture(json!({ "sub": "user_ext", "orgRole": "enterprise" }));
        let user = User::new("user_ext", "a@example.com", Role::Solo);
        fix.users.seed(user);

        let err = fix.guard.authenticate(Some("token")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClaims));

        let events = mismatches(&fix);
        assert_eq!(events.len(), 1);
        assert!(events[0].detail.contains("token=enterprise"));
        assert!(events[0].detail.contains("db=solo"));
    }

    #[tokio::test]
    async fn unknown_role_claim_fails() {
        let fix = fixture(json!({ "sub": "user_ext", "org_role": "superuser" }));
        fix.users.seed(User::new("user_ext", "a@example.com", Role::Solo));

        let err = fix.guard.authenticate(Some("token")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClaims));
        assert_eq!(mismatches(&fix)[0].detail, "Unknown role claim");
    }

    #[tokio::test]
    async fn absent_role_claim_is_not_an_error() {
        let fix = fixture(json!({ "sub": "user_ext" }));
        fix.users.seed(User::new("user_ext", "a@example.com", Role::Enterprise));

        let resolved = fix.guard.authenticate(Some("token")).await.unwrap();
        assert_eq!(resolved.role, Role::Enterprise);
        assert!(mismatches(&fix).is_empty());
    }

    #[tokio::test]
    async fn matching_claims_pass_untouched() {
        let fix = fixture(json!({ "sub": "user_ext", "org_id": "org_a", "org_role": "growth" }));
        let user =
            User::new("user_ext", "a@example.com", Role::Growth).with_organization(OrgId::new("org_a"));
        fix.users.seed(user.clone());

        let resolved = fix.guard.authenticate(Some("token")).await.unwrap();
        assert_eq!(resolved, user);
    }

    #[tokio::test]
    async fn soft_deleted_users_are_invisible() {
        let fix = fixture(json!({ "sub": "user_ext" }));
        let mut user = User::new("user_ext", "a@example.com", Role::Solo);
        user.deleted_at = Some(chrono::Utc::now());
        fix.users.seed(user);

        let err = fix.guard.authenticate(Some("token")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserUnregistered));
    }
}
