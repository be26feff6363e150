//! In-memory store implementations for dev mode and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use dealgate_audit::{AuditEvent, AuditStore};
use dealgate_auth::{Organization, OrganizationStore, Role, User, UserStore};
use dealgate_core::{OrgId, StoreError, UserId};

fn poisoned<T>() -> Result<T, StoreError> {
    Err(StoreError::new("store lock poisoned"))
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user record (test/dev fixture).
    pub fn seed(&self, user: User) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id, user);
        }
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.users.read().ok()?.get(&id).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, StoreError> {
        let Ok(users) = self.users.read() else {
            return poisoned();
        };
        Ok(users
            .values()
            .find(|u| u.external_id == external_id && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let Ok(users) = self.users.read() else {
            return poisoned();
        };
        Ok(users.get(&id).filter(|u| u.deleted_at.is_none()).cloned())
    }

    async fn set_organization(&self, id: UserId, org_id: &OrgId) -> Result<(), StoreError> {
        let Ok(mut users) = self.users.write() else {
            return poisoned();
        };
        if let Some(user) = users.get_mut(&id) {
            user.organization_id = Some(org_id.clone());
        }
        Ok(())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), StoreError> {
        let Ok(mut users) = self.users.write() else {
            return poisoned();
        };
        if let Some(user) = users.get_mut(&id) {
            user.role = role;
        }
        Ok(())
    }

    async fn set_deleted(&self, id: UserId, deleted: bool) -> Result<(), StoreError> {
        let Ok(mut users) = self.users.write() else {
            return poisoned();
        };
        if let Some(user) = users.get_mut(&id) {
            user.deleted_at = deleted.then(Utc::now);
            user.is_active = !deleted;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryOrganizationStore {
    orgs: RwLock<HashMap<OrgId, Organization>>,
}

impl InMemoryOrganizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, org: Organization) {
        if let Ok(mut orgs) = self.orgs.write() {
            orgs.insert(org.id.clone(), org);
        }
    }

    pub fn get(&self, id: &OrgId) -> Option<Organization> {
        self.orgs.read().ok()?.get(id).cloned()
    }
}

#[async_trait]
impl OrganizationStore for InMemoryOrganizationStore {
    async fn find(&self, id: &OrgId) -> Result<Option<Organization>, StoreError> {
        let Ok(orgs) = self.orgs.read() else {
            return poisoned();
        };
        Ok(orgs.get(id).cloned())
    }

    async fn insert(&self, org: &Organization) -> Result<(), StoreError> {
        let Ok(mut orgs) = self.orgs.write() else {
            return poisoned();
        };
        // Idempotent on id: first writer wins.
        orgs.entry(org.id.clone()).or_insert_with(|| org.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded event, in append order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, event: &AuditEvent) -> Result<(), StoreError> {
        let Ok(mut events) = self.events.write() else {
            return poisoned();
        };
        events.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn user_soft_delete_hides_and_restore_reveals() {
        let store = InMemoryUserStore::new();
        let user = User::new("user_ext", "a@example.com", Role::Solo);
        let id = user.id;
        store.seed(user);

        store.set_deleted(id, true).await.unwrap();
        assert!(store.find_by_external_id("user_ext").await.unwrap().is_none());
        assert!(store.find_by_id(id).await.unwrap().is_none());

        store.set_deleted(id, false).await.unwrap();
        let restored = store.find_by_id(id).await.unwrap().unwrap();
        assert!(restored.is_active);
        assert!(restored.deleted_at.is_none());
    }

    #[tokio::test]
    async fn organization_insert_is_idempotent() {
        let store = InMemoryOrganizationStore::new();
        let org = Organization::provisional(OrgId::new("org_a"));
        store.insert(&org).await.unwrap();

        let mut renamed = org.clone();
        renamed.name = "Other".to_string();
        store.insert(&renamed).await.unwrap();

        assert_eq!(store.get(&OrgId::new("org_a")).unwrap().name, org.name);
    }
}
