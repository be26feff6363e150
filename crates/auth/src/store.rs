use async_trait::async_trait;

use dealgate_core::{OrgId, StoreError, UserId};

use crate::models::{Organization, User};
use crate::roles::Role;

/// Persistence seam for user records.
///
/// Lookups exclude soft-deleted users; mutations are single-row and
/// idempotent so the claim guard can commit mid-request safely.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn set_organization(&self, id: UserId, org_id: &OrgId) -> Result<(), StoreError>;

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), StoreError>;

    /// Soft delete (`deleted=true`) or restore (`deleted=false`).
    async fn set_deleted(&self, id: UserId, deleted: bool) -> Result<(), StoreError>;
}

/// Persistence seam for organization records.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn find(&self, id: &OrgId) -> Result<Option<Organization>, StoreError>;

    /// Insert a new organization. Idempotent on `id`.
    async fn insert(&self, org: &Organization) -> Result<(), StoreError>;
}
