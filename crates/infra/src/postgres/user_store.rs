use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use dealgate_auth::{Role, User, UserStore};
use dealgate_core::{OrgId, StoreError, UserId};

use super::map_sqlx_error;

const USER_COLUMNS: &str = "id, external_id, email, first_name, last_name, \
     role, organization_id, is_active, deleted_at";

/// Postgres-backed user store.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| map_sqlx_error("user row", e))?;
    let role_text: String = row
        .try_get("role")
        .map_err(|e| map_sqlx_error("user row", e))?;
    let role = Role::from_str(&role_text)
        .map_err(|e| StoreError::new(format!("user row: {e}")))?;
    let organization_id: Option<String> = row
        .try_get("organization_id")
        .map_err(|e| map_sqlx_error("user row", e))?;
    let deleted_at: Option<DateTime<Utc>> = row
        .try_get("deleted_at")
        .map_err(|e| map_sqlx_error("user row", e))?;

    Ok(User {
        id: UserId::from_uuid(id),
        external_id: row
            .try_get("external_id")
            .map_err(|e| map_sqlx_error("user row", e))?,
        email: row
            .try_get("email")
            .map_err(|e| map_sqlx_error("user row", e))?,
        first_name: row
            .try_get("first_name")
            .map_err(|e| map_sqlx_error("user row", e))?,
        last_name: row
            .try_get("last_name")
            .map_err(|e| map_sqlx_error("user row", e))?,
        role,
        organization_id: organization_id.map(OrgId::new),
        is_active: row
            .try_get("is_active")
            .map_err(|e| map_sqlx_error("user row", e))?,
        deleted_at,
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1 AND deleted_at IS NULL"
        ))
        .bind(external_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_external_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn set_organization(&self, id: UserId, org_id: &OrgId) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET organization_id = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(org_id.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_organization", e))?;
        Ok(())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(role.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_role", e))?;
        Ok(())
    }

    async fn set_deleted(&self, id: UserId, deleted: bool) -> Result<(), StoreError> {
        let query = if deleted {
            "UPDATE users SET deleted_at = NOW(), is_active = FALSE WHERE id = $1"
        } else {
            "UPDATE users SET deleted_at = NULL, is_active = TRUE WHERE id = $1"
        };

        sqlx::query(query)
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_deleted", e))?;
        Ok(())
    }
}
