use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use dealgate_auth::{Organization, OrganizationStore};
use dealgate_core::{OrgId, StoreError, Tier};

use super::map_sqlx_error;

/// Postgres-backed organization store.
#[derive(Debug, Clone)]
pub struct PgOrganizationStore {
    pool: Arc<PgPool>,
}

impl PgOrganizationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl OrganizationStore for PgOrganizationStore {
    async fn find(&self, id: &OrgId) -> Result<Option<Organization>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, slug, subscription_tier FROM organizations WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find organization", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tier_text: String = row
            .try_get("subscription_tier")
            .map_err(|e| map_sqlx_error("organization row", e))?;

        Ok(Some(Organization {
            id: OrgId::new(
                row.try_get::<String, _>("id")
                    .map_err(|e| map_sqlx_error("organization row", e))?,
            ),
            name: row
                .try_get("name")
                .map_err(|e| map_sqlx_error("organization row", e))?,
            slug: row
                .try_get("slug")
                .map_err(|e| map_sqlx_error("organization row", e))?,
            subscription_tier: Tier::parse_or_default(Some(&tier_text)),
        }))
    }

    async fn insert(&self, org: &Organization) -> Result<(), StoreError> {
        // ON CONFLICT DO NOTHING keeps lazy provisioning idempotent under
        // concurrent first requests for the same organization.
        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, slug, subscription_tier)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(org.id.as_str())
        .bind(&org.name)
        .bind(&org.slug)
        .bind(org.subscription_tier.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert organization", e))?;
        Ok(())
    }
}
