use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use dealgate_core::{OrgId, Tier};

use crate::catalog;
use crate::directory::{DirectoryError, OrganizationDirectory};
use crate::tier_cache::TierCache;

/// How long a provider-fetched tier stays valid locally.
pub const TIER_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum EntitlementError {
    /// Programmer error: a feature name outside the catalogue.
    #[error("unknown feature: {0}")]
    FeatureNotFound(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Read-through tier lookup plus feature-access decisions.
pub struct EntitlementResolver {
    directory: Arc<dyn OrganizationDirectory>,
    tiers: TierCache,
}

impl EntitlementResolver {
    pub fn new(directory: Arc<dyn OrganizationDirectory>) -> Self {
        Self::with_ttl(directory, TIER_CACHE_TTL)
    }

    pub fn with_ttl(directory: Arc<dyn OrganizationDirectory>, ttl: Duration) -> Self {
        Self {
            directory,
            tiers: TierCache::new(ttl),
        }
    }

    /// Current subscription tier of `org_id`.
    ///
    /// Served from the local cache while fresh; otherwise fetched from the
    /// identity provider. Missing or unrecognized tier metadata is a
    /// new-tenant condition and defaults to `starter`; the lookup never
    /// fails closed on metadata. Provider failures propagate and are never
    /// cached.
    pub async fn organization_tier(&self, org_id: &OrgId) -> Result<Tier, EntitlementError> {
        if let Some(tier) = self.tiers.get(org_id) {
            return Ok(tier);
        }

        let profile = self.directory.fetch_organization(org_id).await?;
        let tier = Tier::parse_or_default(profile.subscription_tier.as_deref());
        debug!(org_id = %org_id, tier = %tier, "refreshed organization tier");

        self.tiers.insert(org_id.clone(), tier);
        Ok(tier)
    }

    /// Minimum tier for `feature`, failing on names outside the catalogue.
    pub fn required_tier(feature: &str) -> Result<Tier, EntitlementError> {
        catalog::min_tier(feature).ok_or_else(|| EntitlementError::FeatureNotFound(feature.to_string()))
    }

    /// Whether `org_id` may exercise `feature`.
    pub async fn check_feature_access(
        &self,
        org_id: &OrgId,
        feature: &str,
    ) -> Result<bool, EntitlementError> {
        let required = Self::required_tier(feature)?;
        let tier = self.organization_tier(org_id).await?;
        Ok(tier >= required)
    }

    /// Drop one cached tier, or all of them. Invoked on known tier-change
    /// events (e.g. a billing webhook) outside the core.
    pub fn clear_tier_cache(&self, org_id: Option<&OrgId>) {
        match org_id {
            Some(org_id) => self.tiers.remove(org_id),
            None => self.tiers.clear(),
        }
    }
}
