use async_trait::async_trait;
use thiserror::Error;

use dealgate_core::OrgId;

/// Organization record as seen by the identity provider.
///
/// `subscription_tier` is the raw `public_metadata.subscription_tier` value;
/// parsing into the strong [`Tier`](dealgate_core::Tier) enum happens in the
/// resolver so nothing deeper in the system branches on the raw string.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationProfile {
    pub id: OrgId,
    pub name: Option<String>,
    pub subscription_tier: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("organization {0} not found at identity provider")]
    NotFound(OrgId),

    #[error("identity provider request failed: {0}")]
    Request(String),
}

/// Outbound identity-provider lookup (one operation consumed).
#[async_trait]
pub trait OrganizationDirectory: Send + Sync {
    async fn fetch_organization(&self, org_id: &OrgId) -> Result<OrganizationProfile, DirectoryError>;
}
