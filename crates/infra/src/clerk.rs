//! Clerk organization directory client.
//!
//! Fetches organization records from the Clerk Backend API so the
//! entitlement resolver can read `public_metadata.subscription_tier`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use dealgate_core::OrgId;
use dealgate_entitlements::{DirectoryError, OrganizationDirectory, OrganizationProfile};

const DEFAULT_BASE_URL: &str = "https://api.clerk.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ClerkOrganization {
    id: String,
    name: Option<String>,
    #[serde(default)]
    public_metadata: serde_json::Map<String, serde_json::Value>,
}

/// Directory backed by the Clerk Backend API.
#[derive(Debug, Clone)]
pub struct ClerkDirectory {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl ClerkDirectory {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_base_url(secret_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(secret_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }
}

#[async_trait]
impl OrganizationDirectory for ClerkDirectory {
    async fn fetch_organization(
        &self,
        org_id: &OrgId,
    ) -> Result<OrganizationProfile, DirectoryError> {
        let url = format!("{}/organizations/{}", self.base_url, org_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(org_id.clone()));
        }

        let response = response
            .error_for_status()
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        let org: ClerkOrganization = response
            .json()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        let subscription_tier = org
            .public_metadata
            .get("subscription_tier")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        debug!(organization = %org.id, tier = ?subscription_tier, "clerk organization fetched");

        Ok(OrganizationProfile {
            id: OrgId::new(org.id),
            name: org.name,
            subscription_tier,
        })
    }
}

/// Fixed-tier directory used when no Clerk secret key is configured.
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    tier: Option<String>,
}

impl StaticDirectory {
    pub fn new(tier: Option<String>) -> Self {
        Self { tier }
    }
}

#[async_trait]
impl OrganizationDirectory for StaticDirectory {
    async fn fetch_organization(
        &self,
        org_id: &OrgId,
    ) -> Result<OrganizationProfile, DirectoryError> {
        Ok(OrganizationProfile {
            id: org_id.clone(),
            name: None,
            subscription_tier: self.tier.clone(),
        })
    }
}
