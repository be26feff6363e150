use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dealgate_core::{OrgId, Tier, UserId};

use crate::roles::Role;

/// Persisted user record.
///
/// The database is authoritative for `role`; the identity provider is
/// authoritative for organization membership. Role and organization change
/// only through audited operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Identity-provider user id (`sub` claim). Unique.
    pub external_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub organization_id: Option<OrgId>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(external_id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            external_id: external_id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            role,
            organization_id: None,
            is_active: true,
            deleted_at: None,
        }
    }

    pub fn with_organization(mut self, org_id: OrgId) -> Self {
        self.organization_id = Some(org_id);
        self
    }
}

/// Persisted organization (tenant) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub slug: String,
    pub subscription_tier: Tier,
}

impl Organization {
    /// Placeholder record created lazily from a trusted token claim, before
    /// the provider's provisioning webhook has landed.
    pub fn provisional(id: OrgId) -> Self {
        Self {
            name: format!("Organization {id}"),
            slug: id.to_string(),
            subscription_tier: Tier::Starter,
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisional_org_defaults_to_starter() {
        let org = Organization::provisional(OrgId::new("org_new"));
        assert_eq!(org.id.as_str(), "org_new");
        assert_eq!(org.name, "Organization org_new");
        assert_eq!(org.slug, "org_new");
        assert_eq!(org.subscription_tier, Tier::Starter);
    }
}
