use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operational privilege level of a user.
///
/// Roles are totally ordered (`solo < growth < enterprise < admin <
/// master_admin`). The two top levels are "admin-tier" and bypass
/// hierarchical checks.
///
/// Note the name collision with the `enterprise` subscription tier; the two
/// are different axes (privilege vs. commercial plan).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Solo,
    Growth,
    Enterprise,
    Admin,
    MasterAdmin,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Solo => "solo",
            Role::Growth => "growth",
            Role::Enterprise => "enterprise",
            Role::Admin => "admin",
            Role::MasterAdmin => "master_admin",
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Role::Solo => 1,
            Role::Growth => 2,
            Role::Enterprise => 3,
            Role::Admin => 4,
            Role::MasterAdmin => 5,
        }
    }

    /// Whether this role bypasses hierarchical role checks.
    pub fn is_admin_tier(self) -> bool {
        matches!(self, Role::Admin | Role::MasterAdmin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solo" => Ok(Role::Solo),
            "growth" => Ok(Role::Growth),
            "enterprise" => Ok(Role::Enterprise),
            "admin" => Ok(Role::Admin),
            "master_admin" => Ok(Role::MasterAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_levels() {
        let roles = [Role::Solo, Role::Growth, Role::Enterprise, Role::Admin, Role::MasterAdmin];
        for pair in roles.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].level() < pair[1].level());
        }
    }

    #[test]
    fn only_top_two_are_admin_tier() {
        assert!(!Role::Solo.is_admin_tier());
        assert!(!Role::Growth.is_admin_tier());
        assert!(!Role::Enterprise.is_admin_tier());
        assert!(Role::Admin.is_admin_tier());
        assert!(Role::MasterAdmin.is_admin_tier());
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!("growth".parse::<Role>(), Ok(Role::Growth));
        assert_eq!("master_admin".parse::<Role>(), Ok(Role::MasterAdmin));
        assert!("superuser".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }
}
