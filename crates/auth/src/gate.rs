//! Role gate: hierarchical role checks with admin bypass.
//!
//! Pure policy checks, no IO. Denials are expected at scale and are
//! deliberately not audited; the scope-violation audit tag is reserved for
//! cross-tenant access detected deeper in a handler.

use crate::error::AuthError;
use crate::models::User;
use crate::roles::Role;

/// Passes iff the user is admin-tier or holds exactly `required`.
pub fn require_role(user: &User, required: Role) -> Result<(), AuthError> {
    if user.role.is_admin_tier() || user.role == required {
        Ok(())
    } else {
        Err(AuthError::ForbiddenRole(required))
    }
}

/// Passes iff the user is admin-tier or at least `minimum` in the role order.
pub fn require_min_role(user: &User, minimum: Role) -> Result<(), AuthError> {
    if user.role.is_admin_tier() || user.role >= minimum {
        Ok(())
    } else {
        Err(AuthError::ForbiddenRole(minimum))
    }
}

/// Admin-tier only (`admin` or `master_admin`).
pub fn require_admin(user: &User) -> Result<(), AuthError> {
    if user.role.is_admin_tier() {
        Ok(())
    } else {
        Err(AuthError::ForbiddenRole(Role::Admin))
    }
}

/// `master_admin` only; the one check the admin bypass does not cover.
pub fn require_master_admin(user: &User) -> Result<(), AuthError> {
    if user.role == Role::MasterAdmin {
        Ok(())
    } else {
        Err(AuthError::ForbiddenRole(Role::MasterAdmin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: Role) -> User {
        User::new("user_ext", "a@example.com", role)
    }

    const ALL: [Role; 5] = [
        Role::Solo,
        Role::Growth,
        Role::Enterprise,
        Role::Admin,
        Role::MasterAdmin,
    ];

    #[test]
    fn min_role_respects_hierarchy() {
        for lower in ALL {
            for higher in ALL {
                if lower >= higher {
                    continue;
                }
                // The higher role always passes a check at its own level.
                assert!(require_min_role(&user_with(higher), higher).is_ok());
                // The lower role fails unless it is admin-tier.
                let result = require_min_role(&user_with(lower), higher);
                assert_eq!(result.is_ok(), lower.is_admin_tier());
            }
        }
    }

    #[test]
    fn admin_tier_bypasses_any_minimum() {
        for minimum in ALL {
            assert!(require_min_role(&user_with(Role::Admin), minimum).is_ok());
            assert!(require_min_role(&user_with(Role::MasterAdmin), minimum).is_ok());
        }
    }

    #[test]
    fn exact_role_check_allows_match_or_admin_tier() {
        assert!(require_role(&user_with(Role::Growth), Role::Growth).is_ok());
        assert!(require_role(&user_with(Role::Admin), Role::Growth).is_ok());
        assert!(require_role(&user_with(Role::Solo), Role::Growth).is_err());
        assert!(require_role(&user_with(Role::Enterprise), Role::Growth).is_err());
    }

    #[test]
    fn denial_names_the_required_role() {
        let err = require_min_role(&user_with(Role::Solo), Role::Enterprise).unwrap_err();
        assert_eq!(err.to_string(), "enterprise role required");
    }

    #[test]
    fn master_admin_check_has_no_bypass() {
        assert!(require_master_admin(&user_with(Role::MasterAdmin)).is_ok());
        assert!(require_master_admin(&user_with(Role::Admin)).is_err());
        assert!(require_master_admin(&user_with(Role::Solo)).is_err());
    }

    #[test]
    fn admin_check_accepts_both_admin_roles() {
        assert!(require_admin(&user_with(Role::Admin)).is_ok());
        assert!(require_admin(&user_with(Role::MasterAdmin)).is_ok());
        assert!(require_admin(&user_with(Role::Enterprise)).is_err());
    }
}
