//! `dealgate-auth`: claim enforcement and role-based authorization.
//!
//! The claim guard reconciles every request's token with the persisted
//! user/organization record (auto-healing benign drift, auditing violations);
//! the role gate layers hierarchical role checks with an admin bypass on top.
//! Decoupled from HTTP and storage: transports call [`ClaimGuard`], stores
//! implement [`UserStore`]/[`OrganizationStore`].

pub mod claims;
pub mod error;
pub mod gate;
pub mod guard;
pub mod models;
pub mod roles;
pub mod store;
pub mod verifier;

pub use claims::TokenClaims;
pub use error::AuthError;
pub use gate::{require_admin, require_master_admin, require_min_role, require_role};
pub use guard::ClaimGuard;
pub use models::{Organization, User};
pub use roles::{Role, UnknownRole};
pub use store::{OrganizationStore, UserStore};
pub use verifier::{Hs256TokenVerifier, TokenError, TokenVerifier};
