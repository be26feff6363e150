use thiserror::Error;

use dealgate_core::StoreError;

use crate::roles::Role;
use crate::verifier::TokenError;

/// Authentication/authorization failure.
///
/// The first four variants are typed authorization failures translated to
/// HTTP statuses at the edge; `Store` is an infrastructure failure that
/// rolls back the request.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials presented.
    #[error("authentication required")]
    AuthRequired,

    /// Token failed decode/verification.
    #[error("invalid or expired token: {0}")]
    InvalidToken(#[from] TokenError),

    /// Token verified but its claims disagree with the persisted record.
    /// Surfaced to clients as "Invalid session claims" without detail.
    #[error("invalid session claims")]
    InvalidClaims,

    /// Valid token, but no local user record for its subject.
    #[error("user is not registered")]
    UserUnregistered,

    /// Role gate denial. Names the required role.
    #[error("{0} role required")]
    ForbiddenRole(Role),

    #[error(transparent)]
    Store(#[from] StoreError),
}
