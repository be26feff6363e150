//! Shared error types.

use thiserror::Error;

/// Opaque persistence failure surfaced by a store implementation.
///
/// Store traits live in the domain crates while implementations live in
/// `dealgate-infra`; this type keeps the seam free of sqlx types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("store error: {0}")]
pub struct StoreError(String);

impl StoreError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
