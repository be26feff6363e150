//! Postgres-backed store implementations.
//!
//! Runtime queries with manual row mapping. Every user query filters on
//! `deleted_at IS NULL` so soft-deleted accounts are invisible to lookups.

mod audit_store;
mod org_store;
mod user_store;

pub use audit_store::PgAuditStore;
pub use org_store::PgOrganizationStore;
pub use user_store::PgUserStore;

use dealgate_core::StoreError;

fn map_sqlx_error(operation: &str, e: sqlx::Error) -> StoreError {
    StoreError::new(format!("{operation}: {e}"))
}
