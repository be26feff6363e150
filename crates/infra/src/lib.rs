//! `dealgate-infra`: storage and outbound-service implementations.
//!
//! Postgres-backed stores for users, organizations, and the audit log;
//! in-memory equivalents for dev mode and tests; and the Clerk directory
//! client consumed by the entitlement resolver.

pub mod clerk;
pub mod in_memory;
pub mod postgres;

pub use clerk::{ClerkDirectory, StaticDirectory};
pub use in_memory::{InMemoryAuditStore, InMemoryOrganizationStore, InMemoryUserStore};
pub use postgres::{PgAuditStore, PgOrganizationStore, PgUserStore};
