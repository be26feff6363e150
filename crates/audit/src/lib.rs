//! `dealgate-audit`: append-only security audit log.
//!
//! Records role changes, user status transitions, claim mismatches,
//! impersonation, and cross-tenant scope violations. Events are never
//! mutated after write; claim snapshots are projected onto a whitelist
//! before they touch storage.

pub mod event;
pub mod sink;
pub mod snapshot;

pub use event::{AuditAction, AuditEvent};
pub use sink::{AuditError, AuditPublisher, AuditSink, AuditStore};
pub use snapshot::{sanitize_snapshot, SNAPSHOT_KEYS};
