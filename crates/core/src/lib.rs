//! `dealgate-core`: shared vocabulary for the access-control core.
//!
//! Identifier newtypes, the subscription tier ordering, and the store error
//! every other crate builds on. Intentionally free of HTTP and storage.

pub mod error;
pub mod id;
pub mod tier;

pub use error::StoreError;
pub use id::{OrgId, UserId};
pub use tier::Tier;
