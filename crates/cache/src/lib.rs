//! `dealgate-cache`: organization-scoped HTTP response cache.
//!
//! Deterministic tenant-scoped key derivation, a Redis-backed store with
//! hit/miss counters and glob invalidation, and the rule that a cache outage
//! must never surface as an API error: every Redis failure here is logged
//! and downgraded.

pub mod key;
pub mod stats;
pub mod store;

pub use key::cache_key;
pub use stats::CacheStats;
pub use store::{ResponseCache, HITS_KEY, MISSES_KEY};
