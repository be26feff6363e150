//! `dealgate-entitlements`: tier-based feature entitlement.
//!
//! Maps an organization's subscription tier (fetched from the identity
//! provider through a short-lived local cache) to the set of features it may
//! exercise. Tier ordering is inclusive: higher tiers keep every lower-tier
//! feature.

pub mod catalog;
pub mod directory;
pub mod resolver;
pub mod tier_cache;

pub use catalog::{feature_names, min_tier, FEATURE_CATALOG};
pub use directory::{DirectoryError, OrganizationDirectory, OrganizationProfile};
pub use resolver::{EntitlementError, EntitlementResolver, TIER_CACHE_TTL};
pub use tier_cache::TierCache;
