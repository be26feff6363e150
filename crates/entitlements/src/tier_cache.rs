use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dealgate_core::{OrgId, Tier};

/// Process-local tier cache with lazy TTL eviction.
///
/// An explicit handle owned by the resolver (not a module-level map) so tests
/// can construct and discard isolated instances. Shared across concurrent
/// requests; races are benign because duplicate refreshes produce identical
/// entries.
#[derive(Debug)]
pub struct TierCache {
    ttl: Duration,
    entries: Mutex<HashMap<OrgId, Entry>>,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    tier: Tier,
    cached_at: Instant,
}

impl TierCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh entry for `org_id`, or `None`. Expired entries are evicted on
    /// the way out, so a value older than the TTL is never returned.
    pub fn get(&self, org_id: &OrgId) -> Option<Tier> {
        let mut entries = self.entries.lock().ok()?;

        match entries.get(org_id) {
            Some(entry) if entry.cached_at.elapsed() <= self.ttl => Some(entry.tier),
            Some(_) => {
                entries.remove(org_id);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, org_id: OrgId, tier: Tier) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(org_id, Entry {
                tier,
                cached_at: Instant::now(),
            });
        }
    }

    pub fn remove(&self, org_id: &OrgId) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(org_id);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entries_are_returned() {
        let cache = TierCache::new(Duration::from_secs(300));
        cache.insert(OrgId::new("org_a"), Tier::Premium);
        assert_eq!(cache.get(&OrgId::new("org_a")), Some(Tier::Premium));
        assert_eq!(cache.get(&OrgId::new("org_b")), None);
    }

    #[test]
    fn expired_entries_are_evicted_lazily() {
        let cache = TierCache::new(Duration::ZERO);
        cache.insert(OrgId::new("org_a"), Tier::Premium);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&OrgId::new("org_a")), None);
        // Second read after eviction also misses.
        assert_eq!(cache.get(&OrgId::new("org_a")), None);
    }

    #[test]
    fn remove_and_clear() {
        let cache = TierCache::new(Duration::from_secs(300));
        cache.insert(OrgId::new("org_a"), Tier::Starter);
        cache.insert(OrgId::new("org_b"), Tier::Enterprise);

        cache.remove(&OrgId::new("org_a"));
        assert_eq!(cache.get(&OrgId::new("org_a")), None);
        assert_eq!(cache.get(&OrgId::new("org_b")), Some(Tier::Enterprise));

        cache.clear();
        assert_eq!(cache.get(&OrgId::new("org_b")), None);
    }
}
