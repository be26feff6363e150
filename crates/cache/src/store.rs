use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use redis::aio::MultiplexedConnection;
use tracing::{debug, warn};

use crate::stats::CacheStats;

/// Counter key for cache hits.
pub const HITS_KEY: &str = "cache:stats:hits";

/// Counter key for cache misses.
pub const MISSES_KEY: &str = "cache:stats:misses";

/// Response cache over a pluggable backend.
///
/// Production uses Redis; tests and dev mode can use a process-local map
/// with the same TTL, counter, and pattern-invalidation semantics.
/// Constructed once and cloned per request. A missing backend or an
/// unreachable Redis degrades every operation to a no-op; cache failures
/// never propagate to callers.
#[derive(Clone)]
pub struct ResponseCache {
    backend: Option<Backend>,
}

#[derive(Clone)]
enum Backend {
    Redis(Arc<redis::Client>),
    Memory(Arc<MemoryStore>),
}

impl ResponseCache {
    /// Connect to the given Redis URL. A bad URL logs and yields a disabled
    /// cache rather than an error.
    pub fn connect(url: &str) -> Self {
        match redis::Client::open(url) {
            Ok(client) => Self {
                backend: Some(Backend::Redis(Arc::new(client))),
            },
            Err(e) => {
                warn!(error = %e, "invalid redis url; response cache disabled");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Process-local backend for tests and dev mode.
    pub fn in_memory() -> Self {
        Self {
            backend: Some(Backend::Memory(Arc::new(MemoryStore::default()))),
        }
    }

    /// Whether a cache backend is configured at all. Runtime outages are
    /// handled per-operation, not here.
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    async fn conn(client: &redis::Client) -> Option<MultiplexedConnection> {
        match client.get_multiplexed_async_connection().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                warn!(error = %e, "redis unavailable; skipping cache operation");
                None
            }
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.as_ref()? {
            Backend::Memory(store) => store.get(key),
            Backend::Redis(client) => {
                let mut conn = Self::conn(client).await?;
                match redis::cmd("GET")
                    .arg(key)
                    .query_async::<_, Option<String>>(&mut conn)
                    .await
                {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(error = %e, "cache read failed");
                        None
                    }
                }
            }
        }
    }

    /// Best-effort write with TTL.
    pub async fn set(&self, key: &str, ttl_seconds: u64, value: &str) {
        match &self.backend {
            None => {}
            Some(Backend::Memory(store)) => store.set(key, ttl_seconds, value),
            Some(Backend::Redis(client)) => {
                let Some(mut conn) = Self::conn(client).await else {
                    return;
                };

                if let Err(e) = redis::cmd("SETEX")
                    .arg(key)
                    .arg(ttl_seconds)
                    .arg(value)
                    .query_async::<_, ()>(&mut conn)
                    .await
                {
                    warn!(error = %e, "cache write failed");
                }
            }
        }
    }

    /// Best-effort atomic counter increment.
    pub async fn incr(&self, counter: &str) {
        match &self.backend {
            None => {}
            Some(Backend::Memory(store)) => store.incr(counter),
            Some(Backend::Redis(client)) => {
                let Some(mut conn) = Self::conn(client).await else {
                    return;
                };

                if let Err(e) = redis::cmd("INCR")
                    .arg(counter)
                    .query_async::<_, i64>(&mut conn)
                    .await
                {
                    warn!(error = %e, "counter increment failed");
                }
            }
        }
    }

    /// Delete every key matching the glob-style pattern; returns the number
    /// of keys removed.
    pub async fn invalidate_pattern(&self, pattern: &str) -> usize {
        match &self.backend {
            None => 0,
            Some(Backend::Memory(store)) => {
                let removed = store.remove_matching(pattern);
                debug!(pattern, removed, "cache invalidation");
                removed
            }
            Some(Backend::Redis(client)) => {
                let Some(mut conn) = Self::conn(client).await else {
                    return 0;
                };

                let keys: Vec<String> = match redis::cmd("KEYS")
                    .arg(pattern)
                    .query_async(&mut conn)
                    .await
                {
                    Ok(keys) => keys,
                    Err(e) => {
                        warn!(error = %e, pattern, "pattern scan failed");
                        return 0;
                    }
                };

                if keys.is_empty() {
                    return 0;
                }

                let mut del = redis::cmd("DEL");
                for key in &keys {
                    del.arg(key);
                }

                match del.query_async::<_, usize>(&mut conn).await {
                    Ok(removed) => {
                        debug!(pattern, removed, "cache invalidation");
                        removed
                    }
                    Err(e) => {
                        warn!(error = %e, pattern, "cache invalidation failed");
                        0
                    }
                }
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        match &self.backend {
            None => CacheStats::unavailable(),
            Some(Backend::Memory(store)) => {
                CacheStats::compute(store.counter(HITS_KEY), store.counter(MISSES_KEY), true)
            }
            Some(Backend::Redis(client)) => {
                let Some(mut conn) = Self::conn(client).await else {
                    return CacheStats::unavailable();
                };

                let hits = read_counter(&mut conn, HITS_KEY).await;
                let misses = read_counter(&mut conn, MISSES_KEY).await;
                CacheStats::compute(hits, misses, true)
            }
        }
    }

    pub async fn reset_stats(&self) {
        match &self.backend {
            None => {}
            Some(Backend::Memory(store)) => {
                store.remove(HITS_KEY);
                store.remove(MISSES_KEY);
            }
            Some(Backend::Redis(client)) => {
                let Some(mut conn) = Self::conn(client).await else {
                    return;
                };

                if let Err(e) = redis::cmd("DEL")
                    .arg(HITS_KEY)
                    .arg(MISSES_KEY)
                    .query_async::<_, ()>(&mut conn)
                    .await
                {
                    warn!(error = %e, "stats reset failed");
                }
            }
        }
    }
}

async fn read_counter(conn: &mut MultiplexedConnection, key: &str) -> u64 {
    match redis::cmd("GET")
        .arg(key)
        .query_async::<_, Option<u64>>(conn)
        .await
    {
        Ok(value) => value.unwrap_or(0),
        Err(e) => {
            warn!(error = %e, key, "counter read failed");
            0
        }
    }
}

/// Process-local key/value store mirroring the Redis operations the cache
/// uses: GET, SETEX, INCR, KEYS+DEL.
#[derive(Debug, Default)]
struct MemoryStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

impl MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    fn set(&self, key: &str, ttl_seconds: u64, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), MemoryEntry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_seconds)),
            });
        }
    }

    fn incr(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            let current = entries
                .get(key)
                .filter(|e| !e.is_expired())
                .and_then(|e| e.value.parse::<u64>().ok())
                .unwrap_or(0);
            entries.insert(key.to_string(), MemoryEntry {
                value: (current + 1).to_string(),
                expires_at: None,
            });
        }
    }

    fn counter(&self, key: &str) -> u64 {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn remove_matching(&self, pattern: &str) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|key, _| !glob_match(pattern, key));
        before - entries.len()
    }
}

/// Minimal glob match supporting `*` wildcards (the only metacharacter the
/// cache's invalidation patterns use).
fn glob_match(pattern: &str, key: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == key;
    }

    // With at least one `*`, split produces two or more literal segments:
    // the first must prefix the key, the last must suffix it, and the
    // middles must appear in between, in order.
    let segments: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = segments.split_first().unwrap_or((&"", &[]));
    let (last, middle) = rest.split_last().unwrap_or((&"", &[]));

    let Some(body) = key.strip_prefix(*first) else {
        return false;
    };
    let Some(mut body) = body.strip_suffix(*last) else {
        return false;
    };

    for segment in middle {
        if segment.is_empty() {
            continue;
        }
        match body.find(segment) {
            Some(idx) => body = &body[idx + segment.len()..],
            None => return false,
        }
    }
    true
}
