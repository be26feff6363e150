use serde::Serialize;

/// Snapshot of the response-cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    /// Percentage, rounded to two decimals. `0.0` when no requests were seen.
    pub hit_rate: f64,
    pub available: bool,
}

impl CacheStats {
    pub fn compute(hits: u64, misses: u64, available: bool) -> Self {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64 * 10_000.0).round() / 100.0
        };

        Self {
            hits,
            misses,
            total_requests: total,
            hit_rate,
            available,
        }
    }

    pub fn unavailable() -> Self {
        Self::compute(0, 0, false)
    }
}
