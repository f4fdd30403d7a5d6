//! Time-bounded cache for the active rule set.
//!
//! Freshness is driven by an injected clock so the TTL policy is testable
//! without real delays. The cache itself never performs network calls; the
//! addon checks freshness, fetches outside any lock, and stores the result
//! here only on success. A failed fetch leaves both the snapshot and the
//! fetch timestamp untouched, so the next request retries immediately
//! instead of waiting out a full TTL.

use crate::rules::MockRule;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds a fetched rule set stays fresh.
pub const RULES_CACHE_TTL_SECS: f64 = 5.0;

/// Source of "now" in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

pub struct RuleCache {
    rules: Arc<[MockRule]>,
    last_fetch: Option<f64>,
    ttl_secs: f64,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::with_ttl(RULES_CACHE_TTL_SECS)
    }

    pub fn with_ttl(ttl_secs: f64) -> Self {
        RuleCache {
            rules: Arc::from(Vec::new()),
            last_fetch: None,
            ttl_secs,
        }
    }

    /// True while the last successful fetch is younger than the TTL.
    /// An empty cache that has never been filled is never fresh.
    pub fn fresh(&self, now: f64) -> bool {
        self.last_fetch
            .map(|at| now - at < self.ttl_secs)
            .unwrap_or(false)
    }

    /// Current rule set, possibly stale or empty. Cheap to clone out so the
    /// cache lock never spans matching work.
    pub fn snapshot(&self) -> Arc<[MockRule]> {
        Arc::clone(&self.rules)
    }

    /// Replace the snapshot after a successful fetch.
    pub fn store(&mut self, rules: Vec<MockRule>, now: f64) {
        self.rules = Arc::from(rules);
        self.last_fetch = Some(now);
    }
}

impl Default for RuleCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str) -> MockRule {
        serde_json::from_str(&format!(r#"{{"id": "{id}", "urlPattern": "*"}}"#)).unwrap()
    }

    #[test]
    fn test_empty_cache_is_stale() {
        let cache = RuleCache::new();
        assert!(!cache.fresh(0.0));
        assert!(cache.snapshot().is_empty());
    }

    #[test]
    fn test_fresh_within_ttl() {
        let mut cache = RuleCache::new();
        cache.store(vec![rule("a")], 100.0);

        assert!(cache.fresh(100.0));
        assert!(cache.fresh(104.9));
        assert!(!cache.fresh(105.0));
        assert!(!cache.fresh(200.0));
    }

    #[test]
    fn test_store_replaces_snapshot() {
        let mut cache = RuleCache::new();
        cache.store(vec![rule("a"), rule("b")], 10.0);
        assert_eq!(cache.snapshot().len(), 2);

        cache.store(vec![rule("c")], 20.0);
        let snap = cache.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id, "c");
        assert!(cache.fresh(24.0));
    }

    #[test]
    fn test_failed_fetch_keeps_stale_snapshot() {
        // The addon models a failed fetch as "don't call store": the old
        // rules remain served and the cache stays stale, so the next
        // request retries at once.
        let mut cache = RuleCache::new();
        cache.store(vec![rule("a")], 0.0);

        assert!(!cache.fresh(10.0));
        assert_eq!(cache.snapshot().len(), 1);
        assert!(!cache.fresh(10.1));
    }

    #[test]
    fn test_custom_ttl() {
        let mut cache = RuleCache::with_ttl(1.0);
        cache.store(vec![], 0.0);
        assert!(cache.fresh(0.5));
        assert!(!cache.fresh(1.0));
    }
}
