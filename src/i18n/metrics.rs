//! Dictionary metrics and observability.
//!
//! Counters are owned by a [`DictionaryStore`](crate::i18n::DictionaryStore)
//! instance and shared with the fallback resolver, so each store reports on
//! its own traffic.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for dictionary loading and fallback activity.
#[derive(Debug, Default)]
pub struct I18nMetrics {
    /// Bundles parsed from their source
    loads: AtomicUsize,

    /// Queries served from an already-loaded bundle
    cache_hits: AtomicUsize,

    /// Bundle loads that failed (missing file, bad JSON, ...)
    load_failures: AtomicUsize,

    /// Requests served from another locale's bundle via the fallback chain
    bundle_fallbacks: AtomicUsize,

    /// Per-key reads answered by the default locale's bundle
    key_fallbacks: AtomicUsize,

    /// Per-key reads answered by the caller's literal
    literal_fallbacks: AtomicUsize,
}

impl I18nMetrics {
    /// Create a set of zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a bundle parsed from its source.
    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a query answered by an already-loaded bundle.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a bundle that could not be read or parsed.
    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request served from another locale's bundle.
    pub fn record_bundle_fallback(&self) {
        self.bundle_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a key read answered by the default locale.
    pub fn record_key_fallback(&self) {
        self.key_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a key read answered by the caller's literal.
    pub fn record_literal_fallback(&self) {
        self.literal_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of bundles parsed.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Number of cached bundle queries.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Number of failed bundle loads.
    pub fn load_failures(&self) -> usize {
        self.load_failures.load(Ordering::Relaxed)
    }

    /// Number of requests served from a fallback bundle.
    pub fn bundle_fallbacks(&self) -> usize {
        self.bundle_fallbacks.load(Ordering::Relaxed)
    }

    /// Number of key reads answered by the default locale.
    pub fn key_fallbacks(&self) -> usize {
        self.key_fallbacks.load(Ordering::Relaxed)
    }

    /// Number of key reads answered by a literal.
    pub fn literal_fallbacks(&self) -> usize {
        self.literal_fallbacks.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let loads = self.loads();
        let total_queries = hits + loads;
        let cache_hit_rate = if total_queries > 0 {
            (hits as f64 / total_queries as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            loads,
            cache_hits: hits,
            cache_hit_rate,
            load_failures: self.load_failures(),
            bundle_fallbacks: self.bundle_fallbacks(),
            key_fallbacks: self.key_fallbacks(),
            literal_fallbacks: self.literal_fallbacks(),
        }
    }
}

/// Snapshot of [`I18nMetrics`].
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub loads: usize,
    pub cache_hits: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub load_failures: usize,
    pub bundle_fallbacks: usize,
    pub key_fallbacks: usize,
    pub literal_fallbacks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = I18nMetrics::new();
        let report = metrics.report();

        assert_eq!(report.loads, 0);
        assert_eq!(report.cache_hits, 0);
        assert_eq!(report.cache_hit_rate, 0.0);
        assert_eq!(report.load_failures, 0);
        assert_eq!(report.bundle_fallbacks, 0);
        assert_eq!(report.key_fallbacks, 0);
        assert_eq!(report.literal_fallbacks, 0);
    }

    #[test]
    fn test_record_each_counter() {
        let metrics = I18nMetrics::new();
        metrics.record_load();
        metrics.record_load_failure();
        metrics.record_bundle_fallback();
        metrics.record_key_fallback();
        metrics.record_key_fallback();
        metrics.record_literal_fallback();

        assert_eq!(metrics.loads(), 1);
        assert_eq!(metrics.load_failures(), 1);
        assert_eq!(metrics.bundle_fallbacks(), 1);
        assert_eq!(metrics.key_fallbacks(), 2);
        assert_eq!(metrics.literal_fallbacks(), 1);
    }

    #[test]
    fn test_report_cache_hit_rate() {
        let metrics = I18nMetrics::new();

        // 1 load, 3 hits = 75% hit rate
        metrics.record_load();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();

        let report = metrics.report();
        assert_eq!(report.cache_hits, 3);
        assert_eq!(report.loads, 1);
        assert_eq!(report.cache_hit_rate, 75.0);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = I18nMetrics::new();
        let b = I18nMetrics::new();
        a.record_cache_hit();
        assert_eq!(a.cache_hits(), 1);
        assert_eq!(b.cache_hits(), 0);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = I18nMetrics::new();
        metrics.record_load();
        let json = serde_json::to_value(metrics.report()).unwrap();
        assert_eq!(json["loads"], 1);
        assert_eq!(json["cache_hit_rate"], 0.0);
    }
}
