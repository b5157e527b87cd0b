//! In-process metrics for the redirect service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Running sum/count pair for latency observations in milliseconds.
#[derive(Debug, Default)]
pub struct LatencyStat {
    sum: AtomicU64,
    count: AtomicU64,
}

impl LatencyStat {
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean_ms(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum.load(Ordering::Relaxed) as f64 / count as f64
        }
    }
}

/// Collected metrics for the redirect service.
#[derive(Debug, Default)]
pub struct Metrics {
    // Click path
    pub clicks_recorded: Counter,
    pub clicks_rejected: Counter,
    pub click_validation_failures: Counter,

    // Split path
    pub split_hits_recorded: Counter,
    pub split_not_found: Counter,
    pub sticky_hits: Counter,

    // Shared
    pub redirects_issued: Counter,
    pub geo_lookup_failures: Counter,
    pub rdns_timeouts: Counter,
    pub store_write_errors: Counter,

    pub redirect_latency_ms: LatencyStat,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            clicks_recorded: self.clicks_recorded.get(),
            clicks_rejected: self.clicks_rejected.get(),
            click_validation_failures: self.click_validation_failures.get(),
            split_hits_recorded: self.split_hits_recorded.get(),
            split_not_found: self.split_not_found.get(),
            sticky_hits: self.sticky_hits.get(),
            redirects_issued: self.redirects_issued.get(),
            geo_lookup_failures: self.geo_lookup_failures.get(),
            rdns_timeouts: self.rdns_timeouts.get(),
            store_write_errors: self.store_write_errors.get(),
            redirect_latency_mean_ms: self.redirect_latency_ms.mean_ms(),
        }
    }
}

/// Point-in-time metrics view, serialized into health responses and
/// periodic summary logs.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub clicks_recorded: u64,
    pub clicks_rejected: u64,
    pub click_validation_failures: u64,
    pub split_hits_recorded: u64,
    pub split_not_found: u64,
    pub sticky_hits: u64,
    pub redirects_issued: u64,
    pub geo_lookup_failures: u64,
    pub rdns_timeouts: u64,
    pub store_write_errors: u64,
    pub redirect_latency_mean_ms: f64,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Global metrics instance.
pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::default)
}
