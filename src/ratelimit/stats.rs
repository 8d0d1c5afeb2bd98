//! Admission counters for observability.
//!
//! The limiter keeps simple atomic counters; exporting them in any wire
//! format is the calling layer's concern.

use std::sync::atomic::{AtomicU64, Ordering};

/// Internal counters, incremented from the admission path.
#[derive(Debug, Default)]
pub(crate) struct AdmissionCounters {
    pub(crate) allowed: AtomicU64,
    pub(crate) rejected: AtomicU64,
    pub(crate) evicted: AtomicU64,
    pub(crate) swept: AtomicU64,
}

impl AdmissionCounters {
    pub(crate) fn record_allowed(&self) {
        self.allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evicted(&self) {
        self.evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_swept(&self, count: u64) {
        self.swept.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> LimiterStats {
        LimiterStats {
            allowed: self.allowed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of admission activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterStats {
    /// Requests admitted.
    pub allowed: u64,
    /// Requests rejected, including rejections from eviction exhaustion.
    pub rejected: u64,
    /// Buckets removed to make room for new keys.
    pub evicted: u64,
    /// Buckets removed by stale sweeps.
    pub swept: u64,
}
