//! Per-key token bucket state.

use std::time::Duration;

use crate::clock::NANOS_PER_MINUTE;

/// Minimum retry hint handed back on rejection. Prevents near-zero
/// Retry-After values that would invite immediate retry storms.
const MIN_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Burst capacity for a given rate: half the per-minute rate, with a
/// floor of one token so very low rates still admit something.
pub(crate) fn burst_capacity(rate_per_minute: u32) -> f64 {
    (rate_per_minute / 2).max(1) as f64
}

/// Token bucket state for a single key.
///
/// Tokens accrue lazily from the timestamps of admission checks; there
/// is no background refill. The invariant `0 <= tokens <= burst` holds
/// whenever the bucket is at rest.
#[derive(Debug, Clone)]
pub(crate) struct Bucket {
    /// Current token count.
    pub(crate) tokens: f64,
    /// When tokens were last accrued, nanoseconds since epoch.
    last_refill_nanos: u64,
    /// Most recent admission check, nanoseconds since epoch. Drives
    /// stale sweeps and eviction, independently of refill.
    pub(crate) last_accessed_nanos: u64,
}

impl Bucket {
    /// A fresh bucket starts with its full burst allowance.
    pub(crate) fn new(rate_per_minute: u32, now_nanos: u64) -> Self {
        Self {
            tokens: burst_capacity(rate_per_minute),
            last_refill_nanos: now_nanos,
            last_accessed_nanos: now_nanos,
        }
    }

    /// Accrue tokens for the time elapsed since the last refill, capped
    /// at burst capacity.
    pub(crate) fn refill(&mut self, rate_per_minute: u32, now_nanos: u64) {
        let elapsed_minutes =
            now_nanos.saturating_sub(self.last_refill_nanos) as f64 / NANOS_PER_MINUTE;
        if elapsed_minutes > 0.0 {
            self.tokens = (self.tokens + elapsed_minutes * f64::from(rate_per_minute))
                .min(burst_capacity(rate_per_minute));
            self.last_refill_nanos = now_nanos;
        }
    }

    /// Consume one token if at least one is available.
    pub(crate) fn try_consume(&mut self) -> bool {
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// How long until one whole token has accrued, floored at one second.
    pub(crate) fn retry_after(&self, rate_per_minute: u32) -> Duration {
        let deficit = 1.0 - self.tokens;
        let minutes = deficit / f64::from(rate_per_minute);
        Duration::from_secs_f64(minutes * 60.0).max(MIN_RETRY_AFTER)
    }
}
