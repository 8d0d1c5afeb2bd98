//! Core rate limiter implementation.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::bucket::Bucket;
use super::stats::{AdmissionCounters, LimiterStats};
use crate::clock::{Clock, SystemClock};
use crate::config::LimiterConfig;

/// Default rate applied when construction receives a zero rate:
/// 600 requests per minute, i.e. 10 per second.
const DEFAULT_RATE_PER_MINUTE: u32 = 600;

/// Fixed retry hint returned when a new key cannot be admitted because
/// the bucket table is full and no victim could be evicted.
const EVICTION_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// How long the caller should wait before retrying, set only when
    /// denied. Callers typically round this up to whole seconds for a
    /// Retry-After header.
    pub retry_after: Option<Duration>,
}

impl Decision {
    fn allow() -> Self {
        Self {
            allowed: true,
            retry_after: None,
        }
    }

    fn deny(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after: Some(retry_after),
        }
    }
}

/// Bucket table plus the sweep timestamp, guarded as one unit so the
/// `len <= max_buckets` invariant is never violated even transiently.
struct LimiterState {
    buckets: HashMap<String, Bucket>,
    last_cleanup_nanos: u64,
}

/// Per-key token bucket rate limiter with bounded memory.
///
/// One instance is shared by all request-handling threads; every
/// admission check runs under a single coarse lock. Checks are cheap
/// (amortized O(1), O(n) only during the periodic stale sweep and on
/// eviction), so the coarse lock avoids the eviction-versus-refill
/// races of per-bucket locking at an acceptable throughput cost for
/// typical key cardinalities.
pub struct RateLimiter<C: Clock = SystemClock> {
    state: Mutex<LimiterState>,
    config: LimiterConfig,
    counters: AdmissionCounters,
    clock: C,
}

impl RateLimiter<SystemClock> {
    /// Create a rate limiter with the given default rate in requests
    /// per minute. A rate of zero is normalized to 600.
    pub fn new(rate_per_minute: u32) -> Self {
        Self::with_config(LimiterConfig {
            rate_per_minute,
            ..LimiterConfig::default()
        })
    }

    /// Create a rate limiter from a full configuration, using the
    /// system clock.
    pub fn with_config(config: LimiterConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a rate limiter with an explicit time source. Tests use
    /// this with a manual clock to drive refill and sweeps
    /// deterministically.
    pub fn with_clock(mut config: LimiterConfig, clock: C) -> Self {
        if config.rate_per_minute == 0 {
            config.rate_per_minute = DEFAULT_RATE_PER_MINUTE;
        }
        let now_nanos = clock.now_nanos();
        Self {
            state: Mutex::new(LimiterState {
                buckets: HashMap::new(),
                last_cleanup_nanos: now_nanos,
            }),
            config,
            counters: AdmissionCounters::default(),
            clock,
        }
    }

    /// The configured default rate in requests per minute.
    pub fn default_rate(&self) -> u32 {
        self.config.rate_per_minute
    }

    /// Check admission for `key` at the configured default rate.
    pub fn admit(&self, key: &str) -> Decision {
        self.try_admit(key, self.config.rate_per_minute)
    }

    /// Check admission for `key` at `rate_per_minute`, consuming one
    /// token on success.
    ///
    /// The rate may differ per call to support per-caller overrides; a
    /// zero rate falls back to the configured default. Keys are opaque;
    /// callers that want a shared anonymous bucket for empty identities
    /// substitute their own sentinel key before calling.
    pub fn try_admit(&self, key: &str, rate_per_minute: u32) -> Decision {
        let rate = if rate_per_minute == 0 {
            self.config.rate_per_minute
        } else {
            rate_per_minute
        };
        let now_nanos = self.clock.now_nanos();
        let mut state = self.state.lock();

        trace!(key, rate, "checking admission");

        // Opportunistic sweep, amortized across calls instead of a
        // dedicated timer thread.
        if now_nanos.saturating_sub(state.last_cleanup_nanos)
            > self.config.cleanup_interval().as_nanos() as u64
        {
            self.sweep_stale(&mut state, now_nanos);
            state.last_cleanup_nanos = now_nanos;
        }

        if !state.buckets.contains_key(key) {
            // Enforce the bucket cap before inserting; under adversarial
            // key churn new keys are rejected rather than allowed to
            // grow memory without bound.
            if state.buckets.len() >= self.config.max_buckets
                && !self.evict_oldest(&mut state)
            {
                self.counters.record_rejected();
                return Decision::deny(EVICTION_RETRY_AFTER);
            }

            debug!(key, rate, "creating bucket");
            state
                .buckets
                .insert(key.to_string(), Bucket::new(rate, now_nanos));
        }

        // The entry exists at this point; the lock has been held since
        // the lookup.
        let Some(bucket) = state.buckets.get_mut(key) else {
            self.counters.record_rejected();
            return Decision::deny(EVICTION_RETRY_AFTER);
        };

        bucket.last_accessed_nanos = now_nanos;
        bucket.refill(rate, now_nanos);

        if bucket.try_consume() {
            self.counters.record_allowed();
            Decision::allow()
        } else {
            let retry_after = bucket.retry_after(rate);
            self.counters.record_rejected();
            Decision::deny(retry_after)
        }
    }

    /// Remove buckets untouched for longer than the inactivity
    /// threshold.
    fn sweep_stale(&self, state: &mut LimiterState, now_nanos: u64) {
        let threshold = now_nanos
            .saturating_sub(self.config.inactive_threshold().as_nanos() as u64);
        let before = state.buckets.len();
        state
            .buckets
            .retain(|_, bucket| bucket.last_accessed_nanos >= threshold);
        let removed = before - state.buckets.len();
        if removed > 0 {
            self.counters.record_swept(removed as u64);
            debug!(removed, remaining = state.buckets.len(), "swept stale buckets");
        }
    }

    /// Remove the least recently accessed bucket. Returns false only if
    /// the table is empty, in which case there is nothing to evict.
    fn evict_oldest(&self, state: &mut LimiterState) -> bool {
        let victim = state
            .buckets
            .iter()
            .min_by_key(|(_, bucket)| bucket.last_accessed_nanos)
            .map(|(key, _)| key.clone());

        match victim {
            Some(key) => {
                state.buckets.remove(&key);
                self.counters.record_evicted();
                debug!(key = %key, "evicted least recently accessed bucket");
                true
            }
            None => false,
        }
    }

    /// Point-in-time admission statistics.
    pub fn stats(&self) -> LimiterStats {
        self.counters.snapshot()
    }

    /// Number of buckets currently held.
    pub fn bucket_count(&self) -> usize {
        self.state.lock().buckets.len()
    }

    /// Drop all buckets. Primarily useful for testing.
    pub fn clear(&self) {
        self.state.lock().buckets.clear();
    }
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::with_config(LimiterConfig::default())
    }
}
