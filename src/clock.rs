//! Time source abstraction for the rate limiter.
//!
//! The limiter reads time only through the [`Clock`] trait, which keeps
//! its behavior a pure function of call timestamps and lets tests drive
//! it deterministically with a manual clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds in one minute, the unit the token arithmetic works in.
pub(crate) const NANOS_PER_MINUTE: f64 = 60_000_000_000.0;

/// A source of the current time, in nanoseconds since the Unix epoch.
///
/// Implementors must be thread-safe; the limiter calls `now_nanos` from
/// many threads concurrently.
pub trait Clock: Send + Sync {
    fn now_nanos(&self) -> u64;
}

/// System wall clock, the default time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> u64 {
        // Saturates to zero before the epoch rather than failing; the
        // admission path has no error return.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}
