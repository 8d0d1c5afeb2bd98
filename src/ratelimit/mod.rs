//! Rate limiting logic and state management.

mod bucket;
mod limiter;
mod stats;

pub use limiter::{Decision, RateLimiter};
pub use stats::LimiterStats;
