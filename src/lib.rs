//! Sluice - Per-Key Token Bucket Rate Limiting
//!
//! This crate implements the admission-control core of a request-handling
//! stack: a shared, concurrently-accessed collection of token buckets, one
//! per caller-supplied key (tenant, API key, client IP). Buckets refill
//! lazily from call timestamps, so no background timers are involved, and
//! the bucket table is hard-capped with stale sweeps and least-recently-
//! accessed eviction so memory stays bounded under unbounded key
//! cardinality. Transport, header handling, and metrics export live in the
//! calling layer.

pub mod ratelimit;
pub mod clock;
pub mod config;
pub mod error;
