//! telemetry/mod.rs
//! Counters collected while a container is written or read, and the
//! immutable summary returned when it is closed.
//!
//! Design notes:
//! - Counters are plain integers owned by one writer or reader; no atomics.
//! - The summary is serde-serializable so callers can log or persist it.
//! - Only sizes and counts are recorded, never content or key bytes.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
