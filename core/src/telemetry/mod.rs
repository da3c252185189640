//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for diff/transform requests.
//!
//! - Counters are mutated while the XOR stream runs.
//! - Timers record per-stage durations (resolve, diff, transform).
//! - A snapshot is built once at the end of a request and never mutated;
//!   external peak memory is carried in it rather than in shared state.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
