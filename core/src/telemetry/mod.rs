//! telemetry/mod.rs
//! Session counters and stage timers.
//!
//! Notes:
//! - Each session owns its counters; no atomics, no locks.
//! - Timers measure time spent inside accelerator calls only.

pub mod counters;
pub mod timers;

pub use counters::*;
pub use timers::*;
