//! Monotonic timestamp sources.
//!
//! Alarm triggers are absolute microsecond timestamps, so the scheduler
//! and the alarm backend must read the same clock. [`MonotonicClock`]
//! measures from a single process-wide epoch; every instance agrees with
//! every other, which lets independently constructed components share a
//! timebase without plumbing an epoch around.

use std::sync::LazyLock;
use std::time::Instant;

/// Process-wide epoch for monotonic timestamps.
static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

/// A source of monotonic microsecond timestamps.
///
/// Implementations must be non-decreasing. The sim alarm driver provides
/// its own manually advanced implementation for deterministic tests.
pub trait Clock: Send + Sync {
    /// Current time in microseconds since the clock's epoch.
    fn now_us(&self) -> u64;
}

/// Monotonic wall-free clock backed by [`Instant`].
///
/// All instances share one epoch (first use in the process), so
/// `MonotonicClock::default().now_us()` is comparable across components.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    /// Create a clock. Forces the shared epoch so later reads are cheap.
    pub fn new() -> Self {
        let _ = *EPOCH;
        Self
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u64 {
        EPOCH.elapsed().as_micros() as u64
    }
}
