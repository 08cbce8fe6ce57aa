//! Alarm handle and timestamp constants.

/// Sentinel for an invalidated or never-allocated alarm handle.
///
/// A `Notifier` exchanges its handle slot to this value at the start of
/// destruction; a worker observing it exits its wait loop.
pub const INVALID_HANDLE: i32 = 0;

/// Absolute trigger time meaning "never fire".
///
/// Programming an alarm to this value parks its waiter indefinitely until
/// the alarm is reprogrammed or stopped.
pub const ALARM_NEVER: u64 = u64::MAX;

/// Timestamp returned by `wait` to signal shutdown rather than a firing.
pub const WAIT_SHUTDOWN: u64 = 0;

/// Default real-time priority requested for alarm delivery (SCHED_FIFO).
pub const DEFAULT_RT_PRIORITY: i32 = 40;
