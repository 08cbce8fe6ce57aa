//! Prelude module for common re-exports.
//!
//! Consumers can do `use rio_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{AppConfig, ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Alarm HAL ──────────────────────────────────────────────────────
pub use crate::hal::consts::{ALARM_NEVER, INVALID_HANDLE, WAIT_SHUTDOWN};
pub use crate::hal::driver::{AlarmDriver, AlarmHandle, DriverFactory, HalError};

// ─── Timebase ───────────────────────────────────────────────────────
pub use crate::timebase::{Clock, MonotonicClock};
