//! Alarm driver trait and error types.
//!
//! This module defines:
//! - `AlarmDriver` trait - Interface for pluggable alarm backends
//! - `AlarmHandle` - Opaque handle to one alarm resource
//! - `HalError` enum - Error types for alarm operations
//! - `DriverFactory` type alias - Factory function type

use crate::hal::consts::INVALID_HANDLE;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error types for alarm operations.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Resource allocation or worker startup failed
    #[error("initialization failed: {0}")]
    InitFailed(String),

    /// Operation on an unknown or invalidated handle
    #[error("invalid alarm handle: {0}")]
    InvalidHandle(i32),

    /// Driver not found in the registry
    #[error("driver not found: {0}")]
    DriverNotFound(String),

    /// Backend reported a non-zero status
    #[error("hardware fault: {0}")]
    HardwareFault(String),
}

/// Opaque handle to one hardware alarm resource.
///
/// Handles are allocated by [`AlarmDriver::initialize`] and remain valid
/// until [`AlarmDriver::clean`]. The raw value is exposed so owners can
/// park it in an atomic slot; [`INVALID_HANDLE`] never names a live alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlarmHandle(i32);

impl AlarmHandle {
    /// Wrap a raw handle value.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw handle value, suitable for an atomic slot.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whether this handle names a live alarm.
    pub const fn is_valid(self) -> bool {
        self.0 != INVALID_HANDLE
    }
}

impl fmt::Display for AlarmHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alarm#{}", self.0)
    }
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Arc<dyn AlarmDriver>;

/// Trait defining the interface for alarm backends.
///
/// An alarm is a one-shot absolute-time trigger: once programmed via
/// [`update`](Self::update), the next [`wait`](Self::wait) on its handle
/// returns when the driver's clock reaches the trigger time, and the
/// trigger is cleared. Callers rearm explicitly after every firing.
///
/// # Lifecycle
///
/// 1. `initialize()` - allocate a handle
/// 2. `update()` / `wait()` / `cancel()` - steady state
/// 3. `stop()` - deactivate and release any blocked waiter
/// 4. `clean()` - free the resource
///
/// Drivers are shared between the owning thread and one waiter per handle,
/// so every method takes `&self` and implementations synchronize internally.
pub trait AlarmDriver: Send + Sync {
    /// Returns the driver's unique identifier (e.g., "host", "sim").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Allocate a new alarm resource.
    ///
    /// The alarm starts unarmed (trigger at [`ALARM_NEVER`](crate::hal::consts::ALARM_NEVER)): a `wait` on a
    /// freshly allocated handle blocks until the first `update`.
    ///
    /// # Errors
    /// Returns `HalError::InitFailed` if the backend cannot allocate.
    fn initialize(&self) -> Result<AlarmHandle, HalError>;

    /// Block until the programmed trigger time is reached.
    ///
    /// Returns the firing timestamp in microseconds on the driver's clock,
    /// or [`WAIT_SHUTDOWN`](crate::hal::consts::WAIT_SHUTDOWN) (0) once the
    /// alarm has been stopped or cleaned. The pending trigger is cleared on
    /// a firing; the caller must `update` again to receive another one.
    ///
    /// # Errors
    /// Returns `HalError::InvalidHandle` if the handle was never allocated.
    /// Callers treat wait errors as a shutdown signal, not a fault.
    fn wait(&self, handle: AlarmHandle) -> Result<u64, HalError>;

    /// Program the alarm to fire at an absolute time in microseconds.
    ///
    /// [`ALARM_NEVER`](crate::hal::consts::ALARM_NEVER) parks the waiter indefinitely. Reprogramming an
    /// already armed alarm replaces the pending trigger.
    fn update(&self, handle: AlarmHandle, trigger_time_us: u64) -> Result<(), HalError>;

    /// Clear the pending trigger without waking the waiter.
    ///
    /// Equivalent to `update(handle, ALARM_NEVER)`; a no-op on an unarmed
    /// alarm.
    fn cancel(&self, handle: AlarmHandle) -> Result<(), HalError>;

    /// Deactivate the alarm and wake its waiter with the shutdown sentinel.
    ///
    /// After `stop`, every `wait` on the handle returns 0 immediately.
    fn stop(&self, handle: AlarmHandle) -> Result<(), HalError>;

    /// Release the alarm resource.
    ///
    /// Callers must `stop` first so no waiter is still blocked; `clean` on
    /// a handle with a live waiter also wakes it with the shutdown
    /// sentinel.
    fn clean(&self, handle: AlarmHandle) -> Result<(), HalError>;

    /// Attach a diagnostic label to the alarm. No behavioral effect.
    ///
    /// Default implementation does nothing (for backends without naming).
    fn set_name(&self, _handle: AlarmHandle, _name: &str) -> Result<(), HalError> {
        Ok(())
    }

    /// Request an OS scheduling class for the alarm delivery mechanism.
    ///
    /// `real_time` selects SCHED_FIFO with the given priority; `false`
    /// reverts to the default class. Returns whether the request was
    /// accepted. Purely a hint: no effect on alarm semantics.
    fn set_thread_priority(&self, _real_time: bool, _priority: i32) -> Result<bool, HalError> {
        Ok(false)
    }
}
