//! Host alarm driver.
//!
//! The `HostAlarmDriver` implements the `AlarmDriver` trait against the
//! process monotonic clock: each alarm is a mutex/condvar cell and the
//! waiter sleeps in `wait_timeout` until the programmed absolute time.
//! This is the backend used when running on a development machine without
//! a hardware timer block.

use rio_common::hal::consts::{ALARM_NEVER, WAIT_SHUTDOWN};
use rio_common::hal::driver::{AlarmDriver, AlarmHandle, HalError};
use rio_common::timebase::{Clock, MonotonicClock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Per-alarm mutable state, guarded by the cell mutex.
struct AlarmState {
    /// False once `stop` or `clean` has run; waiters observe 0.
    active: bool,
    /// Absolute trigger time [us]; `ALARM_NEVER` = unarmed.
    trigger_us: u64,
    /// Diagnostic label.
    name: String,
    /// Scheduling hint to apply from the waiting thread.
    pending_priority: Option<(bool, i32)>,
}

/// One alarm resource: state plus the condvar its waiter parks on.
struct AlarmCell {
    state: Mutex<AlarmState>,
    fired: Condvar,
}

/// Host alarm driver implementing the AlarmDriver trait.
pub struct HostAlarmDriver {
    /// Timebase shared with schedulers (process-wide epoch).
    clock: MonotonicClock,
    /// Live alarms by raw handle.
    alarms: Mutex<HashMap<i32, Arc<AlarmCell>>>,
    /// Next handle value; 0 is reserved as the invalid sentinel.
    next_handle: AtomicI32,
}

impl HostAlarmDriver {
    /// Create a new host driver instance.
    pub fn new() -> Self {
        Self {
            clock: MonotonicClock::new(),
            alarms: Mutex::new(HashMap::new()),
            next_handle: AtomicI32::new(1),
        }
    }

    /// Look up the cell for a handle.
    fn cell(&self, handle: AlarmHandle) -> Result<Arc<AlarmCell>, HalError> {
        if !handle.is_valid() {
            return Err(HalError::InvalidHandle(handle.raw()));
        }
        let alarms = self.alarms.lock().expect("alarm table lock poisoned");
        alarms
            .get(&handle.raw())
            .cloned()
            .ok_or(HalError::InvalidHandle(handle.raw()))
    }
}

impl Default for HostAlarmDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmDriver for HostAlarmDriver {
    fn name(&self) -> &'static str {
        "host"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn initialize(&self) -> Result<AlarmHandle, HalError> {
        let raw = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let cell = Arc::new(AlarmCell {
            state: Mutex::new(AlarmState {
                active: true,
                trigger_us: ALARM_NEVER,
                name: format!("alarm-{raw}"),
                pending_priority: None,
            }),
            fired: Condvar::new(),
        });
        self.alarms
            .lock()
            .expect("alarm table lock poisoned")
            .insert(raw, cell);
        let handle = AlarmHandle::from_raw(raw);
        debug!("allocated {handle}");
        Ok(handle)
    }

    fn wait(&self, handle: AlarmHandle) -> Result<u64, HalError> {
        let cell = self.cell(handle)?;
        let mut state = cell.state.lock().expect("alarm state lock poisoned");
        loop {
            // The waiter is the delivery thread on a host build, so any
            // pending scheduling hint is applied here.
            if let Some((real_time, priority)) = state.pending_priority.take() {
                if !crate::rt::set_thread_scheduler(real_time, priority) {
                    warn!("{handle}: thread priority request not applied");
                }
            }
            if !state.active {
                return Ok(WAIT_SHUTDOWN);
            }
            let now = self.clock.now_us();
            if state.trigger_us != ALARM_NEVER && now >= state.trigger_us {
                state.trigger_us = ALARM_NEVER;
                return Ok(now);
            }
            state = if state.trigger_us == ALARM_NEVER {
                cell.fired
                    .wait(state)
                    .expect("alarm state lock poisoned")
            } else {
                let timeout = Duration::from_micros(state.trigger_us - now);
                cell.fired
                    .wait_timeout(state, timeout)
                    .expect("alarm state lock poisoned")
                    .0
            };
        }
    }

    fn update(&self, handle: AlarmHandle, trigger_time_us: u64) -> Result<(), HalError> {
        let cell = self.cell(handle)?;
        let mut state = cell.state.lock().expect("alarm state lock poisoned");
        state.trigger_us = trigger_time_us;
        // Wake the waiter so a shorter deadline takes effect immediately.
        cell.fired.notify_all();
        Ok(())
    }

    fn cancel(&self, handle: AlarmHandle) -> Result<(), HalError> {
        let cell = self.cell(handle)?;
        let mut state = cell.state.lock().expect("alarm state lock poisoned");
        state.trigger_us = ALARM_NEVER;
        Ok(())
    }

    fn stop(&self, handle: AlarmHandle) -> Result<(), HalError> {
        let cell = self.cell(handle)?;
        let mut state = cell.state.lock().expect("alarm state lock poisoned");
        state.active = false;
        cell.fired.notify_all();
        debug!("stopped {handle} ({})", state.name);
        Ok(())
    }

    fn clean(&self, handle: AlarmHandle) -> Result<(), HalError> {
        // Table lock before cell lock, the order every other path uses.
        let cell = self
            .alarms
            .lock()
            .expect("alarm table lock poisoned")
            .remove(&handle.raw())
            .ok_or(HalError::InvalidHandle(handle.raw()))?;
        // A stray waiter still parked on the cell must observe shutdown.
        let mut state = cell.state.lock().expect("alarm state lock poisoned");
        state.active = false;
        cell.fired.notify_all();
        debug!("cleaned {handle}");
        Ok(())
    }

    fn set_name(&self, handle: AlarmHandle, name: &str) -> Result<(), HalError> {
        let cell = self.cell(handle)?;
        let mut state = cell.state.lock().expect("alarm state lock poisoned");
        state.name = name.to_string();
        Ok(())
    }

    fn set_thread_priority(&self, real_time: bool, priority: i32) -> Result<bool, HalError> {
        if real_time && !(1..=99).contains(&priority) {
            return Err(HalError::HardwareFault(format!(
                "SCHED_FIFO priority {priority} out of range 1..=99"
            )));
        }
        let alarms = self.alarms.lock().expect("alarm table lock poisoned");
        for cell in alarms.values() {
            let mut state = cell.state.lock().expect("alarm state lock poisoned");
            state.pending_priority = Some((real_time, priority));
            cell.fired.notify_all();
        }
        // The sched call itself runs on each waiter; report whether the
        // platform can honor it at all.
        Ok(cfg!(target_os = "linux"))
    }
}

/// Factory for the driver registry.
pub fn create_driver() -> Arc<dyn AlarmDriver> {
    Arc::new(HostAlarmDriver::new())
}
