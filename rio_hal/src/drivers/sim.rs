//! Simulation alarm driver.
//!
//! The `SimAlarmDriver` implements the `AlarmDriver` trait on a manually
//! advanced microsecond clock. Time only moves when a test calls
//! [`advance`](SimAlarmDriver::advance), which makes firing sequences
//! fully deterministic. The driver also implements `Clock`, so schedulers
//! built on it compute deadlines in simulated time.

use rio_common::hal::consts::{ALARM_NEVER, WAIT_SHUTDOWN};
use rio_common::hal::driver::{AlarmDriver, AlarmHandle, HalError};
use rio_common::timebase::Clock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use tracing::debug;

/// Per-alarm state.
struct SimAlarm {
    /// False once `stop` or `clean` has run; waiters observe 0.
    active: bool,
    /// Absolute trigger time [us]; `ALARM_NEVER` = unarmed.
    trigger_us: u64,
    /// Diagnostic label.
    name: String,
}

/// Driver-wide state behind a single mutex: the mock is contention-free
/// enough that fine-grained locking would buy nothing.
struct SimInner {
    /// Simulated time [us].
    now_us: u64,
    /// Live alarms by raw handle.
    alarms: HashMap<i32, SimAlarm>,
    /// Every trigger value ever passed to `update`, in call order.
    /// Lets tests assert on rearm behavior without reaching into alarms.
    update_log: Vec<u64>,
}

/// Simulation alarm driver implementing the AlarmDriver trait.
pub struct SimAlarmDriver {
    inner: Mutex<SimInner>,
    /// Signaled on every time advance and state change.
    tick: Condvar,
    /// Next handle value; 0 is reserved as the invalid sentinel.
    next_handle: AtomicI32,
}

impl SimAlarmDriver {
    /// Create a new simulation driver at time zero.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SimInner {
                now_us: 0,
                alarms: HashMap::new(),
                update_log: Vec::new(),
            }),
            tick: Condvar::new(),
            next_handle: AtomicI32::new(1),
        }
    }

    /// Advance simulated time and wake all waiters.
    ///
    /// Returns the new simulated time in microseconds.
    pub fn advance(&self, delta: Duration) -> u64 {
        let mut inner = self.inner.lock().expect("sim state lock poisoned");
        inner.now_us += delta.as_micros() as u64;
        let now = inner.now_us;
        self.tick.notify_all();
        debug!("sim time advanced to {now}us");
        now
    }

    /// Current trigger programmed for a handle, `None` if unarmed.
    pub fn programmed_trigger(&self, handle: AlarmHandle) -> Option<u64> {
        let inner = self.inner.lock().expect("sim state lock poisoned");
        inner
            .alarms
            .get(&handle.raw())
            .map(|a| a.trigger_us)
            .filter(|&t| t != ALARM_NEVER)
    }

    /// All trigger values passed to `update` so far, in call order.
    ///
    /// Includes `ALARM_NEVER` entries from single-shot parking; filter on
    /// `t != ALARM_NEVER` for the armed sequence.
    pub fn update_history(&self) -> Vec<u64> {
        let inner = self.inner.lock().expect("sim state lock poisoned");
        inner.update_log.clone()
    }
}

impl Default for SimAlarmDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SimAlarmDriver {
    fn now_us(&self) -> u64 {
        self.inner.lock().expect("sim state lock poisoned").now_us
    }
}

impl AlarmDriver for SimAlarmDriver {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn initialize(&self) -> Result<AlarmHandle, HalError> {
        let raw = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.lock().expect("sim state lock poisoned");
        inner.alarms.insert(
            raw,
            SimAlarm {
                active: true,
                trigger_us: ALARM_NEVER,
                name: format!("sim-alarm-{raw}"),
            },
        );
        Ok(AlarmHandle::from_raw(raw))
    }

    fn wait(&self, handle: AlarmHandle) -> Result<u64, HalError> {
        let mut inner = self.inner.lock().expect("sim state lock poisoned");
        if !inner.alarms.contains_key(&handle.raw()) {
            return Err(HalError::InvalidHandle(handle.raw()));
        }
        loop {
            let now = inner.now_us;
            // Cleaned mid-wait counts as shutdown, not an error.
            let Some(alarm) = inner.alarms.get_mut(&handle.raw()) else {
                return Ok(WAIT_SHUTDOWN);
            };
            if !alarm.active {
                return Ok(WAIT_SHUTDOWN);
            }
            if alarm.trigger_us != ALARM_NEVER && now >= alarm.trigger_us {
                alarm.trigger_us = ALARM_NEVER;
                return Ok(now);
            }
            inner = self.tick.wait(inner).expect("sim state lock poisoned");
        }
    }

    fn update(&self, handle: AlarmHandle, trigger_time_us: u64) -> Result<(), HalError> {
        let mut inner = self.inner.lock().expect("sim state lock poisoned");
        inner.update_log.push(trigger_time_us);
        let alarm = inner
            .alarms
            .get_mut(&handle.raw())
            .ok_or(HalError::InvalidHandle(handle.raw()))?;
        alarm.trigger_us = trigger_time_us;
        self.tick.notify_all();
        Ok(())
    }

    fn cancel(&self, handle: AlarmHandle) -> Result<(), HalError> {
        let mut inner = self.inner.lock().expect("sim state lock poisoned");
        let alarm = inner
            .alarms
            .get_mut(&handle.raw())
            .ok_or(HalError::InvalidHandle(handle.raw()))?;
        alarm.trigger_us = ALARM_NEVER;
        Ok(())
    }

    fn stop(&self, handle: AlarmHandle) -> Result<(), HalError> {
        let mut inner = self.inner.lock().expect("sim state lock poisoned");
        let alarm = inner
            .alarms
            .get_mut(&handle.raw())
            .ok_or(HalError::InvalidHandle(handle.raw()))?;
        alarm.active = false;
        debug!("stopped sim alarm {} ({})", handle, alarm.name);
        self.tick.notify_all();
        Ok(())
    }

    fn clean(&self, handle: AlarmHandle) -> Result<(), HalError> {
        let mut inner = self.inner.lock().expect("sim state lock poisoned");
        inner
            .alarms
            .remove(&handle.raw())
            .ok_or(HalError::InvalidHandle(handle.raw()))?;
        self.tick.notify_all();
        Ok(())
    }

    fn set_name(&self, handle: AlarmHandle, name: &str) -> Result<(), HalError> {
        let mut inner = self.inner.lock().expect("sim state lock poisoned");
        let alarm = inner
            .alarms
            .get_mut(&handle.raw())
            .ok_or(HalError::InvalidHandle(handle.raw()))?;
        alarm.name = name.to_string();
        Ok(())
    }
}

/// Factory for the driver registry.
pub fn create_driver() -> Arc<dyn AlarmDriver> {
    Arc::new(SimAlarmDriver::new())
}
