//! Notifier struct and worker loop.
//!
//! Concurrency model: the owning thread and the worker share two pieces of
//! state with different disciplines. The schedule (handler, period, mode,
//! expiration) lives behind one mutex that both sides take for short
//! read-modify-write sections. The alarm handle lives in a separate atomic
//! slot so destruction can signal the worker without contending on the
//! schedule mutex — the worker may be parked inside the driver's `wait`,
//! not waiting on the mutex. Lock order is always schedule, then driver.

use rio_common::hal::consts::{ALARM_NEVER, INVALID_HANDLE, WAIT_SHUTDOWN};
use rio_common::hal::driver::{AlarmDriver, AlarmHandle, HalError};
use rio_common::timebase::{Clock, MonotonicClock};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Shared callback type invoked on each alarm firing. Callers hand in a
/// plain closure through the generic constructors; this is the stored form.
pub(crate) type Handler = Arc<dyn Fn() + Send + Sync + 'static>;

/// Error types for notifier operations.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// A caller-supplied value was rejected at the boundary.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The alarm backend failed during construction.
    #[error(transparent)]
    Hardware(#[from] HalError),
}

/// Schedule fields, mutated only under the schedule mutex.
struct Schedule {
    /// Callback snapshot taken by the worker on each firing.
    handler: Handler,
    /// Rearm interval in periodic mode; last requested delay otherwise.
    period: Duration,
    /// True = recurring, false = one-shot.
    periodic: bool,
    /// Absolute time [us] of the next scheduled firing.
    expiration_us: u64,
}

/// Alarm-driven callback scheduler.
///
/// Owns exactly one alarm handle and one worker thread for its whole
/// lifetime. A stopped Notifier cannot be restarted with a fresh worker;
/// construct a new one instead.
pub struct Notifier {
    /// Alarm backend; shared with the worker.
    driver: Arc<dyn AlarmDriver>,
    /// Timebase used to compute absolute deadlines. Must be the same
    /// clock the driver fires against.
    clock: Arc<dyn Clock>,
    /// Raw alarm handle; swapped to `INVALID_HANDLE` exactly once, at the
    /// start of destruction.
    handle: Arc<AtomicI32>,
    /// Schedule shared with the worker.
    schedule: Arc<Mutex<Schedule>>,
    /// Worker join handle; taken exactly once, in `drop`.
    worker: Option<JoinHandle<()>>,
}

impl Notifier {
    /// Create a notifier on the host alarm driver and monotonic clock.
    ///
    /// The worker starts immediately but does not fire until
    /// [`start_single`](Self::start_single) or
    /// [`start_periodic`](Self::start_periodic).
    ///
    /// # Errors
    /// Returns `NotifierError::Hardware` if the alarm cannot be allocated
    /// or the worker cannot be spawned. No resource is leaked on failure.
    pub fn new<F>(handler: F) -> Result<Self, NotifierError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::with_driver(
            rio_hal::drivers::host::create_driver(),
            Arc::new(MonotonicClock::new()),
            handler,
        )
    }

    /// Create a notifier on an explicit driver and clock.
    ///
    /// The clock must share a timebase with the driver: deadlines are
    /// computed as `clock.now_us() + delay` and handed to the driver as
    /// absolute times. The sim driver implements `Clock` itself for this
    /// reason.
    pub fn with_driver<F>(
        driver: Arc<dyn AlarmDriver>,
        clock: Arc<dyn Clock>,
        handler: F,
    ) -> Result<Self, NotifierError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let alarm = driver.initialize()?;
        let handle = Arc::new(AtomicI32::new(alarm.raw()));
        let schedule = Arc::new(Mutex::new(Schedule {
            handler: Arc::new(handler),
            period: Duration::ZERO,
            periodic: false,
            expiration_us: 0,
        }));

        let spawn_result = {
            let driver = Arc::clone(&driver);
            let handle = Arc::clone(&handle);
            let schedule = Arc::clone(&schedule);
            thread::Builder::new()
                .name("rio-notifier".to_string())
                .spawn(move || worker_loop(driver, handle, schedule))
        };

        match spawn_result {
            Ok(worker) => Ok(Self {
                driver,
                clock,
                handle,
                schedule,
                worker: Some(worker),
            }),
            Err(e) => {
                // No partial Notifier: release the alarm we just allocated.
                if let Err(clean_err) = driver.clean(alarm) {
                    warn!("alarm release after spawn failure failed: {clean_err}");
                }
                Err(NotifierError::Hardware(HalError::InitFailed(format!(
                    "worker spawn failed: {e}"
                ))))
            }
        }
    }

    /// Replace the callback.
    ///
    /// Takes effect on the next firing; an invocation already in flight
    /// keeps the callback it snapshotted.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut sched = self.schedule.lock().expect("schedule lock poisoned");
        sched.handler = Arc::new(handler);
    }

    /// Schedule a single firing after `delay`.
    ///
    /// Switches out of periodic mode immediately: no firing from the old
    /// schedule is delivered after this call returns, unless it was
    /// already in flight.
    pub fn start_single(&self, delay: Duration) {
        self.start(delay, false);
    }

    /// Schedule recurring firings every `period`.
    ///
    /// # Errors
    /// Returns `NotifierError::InvalidArgument` for a zero period.
    pub fn start_periodic(&self, period: Duration) -> Result<(), NotifierError> {
        if period.is_zero() {
            return Err(NotifierError::InvalidArgument(
                "periodic period must be positive".to_string(),
            ));
        }
        self.start(period, true);
        Ok(())
    }

    /// Stop scheduled firings.
    ///
    /// Cooperative and non-blocking: an invocation already in flight
    /// completes, and the worker stays parked for a later `start_*`.
    /// Cancel failures are reported, never returned. Safe to call
    /// repeatedly from any thread.
    pub fn stop(&self) {
        let mut sched = self.schedule.lock().expect("schedule lock poisoned");
        sched.periodic = false;
        let raw = self.handle.load(Ordering::Acquire);
        if raw == INVALID_HANDLE {
            return;
        }
        if let Err(e) = self.driver.cancel(AlarmHandle::from_raw(raw)) {
            warn!("alarm cancel failed: {e}");
        }
    }

    /// Attach a diagnostic label to the underlying alarm resource.
    pub fn set_name(&self, name: &str) {
        let raw = self.handle.load(Ordering::Acquire);
        if raw == INVALID_HANDLE {
            return;
        }
        if let Err(e) = self.driver.set_name(AlarmHandle::from_raw(raw), name) {
            warn!("alarm set_name failed: {e}");
        }
    }

    /// Request an OS scheduling class for alarm delivery.
    ///
    /// Returns whether the request was accepted. Purely a scheduling hint;
    /// no effect on notifier semantics.
    pub fn set_hal_thread_priority(&self, real_time: bool, priority: i32) -> bool {
        match self.driver.set_thread_priority(real_time, priority) {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("thread priority request failed: {e}");
                false
            }
        }
    }

    /// Common start path for both modes.
    fn start(&self, delay: Duration, periodic: bool) {
        let mut sched = self.schedule.lock().expect("schedule lock poisoned");
        sched.periodic = periodic;
        sched.period = delay;
        sched.expiration_us = self.clock.now_us() + delay.as_micros() as u64;
        update_alarm(self.driver.as_ref(), &self.handle, sched.expiration_us);
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        // Invalidate before stopping so the worker's next wake-up, whether
        // from the stop or from a stray firing, observes the sentinel and
        // exits instead of looping again.
        let raw = self.handle.swap(INVALID_HANDLE, Ordering::AcqRel);
        if raw != INVALID_HANDLE {
            if let Err(e) = self.driver.stop(AlarmHandle::from_raw(raw)) {
                warn!("alarm stop during teardown failed: {e}");
            }
        }

        // Rendezvous: after this join the callback can never run again.
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("notifier worker was terminated by a callback panic");
            }
        }

        if raw != INVALID_HANDLE {
            if let Err(e) = self.driver.clean(AlarmHandle::from_raw(raw)) {
                warn!("alarm release during teardown failed: {e}");
            }
        }
    }
}

/// Wait loop run by the dedicated worker thread.
fn worker_loop(driver: Arc<dyn AlarmDriver>, handle: Arc<AtomicI32>, schedule: Arc<Mutex<Schedule>>) {
    loop {
        let raw = handle.load(Ordering::Acquire);
        if raw == INVALID_HANDLE {
            break;
        }
        let alarm = AlarmHandle::from_raw(raw);

        let fired_at = match driver.wait(alarm) {
            Ok(ts) => ts,
            // Wait errors are a shutdown signal, not a fault.
            Err(e) => {
                debug!("alarm wait ended: {e}");
                break;
            }
        };
        if fired_at == WAIT_SHUTDOWN {
            break;
        }

        let handler = {
            let mut sched = schedule.lock().expect("schedule lock poisoned");
            let handler = Arc::clone(&sched.handler);
            if sched.periodic {
                // Advance by exactly one period from the previous deadline
                // so jitter does not accumulate as drift.
                sched.expiration_us += sched.period.as_micros() as u64;
                update_alarm(driver.as_ref(), &handle, sched.expiration_us);
            } else {
                // Park the alarm so the next wait blocks until a restart.
                update_alarm(driver.as_ref(), &handle, ALARM_NEVER);
            }
            handler
        };

        // Outside the mutex; a panic here unwinds the worker and is
        // surfaced at join time.
        handler();
    }
    debug!("notifier worker exited");
}

/// Reprogram the alarm unless destruction has already invalidated the
/// handle. Reprogram failures are reported, never fatal.
fn update_alarm(driver: &dyn AlarmDriver, handle: &AtomicI32, trigger_us: u64) {
    let raw = handle.load(Ordering::Acquire);
    if raw == INVALID_HANDLE {
        return;
    }
    if let Err(e) = driver.update(AlarmHandle::from_raw(raw), trigger_us) {
        warn!("alarm reprogram failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rio_hal::drivers::sim::SimAlarmDriver;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_construction_does_not_fire() {
        let driver = Arc::new(SimAlarmDriver::new());
        let fired = Arc::new(AtomicU32::new(0));
        let notifier = {
            let fired = Arc::clone(&fired);
            Notifier::with_driver(driver.clone(), driver.clone(), move || {
                fired.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap()
        };
        driver.advance(Duration::from_secs(10));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(fired.load(Ordering::Relaxed), 0);
        drop(notifier);
    }

    #[test]
    fn test_start_periodic_rejects_zero_period() {
        let driver = Arc::new(SimAlarmDriver::new());
        let notifier = Notifier::with_driver(driver.clone(), driver.clone(), || {}).unwrap();
        let result = notifier.start_periodic(Duration::ZERO);
        assert!(matches!(result, Err(NotifierError::InvalidArgument(_))));
    }

    #[test]
    fn test_drop_stops_and_releases_alarm() {
        let driver = Arc::new(SimAlarmDriver::new());
        let notifier = Notifier::with_driver(driver.clone(), driver.clone(), || {}).unwrap();
        drop(notifier);
        // All alarms released: a fresh wait on any old handle is invalid,
        // and no trigger survives in history beyond construction state.
        assert_eq!(
            driver.update_history(),
            Vec::<u64>::new(),
            "no start was issued, so nothing was ever armed"
        );
    }
}
