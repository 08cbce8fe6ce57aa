//! # Notifier Integration Tests
//!
//! End-to-end scheduling behavior on the deterministic sim driver:
//! single-shot and periodic firing, mode switches, stop, handler
//! replacement, and teardown while the worker is blocked in the alarm
//! wait. Each test drives simulated time explicitly and rendezvous with
//! the callback through an mpsc channel.

use rio_common::hal::consts::ALARM_NEVER;
use rio_common::hal::driver::{AlarmDriver, AlarmHandle, HalError};
use rio_hal::drivers::sim::SimAlarmDriver;
use rio_notifier::{Notifier, NotifierError};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

// ─── Helpers ────────────────────────────────────────────────────────

/// Notifier on a fresh sim driver whose callback sends a unit tick.
fn tick_notifier() -> (Arc<SimAlarmDriver>, Notifier, Receiver<()>) {
    let driver = Arc::new(SimAlarmDriver::new());
    let (tx, rx) = mpsc::channel();
    let notifier = Notifier::with_driver(driver.clone(), driver.clone(), move || {
        tx.send(()).unwrap();
    })
    .expect("construct notifier");
    (driver, notifier, rx)
}

/// Wait for exactly one tick.
fn expect_tick(rx: &Receiver<()>) {
    rx.recv_timeout(Duration::from_secs(2))
        .expect("callback should have fired");
}

/// Assert no tick arrives within a grace window.
fn expect_no_tick(rx: &Receiver<()>) {
    assert_eq!(
        rx.recv_timeout(Duration::from_millis(100)),
        Err(RecvTimeoutError::Timeout),
        "callback fired when no firing was scheduled"
    );
}

/// Armed (non-parking) triggers programmed so far, in order.
fn armed_history(driver: &SimAlarmDriver) -> Vec<u64> {
    driver
        .update_history()
        .into_iter()
        .filter(|&t| t != ALARM_NEVER)
        .collect()
}

// ─── Construction ──────────────────────────────────────────────────

#[test]
fn test_construction_is_prompt_and_does_not_fire() {
    let started = Instant::now();
    let (driver, notifier, rx) = tick_notifier();
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "construction must not block beyond allocation + spawn"
    );

    // Time passing without a start must not fire.
    driver.advance(Duration::from_secs(60));
    expect_no_tick(&rx);
    drop(notifier);
}

#[test]
fn test_failed_allocation_produces_no_notifier() {
    struct DeadDriver;

    impl AlarmDriver for DeadDriver {
        fn name(&self) -> &'static str {
            "dead"
        }
        fn version(&self) -> &'static str {
            "0.0.0"
        }
        fn initialize(&self) -> Result<AlarmHandle, HalError> {
            Err(HalError::InitFailed("no alarms left".to_string()))
        }
        fn wait(&self, handle: AlarmHandle) -> Result<u64, HalError> {
            Err(HalError::InvalidHandle(handle.raw()))
        }
        fn update(&self, handle: AlarmHandle, _t: u64) -> Result<(), HalError> {
            Err(HalError::InvalidHandle(handle.raw()))
        }
        fn cancel(&self, handle: AlarmHandle) -> Result<(), HalError> {
            Err(HalError::InvalidHandle(handle.raw()))
        }
        fn stop(&self, handle: AlarmHandle) -> Result<(), HalError> {
            Err(HalError::InvalidHandle(handle.raw()))
        }
        fn clean(&self, handle: AlarmHandle) -> Result<(), HalError> {
            Err(HalError::InvalidHandle(handle.raw()))
        }
    }

    let driver: Arc<dyn AlarmDriver> = Arc::new(DeadDriver);
    let clock = Arc::new(rio_common::timebase::MonotonicClock::new());
    let result = Notifier::with_driver(driver, clock, || {});
    assert!(matches!(result, Err(NotifierError::Hardware(_))));
}

// ─── Single-shot mode ──────────────────────────────────────────────

#[test]
fn test_single_fires_exactly_once() {
    let (driver, notifier, rx) = tick_notifier();
    notifier.start_single(Duration::from_millis(50));

    driver.advance(Duration::from_millis(50));
    expect_tick(&rx);

    // No rearm without another start, however far time advances.
    driver.advance(Duration::from_secs(10));
    expect_no_tick(&rx);

    // The firing parked the alarm.
    assert_eq!(driver.update_history().last(), Some(&ALARM_NEVER));
    drop(notifier);
}

#[test]
fn test_single_can_be_restarted_after_firing() {
    let (driver, notifier, rx) = tick_notifier();

    notifier.start_single(Duration::from_millis(10));
    driver.advance(Duration::from_millis(10));
    expect_tick(&rx);

    notifier.start_single(Duration::from_millis(10));
    driver.advance(Duration::from_millis(10));
    expect_tick(&rx);
    expect_no_tick(&rx);
    drop(notifier);
}

// ─── Periodic mode ─────────────────────────────────────────────────

#[test]
fn test_periodic_fires_once_per_period_without_drift() {
    let (driver, notifier, rx) = tick_notifier();
    let period_us = 20_000u64;
    notifier
        .start_periodic(Duration::from_micros(period_us))
        .unwrap();

    let n = 5;
    for _ in 0..n {
        driver.advance(Duration::from_micros(period_us));
        expect_tick(&rx);
    }
    expect_no_tick(&rx);

    // Sim time started at 0, so the armed deadlines must be exact
    // multiples of the period: one from start, one per rearm.
    let expected: Vec<u64> = (1..=n as u64 + 1).map(|i| i * period_us).collect();
    assert_eq!(armed_history(&driver), expected);
    drop(notifier);
}

#[test]
fn test_periodic_rejects_zero_period() {
    let (_driver, notifier, _rx) = tick_notifier();
    assert!(matches!(
        notifier.start_periodic(Duration::ZERO),
        Err(NotifierError::InvalidArgument(_))
    ));
}

// ─── Mode switching ────────────────────────────────────────────────

#[test]
fn test_start_single_during_periodic_switches_atomically() {
    let (driver, notifier, rx) = tick_notifier();
    notifier.start_periodic(Duration::from_millis(10)).unwrap();

    driver.advance(Duration::from_millis(10));
    expect_tick(&rx);

    // Switch modes; the pending periodic deadline (t=20ms) is replaced by
    // the single deadline (t=35ms).
    notifier.start_single(Duration::from_millis(25));

    driver.advance(Duration::from_millis(10));
    expect_no_tick(&rx);

    driver.advance(Duration::from_millis(15));
    expect_tick(&rx);
    expect_no_tick(&rx);
    drop(notifier);
}

// ─── Stop ──────────────────────────────────────────────────────────

#[test]
fn test_stop_ends_periodic_firing() {
    let (driver, notifier, rx) = tick_notifier();
    notifier.start_periodic(Duration::from_millis(10)).unwrap();

    driver.advance(Duration::from_millis(10));
    expect_tick(&rx);

    notifier.stop();
    driver.advance(Duration::from_secs(5));
    expect_no_tick(&rx);

    // A stopped notifier restarts from the same worker.
    notifier.start_single(Duration::from_millis(10));
    driver.advance(Duration::from_millis(10));
    expect_tick(&rx);
    drop(notifier);
}

#[test]
fn test_stop_is_safe_to_repeat() {
    let (_driver, notifier, _rx) = tick_notifier();
    notifier.stop();
    notifier.stop();
    notifier.stop();
}

// ─── Handler replacement ───────────────────────────────────────────

#[test]
fn test_set_handler_applies_to_next_firing_only() {
    let driver = Arc::new(SimAlarmDriver::new());
    let (tx, rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let gate_rx = std::sync::Mutex::new(gate_rx);

    let notifier = {
        let tx = tx.clone();
        Notifier::with_driver(driver.clone(), driver.clone(), move || {
            tx.send("old").unwrap();
            // Hold the invocation in flight until the test releases it.
            gate_rx.lock().unwrap().recv().unwrap();
        })
        .expect("construct notifier")
    };

    notifier.start_periodic(Duration::from_millis(10)).unwrap();
    driver.advance(Duration::from_millis(10));
    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "old");

    // Replace while the old callback is still executing; the in-flight
    // invocation must keep running as "old".
    {
        let tx = tx.clone();
        notifier.set_handler(move || {
            tx.send("new").unwrap();
        });
    }
    gate_tx.send(()).unwrap();

    driver.advance(Duration::from_millis(10));
    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "new");
    drop(notifier);
}

// ─── Teardown ──────────────────────────────────────────────────────

#[test]
fn test_drop_completes_while_worker_is_blocked_in_wait() {
    // No start was issued: the worker is parked inside the driver's wait
    // with no trigger that could release it. Drop must still return,
    // because teardown stops the alarm before joining.
    let (_driver, notifier, _rx) = tick_notifier();
    drop(notifier);
}

#[test]
fn test_drop_completes_with_active_periodic_schedule() {
    let (driver, notifier, rx) = tick_notifier();
    notifier.start_periodic(Duration::from_millis(10)).unwrap();
    driver.advance(Duration::from_millis(10));
    expect_tick(&rx);

    drop(notifier);

    // After the join no further callback can run; the sender side is gone
    // and nothing was queued.
    driver.advance(Duration::from_secs(5));
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn test_callback_panic_terminates_worker_and_drop_still_completes() {
    let driver = Arc::new(SimAlarmDriver::new());
    let (tx, rx) = mpsc::channel();
    let notifier = Notifier::with_driver(driver.clone(), driver.clone(), move || {
        tx.send(()).unwrap();
        panic!("callback fault");
    })
    .expect("construct notifier");

    notifier.start_periodic(Duration::from_millis(10)).unwrap();
    driver.advance(Duration::from_millis(10));
    expect_tick(&rx);

    // The worker unwound; later periods deliver nothing.
    driver.advance(Duration::from_secs(1));
    expect_no_tick(&rx);

    // Join observes the panic without propagating it.
    drop(notifier);
}

// ─── Diagnostics ───────────────────────────────────────────────────

#[test]
fn test_set_name_and_priority_hint_are_nonfatal() {
    let (_driver, notifier, _rx) = tick_notifier();
    notifier.set_name("drivetrain-loop");
    // The sim driver does not implement the scheduling hint.
    assert!(!notifier.set_hal_thread_priority(true, 40));
}
