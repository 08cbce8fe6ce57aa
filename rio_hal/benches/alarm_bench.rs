//! Alarm arm/fire benchmarks.
//!
//! Measures arm (update) cost and an already-elapsed wait on the sim
//! driver, i.e. the hot path of a periodic rearm cycle without real
//! sleeping.

use criterion::{Criterion, criterion_group, criterion_main};
use rio_common::hal::driver::AlarmDriver;
use rio_hal::drivers::sim::SimAlarmDriver;
use std::hint::black_box;
use std::time::Duration;

fn bench_update(c: &mut Criterion) {
    let driver = SimAlarmDriver::new();
    let handle = driver.initialize().expect("allocate alarm");

    let mut trigger = 1u64;
    c.bench_function("sim_alarm_update", |b| {
        b.iter(|| {
            trigger += 1;
            driver.update(black_box(handle), black_box(trigger)).unwrap();
        });
    });
}

fn bench_elapsed_wait(c: &mut Criterion) {
    let driver = SimAlarmDriver::new();
    let handle = driver.initialize().expect("allocate alarm");
    driver.advance(Duration::from_secs(3600));

    // Trigger is always in the past, so wait returns without parking.
    c.bench_function("sim_alarm_rearm_and_fire", |b| {
        b.iter(|| {
            driver.update(handle, black_box(1)).unwrap();
            black_box(driver.wait(handle).unwrap());
        });
    });
}

criterion_group!(benches, bench_update, bench_elapsed_wait);
criterion_main!(benches);
