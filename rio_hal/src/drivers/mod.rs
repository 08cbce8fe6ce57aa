//! Alarm driver implementations.
//!
//! This module contains all alarm driver implementations:
//!
//! - [`host`] - Condvar-based timing against the process monotonic clock
//! - [`sim`] - Manually advanced clock for deterministic tests
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `AlarmDriver` trait from `rio_common::hal::driver`
//! 3. Register the driver's `create_driver` in [`builtin_registry`]

pub mod host;
pub mod sim;

use crate::driver_registry::DriverRegistry;

/// Build a registry holding all built-in drivers.
pub fn builtin_registry() -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    registry.register("host", host::create_driver);
    registry.register("sim", sim::create_driver);
    registry
}
