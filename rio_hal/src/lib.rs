//! # RIO HAL Library
//!
//! Alarm driver backends with a pluggable driver architecture.
//!
//! This crate provides implementations of the `AlarmDriver` trait defined
//! in `rio_common::hal::driver`, plus the registry used to select one by
//! name at startup.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Alarm driver implementations (host, sim)
//! - [`rt`] - Real-time scheduling helpers
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    rio_hal (single crate)              │
//! │  ┌─────────────────┐        ┌───────────────────────┐  │
//! │  │ DriverRegistry  │───────►│  AlarmDriver (trait)  │  │
//! │  └─────────────────┘        └──────────┬────────────┘  │
//! │                                        │               │
//! │                      ┌─────────────────┴───────────┐   │
//! │                      ▼                             ▼   │
//! │            ┌──────────────────┐        ┌──────────────┐│
//! │            │ HostAlarmDriver  │        │ SimAlarmDriver││
//! │            │ (condvar timing) │        │ (manual clock)││
//! │            └──────────────────┘        └──────────────┘│
//! └────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;
pub mod rt;

// Re-export key types for convenience
pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::builtin_registry;
pub use crate::drivers::host::HostAlarmDriver;
pub use crate::drivers::sim::SimAlarmDriver;
