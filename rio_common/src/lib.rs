//! RIO Common Library
//!
//! This crate provides the shared contracts for all rio workspace crates:
//! the hardware alarm driver trait, timestamp sources, and configuration
//! loading utilities.
//!
//! # Module Structure
//!
//! - [`hal`] - Hardware alarm driver trait, error types, and constants
//! - [`timebase`] - Monotonic timestamp sources
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use rio_common::prelude::*;
//! ```

pub mod config;
pub mod hal;
pub mod prelude;
pub mod timebase;
