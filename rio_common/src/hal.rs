//! Hardware alarm abstraction.
//!
//! This module contains the alarm driver trait, error types, and
//! constants shared by all alarm backends.

pub mod consts;
pub mod driver;
