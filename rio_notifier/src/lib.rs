//! # RIO Notifier Library
//!
//! Hardware-alarm-driven callback scheduling.
//!
//! A [`Notifier`] owns one alarm resource and one worker thread. The
//! worker blocks in the alarm driver's `wait`, invokes the user callback
//! on each firing, and rearms the alarm: periodic mode advances the
//! deadline by a fixed period, single-shot mode parks until the next
//! explicit start. Dropping the Notifier invalidates the handle, stops the
//! alarm, and joins the worker, so no callback can run after the value is
//! gone.
//!
//! # Example
//!
//! ```rust,no_run
//! use rio_notifier::Notifier;
//! use std::time::Duration;
//!
//! let notifier = Notifier::new(|| println!("tick")).unwrap();
//! notifier.start_periodic(Duration::from_millis(20)).unwrap();
//! std::thread::sleep(Duration::from_secs(1));
//! // Dropping stops the alarm and joins the worker.
//! drop(notifier);
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod notifier;

// Re-export key types for convenience
pub use crate::notifier::{Notifier, NotifierError};
