//! Condition-wait primitive with a cancellable worker thread.
//!
//! # Highlights
//! - One mutex-guarded integer flag plus a broadcast notifier; no missed wakeups.
//! - A worker that clears the flag, waits, classifies the wake, and does a bounded
//!   pause before waiting again.
//! - Cancellation is cooperative and always wakes a blocked worker.
//! - A small text control surface (`condition`, `thread_status`, `stats`, `trigger_wakeup`).
//!
//! # Quick start
//! ```
//! use wait_event::{Config, WaitEventDevice};
//!
//! let device = WaitEventDevice::start(Config::default()).unwrap();
//! let control = device.control();
//!
//! control.write_condition("1").unwrap();
//! assert_eq!(control.read_stats().wakeup_count, 1);
//!
//! device.stop();
//! assert_eq!(control.read_thread_status().as_str(), "stopped");
//! ```
//!
//! # Wake classification
//! - `Satisfied`: the flag became nonzero (or a stop was requested).
//! - `Cancelled`: a fatal interrupt is pending; the worker exits.
//! - `SpuriousInterrupt`: a benign interrupt; the worker resumes waiting on the same cycle.
//!
//! # Counters
//! - `wakeup_count` grows by one per signal-producing control call.
//! - `wait_count` grows by one per wait cycle entered, even when a stale flag would
//!   have satisfied the wait immediately.
//!
//! # Ownership
//! There is no global state. [`WaitEventDevice`] owns the shared condition, the
//! counters, and the worker thread; [`ControlSurface`] handles are cheap clones.

pub mod condition;
pub mod config;
pub mod control;
pub mod counters;
pub mod device;
pub mod error;
pub mod logging;
pub mod worker;

pub use condition::{Interrupt, PauseOutcome, SharedCondition, WakeReason};
pub use config::Config;
pub use control::{Attribute, ControlSurface, ThreadStatus};
pub use counters::{CounterSnapshot, Counters};
pub use device::WaitEventDevice;
pub use error::{ConfigError, ControlError, StartError};
pub use worker::{Lifecycle, WorkerExit, WorkerLoop};
