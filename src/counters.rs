//! Monotonic wakeup and wait-cycle counters.
//!
//! # Semantics
//! - `wakeup_count` counts signal-producing control calls, not threads released.
//! - `wait_count` counts worker wait-cycle entries, whether or not the worker actually blocked.
//! - Neither counter is ever reset while the worker lives.
//!
//! # Atomics
//! Counters are `AtomicU64`. Targets without native 64-bit CAS can enable the
//! `portable-atomic` feature to swap in the `portable_atomic` implementation.

#[cfg(not(feature = "portable-atomic"))]
use core::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "portable-atomic")]
use portable_atomic::{AtomicU64, Ordering};

#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub wakeup_count: u64,
    pub wait_count: u64,
}

#[derive(Debug, Default)]
pub struct Counters {
    wakeup_count: AtomicU64,
    wait_count: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one signal-producing control call. Returns the new total.
    #[inline]
    pub fn record_wakeup(&self) -> u64 {
        self.wakeup_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Record one worker wait-cycle entry. Returns the new total.
    #[inline]
    pub fn record_wait_cycle(&self) -> u64 {
        self.wait_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[inline]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            wakeup_count: self.wakeup_count.load(Ordering::Acquire),
            wait_count: self.wait_count.load(Ordering::Acquire),
        }
    }
}
