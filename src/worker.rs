//! The worker's wait/act loop.
//!
//! # State machine
//! `Idle -> Waiting -> Evaluating -> (Waiting | Acting | Exiting)`, terminal `Exited`.
//! - `Idle` clears any stale flag, counts a new wait cycle, and moves to `Waiting`.
//! - `Waiting` blocks until the flag is set, a stop is requested, or an interrupt arrives.
//! - `Evaluating` classifies the wake: cancellation exits, a spurious interrupt resumes
//!   waiting on the same cycle, a satisfied wait acts unless a stop is pending.
//! - `Acting` sleeps for the configured pause; cancellation cuts the pause short.
//!
//! Nothing here is fatal to the process. Every path ends in `Exited`, and the
//! returned [`WorkerExit`] says whether the last pause was interrupted.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::condition::{PauseOutcome, SharedCondition, WakeReason};
use crate::counters::Counters;

/// Worker lifecycle. The owner moves it to `Running` and `StopRequested`; the
/// worker moves it to `Stopped` when it exits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    NotStarted,
    Running,
    StopRequested,
    Stopped,
}

/// Completion code of a worker thread.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerExit {
    /// Exited from a wait.
    Clean,
    /// Exited because cancellation cut the last pause short.
    MidPause,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Waiting,
    Evaluating(WakeReason),
    Acting,
    Exiting,
}

pub struct WorkerLoop {
    condition: Arc<SharedCondition>,
    counters: Arc<Counters>,
    pause: Duration,
    cycle: u64,
}

impl WorkerLoop {
    pub fn new(condition: Arc<SharedCondition>, counters: Arc<Counters>, pause: Duration) -> Self {
        Self {
            condition,
            counters,
            pause,
            cycle: 0,
        }
    }

    /// Run until cancelled. Reports itself scheduled once the first cycle has
    /// cleared the flag, and marks the lifecycle `Stopped` before returning.
    pub fn run(mut self) -> WorkerExit {
        let current = std::thread::current();
        info!(thread = current.name().unwrap_or("<unnamed>"), "worker started");

        let exit = self.drive();

        self.condition.mark_stopped();
        info!(?exit, cycles = self.cycle, "worker exiting");
        exit
    }

    fn drive(&mut self) -> WorkerExit {
        let mut phase = Phase::Idle;
        let mut cut_short = false;

        loop {
            phase = match phase {
                Phase::Idle => {
                    if self.condition.lifecycle() == Lifecycle::StopRequested {
                        info!("stop requested");
                        Phase::Exiting
                    } else {
                        self.cycle += 1;
                        self.condition.set(0);
                        // Counted per cycle, not per actual block.
                        self.counters.record_wait_cycle();
                        if self.cycle == 1 {
                            // Writes from here on survive until the next Idle.
                            self.condition.mark_scheduled();
                        }
                        info!(cycle = self.cycle, "waiting for condition");
                        Phase::Waiting
                    }
                }
                Phase::Waiting => {
                    let reason = self
                        .condition
                        .wait_until(|s| s.is_set() || s.stop_requested());
                    Phase::Evaluating(reason)
                }
                Phase::Evaluating(WakeReason::Cancelled) => {
                    info!(cycle = self.cycle, "fatal interrupt received, exiting");
                    Phase::Exiting
                }
                Phase::Evaluating(WakeReason::SpuriousInterrupt) => {
                    info!(cycle = self.cycle, "interrupted by benign interrupt, continuing");
                    Phase::Waiting
                }
                Phase::Evaluating(WakeReason::Satisfied) => {
                    if self.condition.lifecycle() == Lifecycle::StopRequested {
                        info!(cycle = self.cycle, "stop requested");
                        Phase::Exiting
                    } else {
                        info!(
                            cycle = self.cycle,
                            condition = self.condition.get(),
                            "woken up"
                        );
                        Phase::Acting
                    }
                }
                Phase::Acting => {
                    let outcome = self.condition.pause(self.pause);
                    debug!(cycle = self.cycle, ?outcome, "pause finished");
                    cut_short = outcome == PauseOutcome::CutShort;
                    Phase::Idle
                }
                Phase::Exiting => {
                    return if cut_short {
                        WorkerExit::MidPause
                    } else {
                        WorkerExit::Clean
                    };
                }
            };
        }
    }
}
