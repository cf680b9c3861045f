//! Mutex-guarded condition flag with a broadcast notifier.
//!
//! # Overview
//! - One integer flag; nonzero means "condition satisfied".
//! - Any number of writers, one worker waiting (more waiters are harmless).
//! - The worker lifecycle and pending interrupts live under the same lock, so a
//!   stop request or an interrupt wakes a blocked waiter exactly like a write does.
//!
//! # Ordering
//! Every mutation happens under the lock and every notify is issued while the lock
//! is still held. A waiter re-checks its predicate under the lock before sleeping, so
//! a write that has returned can never be missed.
//!
//! # Wake classification
//! `wait_until` checks the predicate first, then pending interrupts:
//! - predicate holds: `Satisfied`
//! - fatal interrupt pending: `Cancelled` (the interrupt stays latched)
//! - benign interrupt pending: `SpuriousInterrupt` (the interrupt is consumed)

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::worker::Lifecycle;

/// Why `wait_until` returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WakeReason {
    Satisfied,
    Cancelled,
    SpuriousInterrupt,
}

/// Out-of-band interruption delivered to the worker by its owner.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// Wakes the worker once; it resumes waiting on the same cycle.
    Benign,
    /// Terminates the worker. Latched until the worker exits.
    Fatal,
}

/// How an interruptible pause ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PauseOutcome {
    Completed,
    CutShort,
}

/// State guarded by the condition lock. Predicates passed to
/// [`SharedCondition::wait_until`] read it through these accessors.
#[derive(Debug)]
pub struct ConditionState {
    flag: i32,
    lifecycle: Lifecycle,
    scheduled: bool,
    pending: Option<Interrupt>,
}

impl ConditionState {
    #[inline]
    pub fn flag(&self) -> i32 {
        self.flag
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.flag != 0
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.lifecycle == Lifecycle::StopRequested
    }

    #[inline]
    fn fatal_pending(&self) -> bool {
        self.pending == Some(Interrupt::Fatal)
    }

    #[inline]
    fn cancel_pending(&self) -> bool {
        self.stop_requested() || self.fatal_pending()
    }
}

#[derive(Debug)]
pub struct SharedCondition {
    state: Mutex<ConditionState>,
    notifier: Condvar,
}

impl SharedCondition {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConditionState {
                flag: 0,
                lifecycle: Lifecycle::NotStarted,
                scheduled: false,
                pending: None,
            }),
            notifier: Condvar::new(),
        }
    }

    /// Overwrite the flag without notifying anyone.
    #[inline]
    pub fn set(&self, value: i32) {
        self.state.lock().flag = value;
    }

    #[inline]
    pub fn get(&self) -> i32 {
        self.state.lock().flag
    }

    /// Store `value` and, if it is nonzero, wake every waiter.
    /// Returns true if waiters were signalled.
    pub fn signal_if(&self, value: i32) -> bool {
        let mut state = self.state.lock();
        state.flag = value;
        if value != 0 {
            self.notifier.notify_all();
            true
        } else {
            false
        }
    }

    /// Block until `predicate` holds or an interrupt is pending.
    ///
    /// There is no timeout. Callers that need to observe shutdown must include
    /// [`ConditionState::stop_requested`] in their predicate.
    pub fn wait_until(&self, mut predicate: impl FnMut(&ConditionState) -> bool) -> WakeReason {
        let mut state = self.state.lock();
        loop {
            if predicate(&state) {
                return WakeReason::Satisfied;
            }
            match state.pending {
                Some(Interrupt::Fatal) => return WakeReason::Cancelled,
                Some(Interrupt::Benign) => {
                    state.pending = None;
                    return WakeReason::SpuriousInterrupt;
                }
                None => {}
            }
            self.notifier.wait(&mut state);
        }
    }

    /// Sleep for `duration` unless a stop request or fatal interrupt arrives first.
    pub fn pause(&self, duration: Duration) -> PauseOutcome {
        let deadline = Instant::now() + duration;
        let mut state = self.state.lock();
        while !state.cancel_pending() {
            if self.notifier.wait_until(&mut state, deadline).timed_out() {
                return PauseOutcome::Completed;
            }
        }
        PauseOutcome::CutShort
    }

    /// Deliver an interrupt. A pending fatal interrupt is never downgraded.
    pub fn interrupt(&self, kind: Interrupt) {
        let mut state = self.state.lock();
        if !state.fatal_pending() {
            state.pending = Some(kind);
        }
        self.notifier.notify_all();
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lock().lifecycle
    }

    /// Move a running worker to `StopRequested` and wake it.
    /// Returns false if the worker was not running.
    pub fn request_stop(&self) -> bool {
        let mut state = self.state.lock();
        if state.lifecycle != Lifecycle::Running {
            return false;
        }
        state.lifecycle = Lifecycle::StopRequested;
        self.notifier.notify_all();
        true
    }

    /// Lifecycle plus whether the worker has opened its first wait cycle.
    #[inline]
    pub(crate) fn thread_view(&self) -> (Lifecycle, bool) {
        let state = self.state.lock();
        (state.lifecycle, state.scheduled)
    }

    pub(crate) fn mark_running(&self) {
        let mut state = self.state.lock();
        state.lifecycle = Lifecycle::Running;
        state.scheduled = false;
    }

    /// Called by the worker once its first cycle has cleared the flag.
    pub(crate) fn mark_scheduled(&self) {
        let mut state = self.state.lock();
        state.scheduled = true;
        self.notifier.notify_all();
    }

    /// Called by the worker as its last action, and by the owner if spawning failed.
    pub(crate) fn mark_stopped(&self) {
        let mut state = self.state.lock();
        state.lifecycle = Lifecycle::Stopped;
        state.scheduled = false;
        self.notifier.notify_all();
    }

    /// Block until the worker has opened its first cycle or has already stopped.
    pub(crate) fn await_scheduled(&self) {
        let mut state = self.state.lock();
        while !state.scheduled && state.lifecycle != Lifecycle::Stopped {
            self.notifier.wait(&mut state);
        }
    }
}

impl Default for SharedCondition {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Interrupt, PauseOutcome, SharedCondition, WakeReason};
    use crate::worker::Lifecycle;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn spawn_waiter(cond: &Arc<SharedCondition>) -> thread::JoinHandle<WakeReason> {
        let cond = Arc::clone(cond);
        thread::spawn(move || cond.wait_until(|s| s.is_set() || s.stop_requested()))
    }

    #[test]
    fn set_does_not_require_waiters() {
        let cond = SharedCondition::new();
        assert_eq!(cond.get(), 0);
        cond.set(7);
        assert_eq!(cond.get(), 7);
        cond.set(0);
        assert_eq!(cond.get(), 0);
    }

    #[test]
    fn signal_if_zero_stores_without_signalling() {
        let cond = SharedCondition::new();
        cond.set(3);
        assert!(!cond.signal_if(0));
        assert_eq!(cond.get(), 0);
        assert!(cond.signal_if(5));
        assert_eq!(cond.get(), 5);
    }

    #[test]
    fn already_satisfied_returns_immediately() {
        let cond = SharedCondition::new();
        cond.set(1);
        assert_eq!(cond.wait_until(|s| s.is_set()), WakeReason::Satisfied);
    }

    #[test]
    fn predicate_sees_flag_value_and_lifecycle() {
        let cond = Arc::new(SharedCondition::new());
        cond.mark_running();

        let c = Arc::clone(&cond);
        let waiter = thread::spawn(move || {
            c.wait_until(|s| s.flag() == 3 || s.lifecycle() == Lifecycle::StopRequested)
        });

        cond.signal_if(2);
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());

        cond.signal_if(3);
        assert_eq!(waiter.join().unwrap(), WakeReason::Satisfied);

        let c = Arc::clone(&cond);
        cond.set(0);
        let waiter = thread::spawn(move || {
            c.wait_until(|s| s.flag() == 3 || s.lifecycle() == Lifecycle::StopRequested)
        });
        cond.request_stop();
        assert_eq!(waiter.join().unwrap(), WakeReason::Satisfied);
    }

    #[test]
    fn signal_wakes_blocked_waiter() {
        let cond = Arc::new(SharedCondition::new());
        let waiter = spawn_waiter(&cond);

        thread::sleep(Duration::from_millis(20));
        assert!(cond.signal_if(1));

        assert_eq!(waiter.join().unwrap(), WakeReason::Satisfied);
    }

    #[test]
    fn many_signals_never_lose_the_waiter() {
        let cond = Arc::new(SharedCondition::new());
        for _ in 0..200 {
            cond.set(0);
            let waiter = spawn_waiter(&cond);
            cond.signal_if(1);
            assert_eq!(waiter.join().unwrap(), WakeReason::Satisfied);
        }
    }

    #[test]
    fn benign_interrupt_is_spurious_and_consumed() {
        let cond = Arc::new(SharedCondition::new());
        let waiter = spawn_waiter(&cond);

        thread::sleep(Duration::from_millis(20));
        cond.interrupt(Interrupt::Benign);
        assert_eq!(waiter.join().unwrap(), WakeReason::SpuriousInterrupt);

        // Consumed: the next wait blocks until a real signal.
        let waiter = spawn_waiter(&cond);
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());
        cond.signal_if(1);
        assert_eq!(waiter.join().unwrap(), WakeReason::Satisfied);
    }

    #[test]
    fn fatal_interrupt_is_latched() {
        let cond = SharedCondition::new();
        cond.interrupt(Interrupt::Fatal);
        cond.interrupt(Interrupt::Benign);

        assert_eq!(cond.wait_until(|s| s.is_set()), WakeReason::Cancelled);
        assert_eq!(cond.wait_until(|s| s.is_set()), WakeReason::Cancelled);
    }

    #[test]
    fn satisfied_wins_over_pending_interrupt() {
        let cond = SharedCondition::new();
        cond.interrupt(Interrupt::Fatal);
        cond.set(1);
        assert_eq!(cond.wait_until(|s| s.is_set()), WakeReason::Satisfied);
    }

    #[test]
    fn stop_request_wakes_predicate_waiter() {
        let cond = Arc::new(SharedCondition::new());
        cond.mark_running();
        let waiter = spawn_waiter(&cond);

        thread::sleep(Duration::from_millis(20));
        assert!(cond.request_stop());
        assert!(!cond.request_stop());

        assert_eq!(waiter.join().unwrap(), WakeReason::Satisfied);
        assert_eq!(cond.lifecycle(), Lifecycle::StopRequested);
    }

    #[test]
    fn request_stop_ignored_unless_running() {
        let cond = SharedCondition::new();
        assert!(!cond.request_stop());
        assert_eq!(cond.lifecycle(), Lifecycle::NotStarted);
    }

    #[test]
    fn pause_completes_without_cancellation() {
        let cond = SharedCondition::new();
        let start = Instant::now();
        assert_eq!(cond.pause(Duration::from_millis(30)), PauseOutcome::Completed);
        assert!(start.elapsed() >= Duration::from_millis(29));
    }

    #[test]
    fn pause_is_cut_short_by_stop() {
        let cond = Arc::new(SharedCondition::new());
        cond.mark_running();

        let c = Arc::clone(&cond);
        let sleeper = thread::spawn(move || c.pause(Duration::from_secs(30)));

        thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        cond.request_stop();

        assert_eq!(sleeper.join().unwrap(), PauseOutcome::CutShort);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn pause_ignores_benign_interrupt() {
        let cond = SharedCondition::new();
        cond.interrupt(Interrupt::Benign);
        assert_eq!(cond.pause(Duration::from_millis(10)), PauseOutcome::Completed);
        // Still pending for the next wait.
        assert_eq!(cond.wait_until(|s| s.is_set()), WakeReason::SpuriousInterrupt);
    }

    #[test]
    fn await_scheduled_returns_once_marked() {
        let cond = Arc::new(SharedCondition::new());
        cond.mark_running();

        let c = Arc::clone(&cond);
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            c.mark_scheduled();
        });

        cond.await_scheduled();
        assert_eq!(cond.thread_view(), (Lifecycle::Running, true));
        worker.join().unwrap();
    }
}
