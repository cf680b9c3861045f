//! Owner of the shared state and the worker thread.
//!
//! `start` builds the condition and counters, spawns the worker, and returns once
//! the worker has cleared the flag for its first cycle. `stop` requests a stop, wakes the worker, and joins it.
//! Dropping the device stops it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{error, info};

use crate::condition::{Interrupt, SharedCondition};
use crate::config::Config;
use crate::control::ControlSurface;
use crate::counters::Counters;
use crate::error::StartError;
use crate::worker::{WorkerExit, WorkerLoop};

pub struct WaitEventDevice {
    condition: Arc<SharedCondition>,
    control: ControlSurface,
    worker: Mutex<Option<JoinHandle<WorkerExit>>>,
}

impl WaitEventDevice {
    pub fn start(config: Config) -> Result<Self, StartError> {
        info!(
            thread = %config.thread_name,
            pause_ms = config.pause_ms,
            "starting wait event device"
        );

        let condition = Arc::new(SharedCondition::new());
        let counters = Arc::new(Counters::new());
        let control = ControlSurface::new(Arc::clone(&condition), Arc::clone(&counters));

        condition.mark_running();
        let worker = WorkerLoop::new(Arc::clone(&condition), counters, config.pause());
        let handle = thread::Builder::new()
            .name(config.thread_name)
            .spawn(move || worker.run())
            .map_err(|err| {
                error!(%err, "failed to spawn worker thread");
                condition.mark_stopped();
                StartError::Spawn(err)
            })?;

        condition.await_scheduled();
        info!("wait event device started");

        Ok(Self {
            condition,
            control,
            worker: Mutex::new(Some(handle)),
        })
    }

    #[inline]
    pub fn control(&self) -> &ControlSurface {
        &self.control
    }

    /// Deliver an interrupt to the worker. A fatal interrupt makes it exit on its own.
    pub fn interrupt(&self, kind: Interrupt) {
        info!(?kind, "interrupting worker");
        self.condition.interrupt(kind);
    }

    /// Stop and join the worker. Returns `None` if it was already joined or panicked.
    pub fn stop(&self) -> Option<WorkerExit> {
        let handle = self.worker.lock().take()?;

        if self.condition.request_stop() {
            info!("stop requested");
        }
        match handle.join() {
            Ok(exit) => {
                info!(?exit, "wait event device stopped");
                Some(exit)
            }
            Err(_) => {
                error!("worker thread panicked");
                self.condition.mark_stopped();
                None
            }
        }
    }
}

impl Drop for WaitEventDevice {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
