//! External control surface: condition get/set, forced wakeups, status and stats.
//!
//! # Attributes
//! | name             | mode | show                             | store                  |
//! |------------------|------|----------------------------------|------------------------|
//! | `condition`      | 0644 | `"<flag>\n"`                     | integer, nonzero wakes |
//! | `thread_status`  | 0444 | `running`/`starting`/`stopped`   | -                      |
//! | `stats`          | 0444 | `"Wakeups: <n>\nWaits: <n>\n"`   | -                      |
//! | `trigger_wakeup` | 0200 | -                                | integer, nonzero wakes |
//!
//! Integer input is base-10 with an optional sign and at most one trailing newline.
//! Rejected input never mutates the flag or the counters.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use tracing::{error, info};

use crate::condition::SharedCondition;
use crate::counters::{CounterSnapshot, Counters};
use crate::error::ControlError;
use crate::worker::Lifecycle;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThreadStatus {
    Stopped,
    /// Spawned but not yet waiting on its first cycle.
    Starting,
    Running,
}

impl ThreadStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ThreadStatus::Stopped => "stopped",
            ThreadStatus::Starting => "starting",
            ThreadStatus::Running => "running",
        }
    }

    fn from_view(lifecycle: Lifecycle, scheduled: bool) -> Self {
        match lifecycle {
            Lifecycle::Running if scheduled => ThreadStatus::Running,
            Lifecycle::Running => ThreadStatus::Starting,
            // A requested stop already reports stopped.
            Lifecycle::NotStarted | Lifecycle::StopRequested | Lifecycle::Stopped => {
                ThreadStatus::Stopped
            }
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Condition,
    ThreadStatus,
    Stats,
    TriggerWakeup,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Condition,
        Attribute::ThreadStatus,
        Attribute::Stats,
        Attribute::TriggerWakeup,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Attribute::Condition => "condition",
            Attribute::ThreadStatus => "thread_status",
            Attribute::Stats => "stats",
            Attribute::TriggerWakeup => "trigger_wakeup",
        }
    }

    /// Unix permission bits of the attribute.
    pub const fn mode(self) -> u16 {
        match self {
            Attribute::Condition => 0o644,
            Attribute::ThreadStatus | Attribute::Stats => 0o444,
            Attribute::TriggerWakeup => 0o200,
        }
    }

    #[inline]
    pub const fn is_readable(self) -> bool {
        self.mode() & 0o444 != 0
    }

    #[inline]
    pub const fn is_writable(self) -> bool {
        self.mode() & 0o222 != 0
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = ControlError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|attr| attr.name() == name)
            .ok_or_else(|| ControlError::UnknownAttribute {
                name: name.to_owned(),
            })
    }
}

/// Thin adapter over the shared condition and counters. Cheap to clone; every
/// clone drives the same worker.
#[derive(Clone, Debug)]
pub struct ControlSurface {
    condition: Arc<SharedCondition>,
    counters: Arc<Counters>,
}

impl ControlSurface {
    pub fn new(condition: Arc<SharedCondition>, counters: Arc<Counters>) -> Self {
        Self {
            condition,
            counters,
        }
    }

    #[inline]
    pub fn read_condition(&self) -> i32 {
        self.condition.get()
    }

    /// Store the parsed value. A nonzero value also counts a wakeup and wakes the worker.
    pub fn write_condition(&self, input: &str) -> Result<(), ControlError> {
        let value = parse_int(input)?;
        if self.condition.signal_if(value) {
            let total = self.counters.record_wakeup();
            info!(value, total, "woke up waiting thread(s)");
        }
        Ok(())
    }

    /// Any nonzero value forces the flag to 1, counts a wakeup, and wakes the worker.
    /// Zero is validated and otherwise ignored.
    pub fn trigger_wakeup(&self, input: &str) -> Result<(), ControlError> {
        let value = parse_int(input)?;
        if value != 0 {
            self.condition.signal_if(1);
            let total = self.counters.record_wakeup();
            info!(total, "manual wakeup triggered");
        }
        Ok(())
    }

    pub fn read_thread_status(&self) -> ThreadStatus {
        let (lifecycle, scheduled) = self.condition.thread_view();
        ThreadStatus::from_view(lifecycle, scheduled)
    }

    #[inline]
    pub fn read_stats(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Render an attribute as text.
    pub fn show(&self, attribute: Attribute) -> Result<String, ControlError> {
        let text = match attribute {
            Attribute::Condition => format!("{}\n", self.read_condition()),
            Attribute::ThreadStatus => format!("{}\n", self.read_thread_status()),
            Attribute::Stats => {
                let stats = self.read_stats();
                format!(
                    "Wakeups: {}\nWaits: {}\n",
                    stats.wakeup_count, stats.wait_count
                )
            }
            Attribute::TriggerWakeup => return Err(ControlError::NotReadable { attribute }),
        };
        Ok(text)
    }

    /// Write text to an attribute. Returns the number of bytes consumed.
    pub fn store(&self, attribute: Attribute, input: &str) -> Result<usize, ControlError> {
        match attribute {
            Attribute::Condition => self.write_condition(input)?,
            Attribute::TriggerWakeup => self.trigger_wakeup(input)?,
            Attribute::ThreadStatus | Attribute::Stats => {
                return Err(ControlError::NotWritable { attribute });
            }
        }
        Ok(input.len())
    }
}

fn parse_int(input: &str) -> Result<i32, ControlError> {
    let digits = input.strip_suffix('\n').unwrap_or(input);
    digits.parse::<i32>().map_err(|_| {
        error!(input, "invalid input");
        ControlError::InvalidInput {
            input: input.to_owned(),
        }
    })
}
