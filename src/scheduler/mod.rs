//! Daily job scheduler.
//!
//! Holds a list of local times of day and, on a fixed polling cadence,
//! runs the job for every entry that has come due.

pub mod clock;
pub mod runner;
pub mod tasks;

pub use clock::{Clock, ManualClock, SystemClock};
pub use runner::Scheduler;
pub use tasks::{DailyTime, ScheduledJob, ScheduledRun};
