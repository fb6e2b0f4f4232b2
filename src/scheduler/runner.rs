//! Scheduler polling loop.
//!
//! Polls on a fixed interval and runs every due entry inline, one after
//! another. A running job blocks the loop, so job invocations never
//! overlap.

use crate::scheduler::clock::Clock;
use crate::scheduler::tasks::{DailyTime, ScheduledJob, ScheduledRun};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Default interval between scheduler polls (seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Daily scheduler driving a single job.
pub struct Scheduler {
    runs: Vec<ScheduledRun<Local>>,
    job: Arc<dyn ScheduledJob>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
}

impl Scheduler {
    pub fn new(job: Arc<dyn ScheduledJob>, clock: Arc<dyn Clock>) -> Self {
        Self {
            runs: Vec::new(),
            job,
            clock,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    /// Override the polling cadence.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Run the job every day at `at` (local time).
    pub fn every_day_at(&mut self, at: DailyTime) {
        let run = ScheduledRun::new(at, &self.clock.now());
        debug!("scheduled {} daily at {at}, first run {}", self.job.name(), run.next_run);
        self.runs.push(run);
    }

    pub fn runs(&self) -> &[ScheduledRun<Local>] {
        &self.runs
    }

    /// Next run instant of every entry, in registration order.
    pub fn next_runs(&self) -> Vec<DateTime<Local>> {
        self.runs.iter().map(|r| r.next_run).collect()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Execute one poll: run every due entry. Returns how many ran.
    pub async fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let due: Vec<usize> = self
            .runs
            .iter()
            .enumerate()
            .filter(|(_, run)| run.is_due(&now))
            .map(|(i, _)| i)
            .collect();

        for &index in &due {
            info!(
                "running {} (scheduled {})",
                self.job.name(),
                self.runs[index].at
            );
            self.job.run().await;
            let finished = self.clock.now();
            self.runs[index].mark_run(&finished);
            debug!("next {} run at {}", self.job.name(), self.runs[index].next_run);
        }

        due.len()
    }

    /// Poll forever.
    pub async fn run(mut self) {
        info!(
            "scheduler started with {} daily runs, polling every {:?}",
            self.runs.len(),
            self.poll_interval
        );
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// Start the polling loop on a background task.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
