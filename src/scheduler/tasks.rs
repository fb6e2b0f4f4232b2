//! Scheduled run definitions.
//!
//! A [`ScheduledRun`] fires a job once per day at a fixed local time of
//! day. Registering a time that has already passed today schedules the
//! first run for tomorrow.

use crate::error::{BotError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone};

/// A job the scheduler can invoke. Implementations handle their own
/// failures; nothing propagates back into the polling loop.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Human-readable job name for logs.
    fn name(&self) -> &str;

    /// Run one cycle.
    async fn run(&self);
}

/// Local time of day, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DailyTime {
    /// Hour of day (0-23).
    pub hour: u8,
    /// Minute of hour (0-59).
    pub min: u8,
}

impl DailyTime {
    pub fn new(hour: u8, min: u8) -> Result<Self> {
        if hour > 23 || min > 59 {
            return Err(BotError::Schedule(format!(
                "time of day out of range: {hour:02}:{min:02}"
            )));
        }
        Ok(Self { hour, min })
    }

    /// Parse `HH:MM` (a single-digit hour is accepted).
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || BotError::Schedule(format!("invalid time of day {s:?}, expected HH:MM"));
        let (hour, min) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || min.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let min: u8 = min.parse().map_err(|_| invalid())?;
        Self::new(hour, min)
    }

    pub fn naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.min), 0)
            .unwrap_or_default()
    }

    /// The first occurrence of this time of day strictly after `now`.
    ///
    /// Days where the time falls into a DST gap are skipped.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        for date in now.date_naive().iter_days().take(3) {
            let local = date.and_time(self.naive_time());
            if let Some(candidate) = tz.from_local_datetime(&local).earliest()
                && candidate > *now
            {
                return candidate;
            }
        }
        now.clone() + TimeDelta::days(1)
    }
}

impl std::str::FromStr for DailyTime {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for DailyTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.min)
    }
}

/// One daily slot and its bookkeeping.
#[derive(Debug, Clone)]
pub struct ScheduledRun<Tz: TimeZone> {
    /// When the run fires each day.
    pub at: DailyTime,
    /// Next instant at which the run becomes due.
    pub next_run: DateTime<Tz>,
    /// When the run last fired, if ever.
    pub last_run: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> ScheduledRun<Tz> {
    /// Register `at`, first due at its next occurrence after `now`.
    pub fn new(at: DailyTime, now: &DateTime<Tz>) -> Self {
        Self {
            at,
            next_run: at.next_after(now),
            last_run: None,
        }
    }

    pub fn is_due(&self, now: &DateTime<Tz>) -> bool {
        *now >= self.next_run
    }

    /// Record a run finishing at `now` and schedule the next one.
    pub fn mark_run(&mut self, now: &DateTime<Tz>) {
        self.last_run = Some(now.clone());
        self.next_run = self.at.next_after(now);
    }
}
