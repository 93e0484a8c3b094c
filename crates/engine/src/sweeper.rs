// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention sweeper
//!
//! Purges terminal run logs older than the configured retention window on a
//! fixed internal schedule, independent of the execution slots. Errors are
//! logged and swallowed; the next fire tries again.

use chrono::{DateTime, Utc};
use porter_adapters::TaskRepository;
use porter_core::{Clock, CronExpr, CronParseError, EngineConfig};
use std::sync::Mutex;

/// Daily, off-peak. Not user-editable.
const SWEEP_SCHEDULE: &str = "0 2 * * *";

pub struct RetentionSweeper<R, C> {
    repo: R,
    clock: C,
    retention_days: i64,
    utc_offset_minutes: i32,
    schedule: CronExpr,
    next: Mutex<Option<DateTime<Utc>>>,
}

impl<R, C> RetentionSweeper<R, C>
where
    R: TaskRepository,
    C: Clock,
{
    pub fn new(repo: R, clock: C, config: &EngineConfig) -> Result<Self, CronParseError> {
        Ok(Self {
            repo,
            clock,
            retention_days: i64::from(config.retention_days),
            utc_offset_minutes: config.utc_offset_minutes,
            schedule: CronExpr::parse(SWEEP_SCHEDULE)?,
            next: Mutex::new(None),
        })
    }

    /// Sweep if the internal schedule has come due. The first tick only
    /// arms; sweeping starts at the next scheduled fire.
    pub async fn tick(&self) {
        let now = self.clock.now();
        let due = {
            let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
            match *next {
                Some(at) if now >= at => {
                    *next = self.schedule.next_after_in_offset(now, self.utc_offset_minutes);
                    true
                }
                Some(_) => false,
                None => {
                    *next = self.schedule.next_after_in_offset(now, self.utc_offset_minutes);
                    false
                }
            }
        };
        if due {
            self.run_once(now).await;
        }
    }

    /// One sweep at `now`, regardless of the schedule. Idempotent.
    pub async fn run_once(&self, now: DateTime<Utc>) {
        let cutoff = now - chrono::Duration::days(self.retention_days);
        match self.repo.purge_run_logs_before(cutoff).await {
            Ok(0) => tracing::debug!(%cutoff, "retention sweep found nothing to purge"),
            Ok(purged) => tracing::info!(purged, %cutoff, "retention sweep"),
            Err(e) => tracing::error!(error = %e, "retention sweep failed"),
        }
    }
}

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;
