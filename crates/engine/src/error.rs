// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types

use porter_adapters::RepositoryError;
use porter_core::{CronParseError, SlotDenied};
use thiserror::Error;

/// Errors surfaced by scheduling operations
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid schedule: {0}")]
    InvalidSchedule(#[from] CronParseError),
    /// The schedule never produces an upcoming fire (e.g. `0 0 30 2 *`)
    #[error("schedule has no upcoming fire time")]
    NoUpcomingFire,
    #[error("run denied: {0}")]
    Denied(#[from] SlotDenied),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("engine is shutting down")]
    ShuttingDown,
}
