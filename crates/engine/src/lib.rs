// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Scheduling and execution engine
//!
//! The [`Scheduler`] arms one timer per active task, dispatches due fires
//! under the execution-slot rules, and re-arms after each run completes.
//! The [`TaskRunner`] executes a single run end to end; the
//! [`RetentionSweeper`] prunes old run history on its own fixed schedule.

pub mod error;
pub mod runner;
pub mod scheduler;
pub mod sweeper;

pub use error::ScheduleError;
pub use runner::TaskRunner;
pub use scheduler::{Scheduler, SchedulerStatus};
pub use sweeper::RetentionSweeper;
