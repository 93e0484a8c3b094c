// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! porter-core: domain types and pure machinery for the Porter replication engine
//!
//! This crate provides:
//! - A clock abstraction for testable wall-clock time
//! - The cron evaluator used for both schedule validation and next-fire computation
//! - The execution slot controller (global ceiling + per-task mutual exclusion)
//! - The armed-timer registry that drives scheduled fires
//! - Task and run-log domain types, plus engine configuration

pub mod clock;
pub mod config;
pub mod cron;
pub mod runlog;
pub mod slots;
pub mod task;
pub mod timer;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use cron::{CronExpr, CronParseError};
pub use runlog::{Outcome, RunLog, RunLogId, RunStatus};
pub use slots::{ExecutionSlots, SlotDenied, SlotGuard};
pub use task::{ConfigBlob, Task, TaskId, TaskKind};
pub use timer::{Fire, TimerHeap};
