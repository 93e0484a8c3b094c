// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task and run-log persistence

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use porter_core::{Outcome, RunLog, RunLogId, Task, TaskId};
use thiserror::Error;

/// Errors from repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("run log not found: {0}")]
    RunLogNotFound(RunLogId),
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Adapter for durable task and run-log state.
///
/// The engine reads tasks through this trait at fire time (never from a
/// captured copy) and writes back run bookkeeping. Implementations decide
/// durability; the engine only assumes writes are visible to subsequent
/// reads.
#[async_trait]
pub trait TaskRepository: Clone + Send + Sync + 'static {
    /// Fetch one task. `Ok(None)` means it was deleted.
    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, RepositoryError>;

    /// All tasks, active or not
    async fn list_tasks(&self) -> Result<Vec<Task>, RepositoryError>;

    /// Record the instant a scheduled fire dispatched the task
    async fn set_last_run(&self, id: TaskId, at: DateTime<Utc>)
        -> Result<(), RepositoryError>;

    /// Record (or clear) the projected next fire time
    async fn set_next_run(
        &self,
        id: TaskId,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError>;

    /// Persist a new run log row in `Running` state
    async fn create_run_log(&self, log: RunLog) -> Result<(), RepositoryError>;

    /// Finalize a run log exactly once with its terminal outcome
    async fn complete_run_log(
        &self,
        id: RunLogId,
        outcome: &Outcome,
        finished_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Run logs, newest first. `task` narrows to one task's history.
    async fn list_run_logs(&self, task: Option<TaskId>)
        -> Result<Vec<RunLog>, RepositoryError>;

    /// Delete terminal run logs started before `cutoff`; returns how many
    async fn purge_run_logs_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, RepositoryError>;
}
