// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed repository
//!
//! Every mutation is appended to the WAL before it is applied to the
//! materialized view, under one lock, so the view never runs ahead of
//! what is durable.

use crate::state::{MaterializedState, Operation};
use crate::wal::{Wal, WalError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use porter_adapters::{RepositoryError, TaskRepository};
use porter_core::{Outcome, RunLog, RunLogId, Task, TaskId};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const WAL_FILE: &str = "porter.wal";

struct Inner {
    wal: Wal,
    state: MaterializedState,
}

/// Durable [`TaskRepository`] backed by the write-ahead log
#[derive(Clone)]
pub struct WalRepository {
    inner: Arc<Mutex<Inner>>,
}

impl WalRepository {
    /// Open the repository under `data_dir`, replaying existing state.
    ///
    /// Run logs found still `Running` were interrupted by a crash or
    /// restart; they are finalized as `Cancelled` before the engine sees
    /// them.
    pub fn open(data_dir: &Path, now: DateTime<Utc>) -> Result<Self, WalError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(WAL_FILE);

        let mut state = MaterializedState::default();
        for op in Wal::replay(&path)? {
            state.apply(&op);
        }
        let mut wal = Wal::open(&path)?;

        let interrupted = state.running_logs();
        if !interrupted.is_empty() {
            tracing::warn!(
                count = interrupted.len(),
                "cancelling run logs interrupted by restart"
            );
        }
        for id in interrupted {
            let op = Operation::RunLogComplete {
                id,
                outcome: Outcome::Cancelled {
                    reason: "interrupted by restart".to_string(),
                },
                finished_at: now,
            };
            wal.append(&op)?;
            state.apply(&op);
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { wal, state })),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn commit(inner: &mut Inner, op: Operation) -> Result<(), RepositoryError> {
        inner
            .wal
            .append(&op)
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        inner.state.apply(&op);
        Ok(())
    }

    /// Create or replace a task
    pub fn upsert_task(&self, task: Task) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        Self::commit(&mut inner, Operation::TaskUpsert { task })
    }

    /// Delete a task, keeping its run history
    pub fn delete_task(&self, id: TaskId) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        if !inner.state.tasks.contains_key(&id) {
            return Err(RepositoryError::TaskNotFound(id));
        }
        Self::commit(&mut inner, Operation::TaskDelete { id })
    }
}

#[async_trait]
impl TaskRepository for WalRepository {
    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        Ok(self.lock().state.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, RepositoryError> {
        Ok(self.lock().state.tasks.values().cloned().collect())
    }

    async fn set_last_run(
        &self,
        id: TaskId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        if !inner.state.tasks.contains_key(&id) {
            return Err(RepositoryError::TaskNotFound(id));
        }
        Self::commit(&mut inner, Operation::TaskLastRun { id, at })
    }

    async fn set_next_run(
        &self,
        id: TaskId,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        if !inner.state.tasks.contains_key(&id) {
            return Err(RepositoryError::TaskNotFound(id));
        }
        Self::commit(&mut inner, Operation::TaskNextRun { id, at })
    }

    async fn create_run_log(&self, log: RunLog) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        Self::commit(&mut inner, Operation::RunLogCreate { log })
    }

    async fn complete_run_log(
        &self,
        id: RunLogId,
        outcome: &Outcome,
        finished_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        match inner.state.run_logs.get(&id) {
            None => return Err(RepositoryError::RunLogNotFound(id)),
            // already finalized; completion is exactly-once
            Some(log) if log.status.is_terminal() => return Ok(()),
            Some(_) => {}
        }
        Self::commit(
            &mut inner,
            Operation::RunLogComplete {
                id,
                outcome: outcome.clone(),
                finished_at,
            },
        )
    }

    async fn list_run_logs(
        &self,
        task: Option<TaskId>,
    ) -> Result<Vec<RunLog>, RepositoryError> {
        let inner = self.lock();
        let mut logs: Vec<RunLog> = inner
            .state
            .run_logs
            .values()
            .filter(|log| task.is_none_or(|id| log.task_id == id))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(logs)
    }

    async fn purge_run_logs_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let mut inner = self.lock();
        let before = inner.state.run_logs.len();
        Self::commit(&mut inner, Operation::RunLogsPurge { cutoff })?;
        Ok(before - inner.state.run_logs.len())
    }
}

#[cfg(test)]
#[path = "repo_tests.rs"]
mod tests;
