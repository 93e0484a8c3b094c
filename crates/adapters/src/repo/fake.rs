// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory repository for testing

use super::{RepositoryError, TaskRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use porter_core::{Outcome, RunLog, RunLogId, Task, TaskId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Store {
    tasks: HashMap<TaskId, Task>,
    run_logs: Vec<RunLog>,
}

/// In-memory [`TaskRepository`] for tests
#[derive(Clone, Default)]
pub struct FakeRepository {
    store: Arc<Mutex<Store>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a task
    pub fn put_task(&self, task: Task) {
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.tasks.insert(task.id, task);
    }

    /// Remove a task, keeping its run logs
    pub fn remove_task(&self, id: TaskId) {
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.tasks.remove(&id);
    }

    /// Snapshot of all run logs in insertion order
    pub fn run_logs(&self) -> Vec<RunLog> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.run_logs.clone()
    }
}

#[async_trait]
impl TaskRepository for FakeRepository {
    async fn get_task(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        Ok(store.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, RepositoryError> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        Ok(store.tasks.values().cloned().collect())
    }

    async fn set_last_run(
        &self,
        id: TaskId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        let task = store
            .tasks
            .get_mut(&id)
            .ok_or(RepositoryError::TaskNotFound(id))?;
        task.last_run = Some(at);
        task.updated_at = at;
        Ok(())
    }

    async fn set_next_run(
        &self,
        id: TaskId,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        let task = store
            .tasks
            .get_mut(&id)
            .ok_or(RepositoryError::TaskNotFound(id))?;
        task.next_run = at;
        Ok(())
    }

    async fn create_run_log(&self, log: RunLog) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.run_logs.push(log);
        Ok(())
    }

    async fn complete_run_log(
        &self,
        id: RunLogId,
        outcome: &Outcome,
        finished_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        let log = store
            .run_logs
            .iter_mut()
            .find(|log| log.id == id)
            .ok_or(RepositoryError::RunLogNotFound(id))?;
        log.finish(outcome, finished_at);
        Ok(())
    }

    async fn list_run_logs(
        &self,
        task: Option<TaskId>,
    ) -> Result<Vec<RunLog>, RepositoryError> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        let mut logs: Vec<RunLog> = store
            .run_logs
            .iter()
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
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        let before = store.run_logs.len();
        store
            .run_logs
            .retain(|log| !log.status.is_terminal() || log.started_at >= cutoff);
        Ok(before - store.run_logs.len())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
