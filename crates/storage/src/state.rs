// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use chrono::{DateTime, Utc};
use porter_core::{Outcome, RunLog, RunLogId, Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One durable state transition.
///
/// Operations are the WAL's wire format; `apply` is the only interpreter,
/// so replay and live mutation cannot diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Operation {
    TaskUpsert {
        task: Task,
    },
    TaskDelete {
        id: TaskId,
    },
    TaskLastRun {
        id: TaskId,
        at: DateTime<Utc>,
    },
    TaskNextRun {
        id: TaskId,
        at: Option<DateTime<Utc>>,
    },
    RunLogCreate {
        log: RunLog,
    },
    RunLogComplete {
        id: RunLogId,
        outcome: Outcome,
        finished_at: DateTime<Utc>,
    },
    RunLogsPurge {
        cutoff: DateTime<Utc>,
    },
}

/// Materialized state built from WAL operations
#[derive(Debug, Default)]
pub struct MaterializedState {
    pub tasks: HashMap<TaskId, Task>,
    pub run_logs: HashMap<RunLogId, RunLog>,
}

impl MaterializedState {
    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::TaskUpsert { task } => {
                self.tasks.insert(task.id, task.clone());
            }

            Operation::TaskDelete { id } => {
                // run logs are history; they outlive the task
                self.tasks.remove(id);
            }

            Operation::TaskLastRun { id, at } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    task.last_run = Some(*at);
                    task.updated_at = *at;
                }
            }

            Operation::TaskNextRun { id, at } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    task.next_run = *at;
                }
            }

            Operation::RunLogCreate { log } => {
                self.run_logs.insert(log.id, log.clone());
            }

            Operation::RunLogComplete {
                id,
                outcome,
                finished_at,
            } => {
                if let Some(log) = self.run_logs.get_mut(id) {
                    if !log.status.is_terminal() {
                        log.finish(outcome, *finished_at);
                    }
                }
            }

            Operation::RunLogsPurge { cutoff } => {
                self.run_logs
                    .retain(|_, log| !log.status.is_terminal() || log.started_at >= *cutoff);
            }
        }
    }

    /// Run logs still in `Running` state, e.g. after an unclean shutdown
    pub fn running_logs(&self) -> Vec<RunLogId> {
        self.run_logs
            .values()
            .filter(|log| !log.status.is_terminal())
            .map(|log| log.id)
            .collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
