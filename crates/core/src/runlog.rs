// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run log domain types
//!
//! Every execution that actually starts gets a run log row: created in
//! `Running` state when the execution begins, finalized exactly once with
//! the terminal status. Skipped fires never create a row.

use crate::task::{TaskId, TaskKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique run log identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RunLogId(Uuid);

impl RunLogId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RunLogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// Terminal result of a finished execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Outcome {
    Success {
        /// Backend-reported summary, e.g. "synced 12 tables, 48210 rows"
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bytes_transferred: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items_transferred: Option<u64>,
    },
    Failed {
        error: String,
    },
    Cancelled {
        reason: String,
    },
}

impl Outcome {
    pub fn status(&self) -> RunStatus {
        match self {
            Outcome::Success { .. } => RunStatus::Success,
            Outcome::Failed { .. } => RunStatus::Failed,
            Outcome::Cancelled { .. } => RunStatus::Cancelled,
        }
    }
}

/// One execution of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub id: RunLogId,
    pub task_id: TaskId,
    /// Denormalized so history survives task deletion
    pub task_name: String,
    pub kind: TaskKind,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_transferred: Option<u64>,
    /// Files or objects moved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_transferred: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True when the run was started manually rather than by the scheduler
    #[serde(default)]
    pub manual: bool,
}

impl RunLog {
    /// A fresh row for an execution that is starting now
    pub fn begin(task: &crate::task::Task, started_at: DateTime<Utc>, manual: bool) -> Self {
        Self {
            id: RunLogId::new(),
            task_id: task.id,
            task_name: task.name.clone(),
            kind: task.kind,
            status: RunStatus::Running,
            started_at,
            finished_at: None,
            duration_ms: None,
            detail: None,
            bytes_transferred: None,
            items_transferred: None,
            error: None,
            manual,
        }
    }

    /// Finalize the row with a terminal outcome. Duration is computed from
    /// the recorded start, clamped at zero.
    pub fn finish(&mut self, outcome: &Outcome, finished_at: DateTime<Utc>) {
        self.status = outcome.status();
        self.finished_at = Some(finished_at);
        self.duration_ms = Some((finished_at - self.started_at).num_milliseconds().max(0));
        match outcome {
            Outcome::Success {
                detail,
                bytes_transferred,
                items_transferred,
            } => {
                self.detail = detail.clone();
                self.bytes_transferred = *bytes_transferred;
                self.items_transferred = *items_transferred;
            }
            Outcome::Failed { error } => self.error = Some(error.clone()),
            Outcome::Cancelled { reason } => self.error = Some(reason.clone()),
        }
    }
}
