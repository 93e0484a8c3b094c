// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task domain types

use crate::cron::{CronExpr, CronParseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique task identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a task replicates, and between which systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Logical sync between two MySQL servers
    MysqlToMysql,
    /// MySQL dump delivered to an SMB share
    MysqlToSmb,
    /// Object replication between two MinIO/S3 endpoints
    MinioToMinio,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::MysqlToMysql => "mysql_to_mysql",
            TaskKind::MysqlToSmb => "mysql_to_smb",
            TaskKind::MinioToMinio => "minio_to_minio",
        };
        write!(f, "{name}")
    }
}

/// Opaque endpoint or option payload.
///
/// Connection settings are interpreted by the transfer backends, not the
/// engine. The blob typically carries credentials, so `Debug` does not
/// print its contents.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigBlob(pub serde_json::Value);

impl ConfigBlob {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl fmt::Debug for ConfigBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfigBlob(..)")
    }
}

/// A scheduled replication task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub kind: TaskKind,
    /// 5-field cron expression, validated on upsert
    pub schedule: String,
    pub source: ConfigBlob,
    pub destination: ConfigBlob,
    #[serde(default)]
    pub options: ConfigBlob,
    pub active: bool,
    /// Owner of the task, opaque to the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Parse the task's schedule. Valid for any task that passed upsert
    /// validation; re-parsing keeps evaluation and validation on the same
    /// code path.
    pub fn cron(&self) -> Result<CronExpr, CronParseError> {
        CronExpr::parse(&self.schedule)
    }
}
