// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transfer backends
//!
//! A backend moves one task's data from source to destination and reports a
//! summary. The engine treats backends as opaque: any `Err` (or panic in
//! the backend) becomes a `Failed` run log, never a scheduler crash.

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTransfer;

use async_trait::async_trait;
use porter_core::{Task, TaskKind};
use thiserror::Error;

/// Errors from a transfer backend
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("data error: {0}")]
    Data(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a completed transfer accomplished
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSummary {
    /// Human-readable summary, e.g. "synced 12 tables, 48210 rows"
    pub detail: Option<String>,
    pub bytes_transferred: Option<u64>,
    /// Files or objects moved, when the backend can count them
    pub items_transferred: Option<u64>,
}

/// One replication mechanism (mysql sync, smb dump, minio sync)
#[async_trait]
pub trait TransferBackend: Clone + Send + Sync + 'static {
    async fn transfer(&self, task: &Task) -> Result<TransferSummary, TransferError>;
}

/// The full set of backends, one per task kind
#[async_trait]
pub trait Backends: Clone + Send + Sync + 'static {
    type MysqlSync: TransferBackend;
    type SmbDump: TransferBackend;
    type MinioSync: TransferBackend;

    fn mysql_sync(&self) -> &Self::MysqlSync;
    fn smb_dump(&self) -> &Self::SmbDump;
    fn minio_sync(&self) -> &Self::MinioSync;

    /// Dispatch to the backend matching the task's kind
    async fn execute(&self, task: &Task) -> Result<TransferSummary, TransferError> {
        match task.kind {
            TaskKind::MysqlToMysql => self.mysql_sync().transfer(task).await,
            TaskKind::MysqlToSmb => self.smb_dump().transfer(task).await,
            TaskKind::MinioToMinio => self.minio_sync().transfer(task).await,
        }
    }
}

/// Backend that succeeds without moving anything
#[derive(Clone, Default)]
pub struct NoOpTransfer;

#[async_trait]
impl TransferBackend for NoOpTransfer {
    async fn transfer(&self, _task: &Task) -> Result<TransferSummary, TransferError> {
        Ok(TransferSummary {
            detail: Some("no-op transfer".to_string()),
            bytes_transferred: None,
            items_transferred: None,
        })
    }
}

/// One backend serving all three kinds
#[derive(Clone)]
pub struct UniformBackends<B> {
    backend: B,
}

impl<B> UniformBackends<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B: TransferBackend> Backends for UniformBackends<B> {
    type MysqlSync = B;
    type SmbDump = B;
    type MinioSync = B;

    fn mysql_sync(&self) -> &B {
        &self.backend
    }

    fn smb_dump(&self) -> &B {
        &self.backend
    }

    fn minio_sync(&self) -> &B {
        &self.backend
    }
}
