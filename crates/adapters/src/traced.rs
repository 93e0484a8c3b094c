// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::transfer::{TransferBackend, TransferError, TransferSummary};
use async_trait::async_trait;
use porter_core::Task;

/// Wrapper that adds tracing to any TransferBackend
#[derive(Clone)]
pub struct TracedTransfer<B> {
    inner: B,
}

impl<B> TracedTransfer<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: TransferBackend> TransferBackend for TracedTransfer<B> {
    async fn transfer(&self, task: &Task) -> Result<TransferSummary, TransferError> {
        let span = tracing::info_span!(
            "transfer",
            task_id = %task.id,
            task_name = %task.name,
            kind = %task.kind,
        );
        let _guard = span.enter();

        tracing::info!("starting");
        let start = std::time::Instant::now();
        let result = self.inner.transfer(task).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(summary) => tracing::info!(
                elapsed_ms = elapsed.as_millis() as u64,
                bytes = summary.bytes_transferred,
                items = summary.items_transferred,
                detail = summary.detail.as_deref(),
                "finished"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "failed"
            ),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
