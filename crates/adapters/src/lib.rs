// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: task/run-log persistence, transfer backends,
//! and run notifications

pub mod notify;
pub mod repo;
pub mod traced;
pub mod transfer;

pub use notify::{NoOpNotifier, Notifier, NotifyError, NotifyPayload, NotifyTrigger, WebhookNotifier};
pub use repo::{RepositoryError, TaskRepository};
pub use traced::TracedTransfer;
pub use transfer::{
    Backends, NoOpTransfer, TransferBackend, TransferError, TransferSummary, UniformBackends,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifier;
#[cfg(any(test, feature = "test-support"))]
pub use repo::FakeRepository;
#[cfg(any(test, feature = "test-support"))]
pub use transfer::FakeTransfer;
