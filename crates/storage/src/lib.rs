// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable task and run-log storage
//!
//! State is an append-only JSONL write-ahead log replayed into an
//! in-memory materialized view at startup. [`WalRepository`] wraps the
//! pair behind the repository trait the engine consumes.

pub mod repo;
pub mod state;
pub mod wal;

pub use repo::WalRepository;
pub use state::{MaterializedState, Operation};
pub use wal::{Wal, WalError};
