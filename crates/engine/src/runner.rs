// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-run execution
//!
//! One run: dispatch to the backend matching the task's kind, record the
//! outcome exactly once, notify at the start and terminal trigger points.
//! The backend future is spawned so a panic inside it surfaces as a
//! `JoinError` and is recorded as a failed run, not a crashed engine.

use porter_adapters::{
    Backends, Notifier, NotifyPayload, NotifyTrigger, RepositoryError, TaskRepository,
};
use porter_core::{Clock, Outcome, RunLog, RunStatus, Task};

/// Executes one run of one task
pub struct TaskRunner<R, B, N, C> {
    repo: R,
    backends: B,
    notifier: N,
    clock: C,
}

impl<R, B, N, C> TaskRunner<R, B, N, C>
where
    R: TaskRepository,
    B: Backends,
    N: Notifier,
    C: Clock,
{
    pub fn new(repo: R, backends: B, notifier: N, clock: C) -> Self {
        Self {
            repo,
            backends,
            notifier,
            clock,
        }
    }

    /// Open the run: persist a `Running` run log and send the start
    /// notification. Called with the execution slot already held.
    pub async fn start(&self, task: &Task, manual: bool) -> Result<RunLog, RepositoryError> {
        let log = RunLog::begin(task, self.clock.now(), manual);
        self.repo.create_run_log(log.clone()).await?;
        tracing::info!(
            task = %task.id,
            name = %task.name,
            run = %log.id,
            manual,
            "run started"
        );
        self.send(NotifyTrigger::RunStart, &log, task.user_id.clone())
            .await;
        Ok(log)
    }

    /// Execute the transfer and finalize the run log opened by
    /// [`start`](Self::start)
    pub async fn run(&self, task: Task, mut log: RunLog) -> Outcome {
        let backends = self.backends.clone();
        let transfer_task = task.clone();
        let result =
            tokio::spawn(async move { backends.execute(&transfer_task).await }).await;

        let outcome = match result {
            Ok(Ok(summary)) => Outcome::Success {
                detail: summary.detail,
                bytes_transferred: summary.bytes_transferred,
                items_transferred: summary.items_transferred,
            },
            Ok(Err(e)) => {
                tracing::warn!(task = %task.id, run = %log.id, error = %e, "transfer failed");
                Outcome::Failed {
                    error: e.to_string(),
                }
            }
            Err(join) => {
                tracing::error!(task = %task.id, run = %log.id, error = %join, "transfer backend panicked");
                Outcome::Failed {
                    error: format!("unexpected backend failure: {join}"),
                }
            }
        };

        let finished = self.clock.now();
        if let Err(e) = self.repo.complete_run_log(log.id, &outcome, finished).await {
            tracing::error!(run = %log.id, error = %e, "failed to record run outcome");
        }
        log.finish(&outcome, finished);
        tracing::info!(
            task = %task.id,
            run = %log.id,
            status = %log.status,
            duration_ms = log.duration_ms,
            "run finished"
        );

        let trigger = match log.status {
            RunStatus::Success => NotifyTrigger::RunSuccess,
            _ => NotifyTrigger::RunFailure,
        };
        self.send(trigger, &log, task.user_id).await;
        outcome
    }

    // Notification delivery is fire-and-forget; failure never fails the run
    async fn send(&self, trigger: NotifyTrigger, log: &RunLog, user_id: Option<String>) {
        let payload = NotifyPayload::from_log(trigger, log, user_id, self.clock.now());
        if let Err(e) = self.notifier.notify(&payload).await {
            tracing::warn!(task = %log.task_id, error = %e, "notification delivery failed");
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
