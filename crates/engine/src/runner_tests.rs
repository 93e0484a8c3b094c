use super::*;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use porter_adapters::{
    FakeNotifier, FakeRepository, FakeTransfer, NotifyTrigger, TransferBackend, TransferError,
    TransferSummary, UniformBackends,
};
use porter_core::{ConfigBlob, FakeClock, RunStatus, TaskId, TaskKind};

fn start_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
}

fn sample_task() -> Task {
    Task {
        id: TaskId::new(),
        name: "nightly".to_string(),
        kind: TaskKind::MysqlToMysql,
        schedule: "0 2 * * *".to_string(),
        source: ConfigBlob::default(),
        destination: ConfigBlob::default(),
        options: ConfigBlob::default(),
        active: true,
        user_id: Some("u1".to_string()),
        last_run: None,
        next_run: None,
        created_at: start_time(),
        updated_at: start_time(),
    }
}

type TestRunner =
    TaskRunner<FakeRepository, UniformBackends<FakeTransfer>, FakeNotifier, FakeClock>;

fn runner(transfer: FakeTransfer) -> (TestRunner, FakeRepository, FakeNotifier, FakeClock) {
    let repo = FakeRepository::new();
    let notifier = FakeNotifier::new();
    let clock = FakeClock::new(start_time());
    let runner = TaskRunner::new(
        repo.clone(),
        UniformBackends::new(transfer),
        notifier.clone(),
        clock.clone(),
    );
    (runner, repo, notifier, clock)
}

#[tokio::test]
async fn success_records_summary_and_notifies() {
    let transfer = FakeTransfer::new();
    transfer.push_result(Ok(TransferSummary {
        detail: Some("synced 12 tables".to_string()),
        bytes_transferred: Some(4096),
        items_transferred: Some(12),
    }));
    let (runner, repo, notifier, clock) = runner(transfer);
    let task = sample_task();
    repo.put_task(task.clone());

    let log = runner.start(&task, false).await.unwrap();
    assert_eq!(repo.run_logs()[0].status, RunStatus::Running);

    clock.advance(Duration::seconds(42));
    let outcome = runner.run(task.clone(), log).await;
    assert!(matches!(outcome, Outcome::Success { .. }));

    let logs = repo.run_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, RunStatus::Success);
    assert_eq!(logs[0].detail.as_deref(), Some("synced 12 tables"));
    assert_eq!(logs[0].bytes_transferred, Some(4096));
    assert_eq!(logs[0].items_transferred, Some(12));
    assert_eq!(logs[0].duration_ms, Some(42_000));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].trigger, NotifyTrigger::RunStart);
    assert_eq!(sent[1].trigger, NotifyTrigger::RunSuccess);
    assert_eq!(sent[1].user_id.as_deref(), Some("u1"));
    assert_eq!(sent[1].bytes_transferred, Some(4096));
    assert_eq!(sent[1].items_transferred, Some(12));
}

#[tokio::test]
async fn backend_failure_becomes_failed_log() {
    let transfer = FakeTransfer::new();
    transfer.push_result(Err(TransferError::Connection(
        "connection refused".to_string(),
    )));
    let (runner, repo, notifier, _clock) = runner(transfer);
    let task = sample_task();
    repo.put_task(task.clone());

    let log = runner.start(&task, false).await.unwrap();
    let outcome = runner.run(task, log).await;
    assert!(matches!(outcome, Outcome::Failed { .. }));

    let logs = repo.run_logs();
    assert_eq!(logs[0].status, RunStatus::Failed);
    let error = logs[0].error.as_deref().unwrap();
    assert!(error.contains("connection refused"), "got: {error}");
    assert_eq!(logs[0].bytes_transferred, None);
    assert_eq!(logs[0].items_transferred, None);

    assert_eq!(notifier.sent()[1].trigger, NotifyTrigger::RunFailure);
}

#[derive(Clone)]
struct PanickingBackend;

#[async_trait]
impl TransferBackend for PanickingBackend {
    async fn transfer(&self, _task: &Task) -> Result<TransferSummary, TransferError> {
        panic!("backend blew up");
    }
}

#[tokio::test]
async fn backend_panic_is_contained_as_failure() {
    let repo = FakeRepository::new();
    let notifier = FakeNotifier::new();
    let clock = FakeClock::new(start_time());
    let runner = TaskRunner::new(
        repo.clone(),
        UniformBackends::new(PanickingBackend),
        notifier.clone(),
        clock,
    );
    let task = sample_task();
    repo.put_task(task.clone());

    let log = runner.start(&task, false).await.unwrap();
    let outcome = runner.run(task, log).await;
    assert!(matches!(outcome, Outcome::Failed { .. }));

    let logs = repo.run_logs();
    assert_eq!(logs[0].status, RunStatus::Failed);
    assert!(logs[0]
        .error
        .as_deref()
        .unwrap()
        .contains("unexpected backend failure"));
    assert_eq!(notifier.sent()[1].trigger, NotifyTrigger::RunFailure);
}

#[tokio::test]
async fn notifier_failure_never_fails_the_run() {
    let (runner, repo, notifier, _clock) = runner(FakeTransfer::new());
    notifier.fail_deliveries();
    let task = sample_task();
    repo.put_task(task.clone());

    let log = runner.start(&task, true).await.unwrap();
    let outcome = runner.run(task, log).await;
    assert!(matches!(outcome, Outcome::Success { .. }));
    assert_eq!(repo.run_logs()[0].status, RunStatus::Success);
    assert!(repo.run_logs()[0].manual);
}
