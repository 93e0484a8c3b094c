use super::*;
use crate::transfer::{Backends, UniformBackends};
use chrono::{TimeZone, Utc};
use porter_core::{ConfigBlob, TaskKind};

fn sample_task(kind: TaskKind) -> Task {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Task {
        id: TaskId::new(),
        name: "t".to_string(),
        kind,
        schedule: "* * * * *".to_string(),
        source: ConfigBlob::default(),
        destination: ConfigBlob::default(),
        options: ConfigBlob::default(),
        active: true,
        user_id: None,
        last_run: None,
        next_run: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn records_calls_and_defaults_to_success() {
    let fake = FakeTransfer::new();
    let task = sample_task(TaskKind::MysqlToMysql);
    let summary = fake.transfer(&task).await.unwrap();
    assert_eq!(summary, TransferSummary::default());
    assert_eq!(fake.calls(), vec![task.id]);
}

#[tokio::test]
async fn serves_scripted_results_in_order() {
    let fake = FakeTransfer::new();
    fake.push_result(Ok(TransferSummary {
        detail: Some("first".to_string()),
        bytes_transferred: Some(10),
        items_transferred: Some(2),
    }));
    fake.push_result(Err(TransferError::Connection("refused".to_string())));

    let task = sample_task(TaskKind::MinioToMinio);
    let first = fake.transfer(&task).await.unwrap();
    assert_eq!(first.detail.as_deref(), Some("first"));

    let err = fake.transfer(&task).await.unwrap_err();
    assert!(matches!(err, TransferError::Connection(_)));

    // queue drained: back to default success
    assert!(fake.transfer(&task).await.is_ok());
}

#[tokio::test]
async fn holding_fake_blocks_until_released() {
    let fake = FakeTransfer::holding();
    let task = sample_task(TaskKind::MysqlToSmb);

    let clone = fake.clone();
    let moved = task.clone();
    let handle = tokio::spawn(async move { clone.transfer(&moved).await });

    // the call is recorded before the gate, so we can observe it in flight
    tokio::task::yield_now().await;
    assert!(!handle.is_finished());

    fake.release(1);
    assert!(handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn uniform_backends_dispatches_every_kind_to_same_fake() {
    let fake = FakeTransfer::new();
    let backends = UniformBackends::new(fake.clone());

    for kind in [TaskKind::MysqlToMysql, TaskKind::MysqlToSmb, TaskKind::MinioToMinio] {
        backends.execute(&sample_task(kind)).await.unwrap();
    }
    assert_eq!(fake.calls().len(), 3);
}
