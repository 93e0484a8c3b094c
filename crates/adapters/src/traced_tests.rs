use super::*;
use crate::transfer::{FakeTransfer, TransferError};
use chrono::{TimeZone, Utc};
use porter_core::{ConfigBlob, TaskId, TaskKind};

fn sample_task() -> Task {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Task {
        id: TaskId::new(),
        name: "t".to_string(),
        kind: TaskKind::MinioToMinio,
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
async fn passes_through_success() {
    let fake = FakeTransfer::new();
    let traced = TracedTransfer::new(fake.clone());
    let task = sample_task();
    assert!(traced.transfer(&task).await.is_ok());
    assert_eq!(fake.calls(), vec![task.id]);
}

#[tokio::test]
async fn passes_through_errors_unchanged() {
    let fake = FakeTransfer::new();
    fake.push_result(Err(TransferError::Auth("denied".to_string())));
    let traced = TracedTransfer::new(fake);
    let err = traced.transfer(&sample_task()).await.unwrap_err();
    assert!(matches!(err, TransferError::Auth(_)));
}
