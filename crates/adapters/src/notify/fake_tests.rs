use super::*;
use crate::notify::NotifyTrigger;
use chrono::Utc;
use porter_core::{RunLogId, RunStatus, TaskId, TaskKind};

fn payload(trigger: NotifyTrigger) -> NotifyPayload {
    NotifyPayload {
        trigger,
        task_id: TaskId::new(),
        task_name: "nightly".to_string(),
        kind: TaskKind::MysqlToMysql,
        run_log_id: RunLogId::new(),
        status: RunStatus::Running,
        user_id: None,
        timestamp: Utc::now(),
        detail: None,
        bytes_transferred: None,
        items_transferred: None,
        error: None,
    }
}

#[tokio::test]
async fn records_payloads_in_order() {
    let notifier = FakeNotifier::new();
    notifier.notify(&payload(NotifyTrigger::RunStart)).await.unwrap();
    notifier.notify(&payload(NotifyTrigger::RunSuccess)).await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].trigger, NotifyTrigger::RunStart);
    assert_eq!(sent[1].trigger, NotifyTrigger::RunSuccess);
}

#[tokio::test]
async fn scripted_failure_still_records() {
    let notifier = FakeNotifier::new();
    notifier.fail_deliveries();
    let err = notifier.notify(&payload(NotifyTrigger::RunFailure)).await.unwrap_err();
    assert!(matches!(err, NotifyError::Delivery(_)));
    assert_eq!(notifier.sent().len(), 1);
}
