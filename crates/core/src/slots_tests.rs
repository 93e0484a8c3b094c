use super::*;
use crate::task::TaskId;

#[test]
fn grants_up_to_ceiling() {
    let slots = ExecutionSlots::new(2);
    let a = slots.try_acquire(TaskId::new()).unwrap();
    let b = slots.try_acquire(TaskId::new()).unwrap();
    assert_eq!(slots.in_flight(), 2);

    let err = slots.try_acquire(TaskId::new()).unwrap_err();
    assert_eq!(err, SlotDenied::CeilingReached);

    drop(a);
    assert_eq!(slots.in_flight(), 1);
    let _c = slots.try_acquire(TaskId::new()).unwrap();
    drop(b);
}

#[test]
fn denies_duplicate_task() {
    let slots = ExecutionSlots::new(3);
    let task = TaskId::new();
    let guard = slots.try_acquire(task).unwrap();
    assert_eq!(slots.try_acquire(task).unwrap_err(), SlotDenied::SelfOverlap);
    assert!(slots.is_running(task));

    drop(guard);
    assert!(!slots.is_running(task));
    let _again = slots.try_acquire(task).unwrap();
}

#[test]
fn duplicate_beats_ceiling_in_error_reporting() {
    let slots = ExecutionSlots::new(1);
    let task = TaskId::new();
    let _guard = slots.try_acquire(task).unwrap();
    // pool is full AND the task is running; the per-task reason wins
    assert_eq!(slots.try_acquire(task).unwrap_err(), SlotDenied::SelfOverlap);
    assert_eq!(
        slots.try_acquire(TaskId::new()).unwrap_err(),
        SlotDenied::CeilingReached
    );
}

#[test]
fn zero_ceiling_denies_everything() {
    let slots = ExecutionSlots::new(0);
    assert_eq!(
        slots.try_acquire(TaskId::new()).unwrap_err(),
        SlotDenied::CeilingReached
    );
}

#[test]
fn running_tasks_reflects_guards() {
    let slots = ExecutionSlots::new(4);
    let a = TaskId::new();
    let b = TaskId::new();
    let ga = slots.try_acquire(a).unwrap();
    let _gb = slots.try_acquire(b).unwrap();

    let mut running = slots.running_tasks();
    running.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(running, expected);

    drop(ga);
    assert_eq!(slots.running_tasks(), vec![b]);
}

#[test]
fn guard_survives_clone_of_controller() {
    let slots = ExecutionSlots::new(1);
    let other = slots.clone();
    let guard = slots.try_acquire(TaskId::new()).unwrap();
    assert_eq!(other.in_flight(), 1);
    drop(guard);
    assert_eq!(other.in_flight(), 0);
}
