use chrono::{DateTime, Duration, TimeZone, Utc};
use std::rc::Rc;
use tasklist_core::{
    Clock, FixedClock, TaskId, TaskManager, TaskSnapshot, TaskStats, ValidationError,
};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).single().unwrap()
}

fn manager() -> (Rc<FixedClock>, TaskManager<Rc<FixedClock>>) {
    let clock = Rc::new(FixedClock::new(base_time()));
    (Rc::clone(&clock), TaskManager::with_clock(clock))
}

fn ids(manager: &TaskManager<Rc<FixedClock>>) -> Vec<u64> {
    manager
        .all_tasks()
        .iter()
        .map(|task| task.id().get())
        .collect()
}

#[test]
fn add_task_trims_text_and_starts_incomplete() {
    let (_, mut manager) = manager();

    let task = manager.add_task("  buy milk \n", None).unwrap();
    assert_eq!(task.id(), TaskId::new(1));
    assert_eq!(task.text(), "buy milk");
    assert!(!task.is_completed());
    assert_eq!(task.created_at(), base_time());
    assert_eq!(task.deadline(), None);
}

#[test]
fn blank_text_is_rejected_without_mutation() {
    let (_, mut manager) = manager();
    manager.add_task("first", None).unwrap();

    for input in ["", "   ", "\t\n"] {
        let err = manager.add_task(input, None).unwrap_err();
        assert_eq!(err, ValidationError::EmptyText);
    }

    assert_eq!(manager.len(), 1);
    assert_eq!(manager.next_id(), TaskId::new(2));
    let next = manager.add_task("second", None).unwrap();
    assert_eq!(next.id(), TaskId::new(2));
}

#[test]
fn ids_increase_by_one_across_deletions() {
    let (_, mut manager) = manager();
    let mut assigned = Vec::new();

    for round in 0..5 {
        let id = manager.add_task(&format!("task {round}"), None).unwrap().id();
        assigned.push(id.get());
        if round % 2 == 0 {
            assert!(manager.delete_task(id));
        }
    }

    assert_eq!(assigned, vec![1, 2, 3, 4, 5]);
    assert_eq!(ids(&manager), vec![2, 4]);
}

#[test]
fn delete_then_toggle_is_a_no_op() {
    let (_, mut manager) = manager();
    let keep = manager.add_task("keep", None).unwrap().id();
    let gone = manager.add_task("gone", None).unwrap().id();

    assert!(manager.delete_task(gone));
    let before = manager.all_tasks();

    assert!(!manager.delete_task(gone));
    assert!(!manager.toggle_task(gone));
    assert!(!manager.toggle_task(TaskId::new(999)));

    assert_eq!(manager.all_tasks(), before);
    assert!(manager.get_task(keep).is_some());
    assert!(manager.get_task(gone).is_none());
}

#[test]
fn toggle_flips_completion_both_ways() {
    let (_, mut manager) = manager();
    let id = manager.add_task("flip", None).unwrap().id();

    assert!(manager.toggle_task(id));
    assert!(manager.get_task(id).unwrap().is_completed());
    assert!(manager.toggle_task(id));
    assert!(!manager.get_task(id).unwrap().is_completed());
}

#[test]
fn clear_completed_keeps_order_and_is_idempotent() {
    let (_, mut manager) = manager();
    for text in ["a", "b", "c", "d", "e"] {
        manager.add_task(text, None).unwrap();
    }
    manager.toggle_task(TaskId::new(2));
    manager.toggle_task(TaskId::new(4));

    assert_eq!(manager.clear_completed(), 2);
    let once = manager.all_tasks();
    assert_eq!(ids(&manager), vec![1, 3, 5]);

    assert_eq!(manager.clear_completed(), 0);
    assert_eq!(manager.all_tasks(), once);
}

#[test]
fn stats_count_completed_overdue_and_normal() {
    let (_, mut manager) = manager();
    let done = manager.add_task("done", None).unwrap().id();
    manager
        .add_task("late", Some(base_time() - Duration::minutes(1)))
        .unwrap();
    manager.add_task("normal", None).unwrap();
    manager.toggle_task(done);

    assert_eq!(
        manager.stats(),
        TaskStats {
            total: 3,
            completed: 1,
            remaining: 2,
            overdue: 1,
            due_soon: 0,
        }
    );
}

#[test]
fn stats_follow_the_clock_without_mutation() {
    let (clock, mut manager) = manager();
    manager
        .add_task("report", Some(base_time() + Duration::hours(2)))
        .unwrap();
    manager
        .add_task("later", Some(base_time() + Duration::days(3)))
        .unwrap();

    let stats = manager.stats();
    assert_eq!((stats.overdue, stats.due_soon), (0, 1));

    clock.advance(Duration::hours(3));
    let stats = manager.stats();
    assert_eq!((stats.overdue, stats.due_soon), (1, 0));

    clock.advance(Duration::days(2));
    let stats = manager.stats();
    assert_eq!((stats.overdue, stats.due_soon), (1, 1));
    assert_eq!(manager.clock().now(), clock.now());
}

#[test]
fn completed_tasks_are_excluded_from_deadline_counters() {
    let (_, mut manager) = manager();
    let late = manager
        .add_task("late", Some(base_time() - Duration::hours(1)))
        .unwrap()
        .id();
    let soon = manager
        .add_task("soon", Some(base_time() + Duration::hours(1)))
        .unwrap()
        .id();
    manager.toggle_task(late);
    manager.toggle_task(soon);

    let stats = manager.stats();
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.overdue, 0);
    assert_eq!(stats.due_soon, 0);
}

#[test]
fn all_tasks_is_an_independent_snapshot_in_creation_order() {
    let (_, mut manager) = manager();
    for text in ["one", "two", "three", "four"] {
        manager.add_task(text, None).unwrap();
    }
    manager.toggle_task(TaskId::new(3));
    manager.delete_task(TaskId::new(2));
    manager.add_task("five", None).unwrap();

    let snapshot = manager.all_tasks();
    let texts: Vec<&str> = snapshot.iter().map(|task| task.text()).collect();
    assert_eq!(texts, vec!["one", "three", "four", "five"]);

    manager.delete_task(TaskId::new(1));
    manager.add_task("six", None).unwrap();
    assert_eq!(snapshot.len(), 4);
    assert_eq!(snapshot[0].id(), TaskId::new(1));
    assert_eq!(manager.tasks().len(), 4);
}

#[test]
fn snapshot_restore_never_reuses_deleted_ids() {
    let (clock, mut manager) = manager();
    manager.add_task("one", None).unwrap();
    let two = manager.add_task("two", None).unwrap().id();
    manager.toggle_task(two);
    let three = manager.add_task("three", None).unwrap().id();
    manager.delete_task(three);

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.next_id, 4);

    let mut restored = TaskManager::from_snapshot(snapshot, Rc::clone(&clock)).unwrap();
    assert_eq!(restored.all_tasks(), manager.all_tasks());
    assert_eq!(restored.add_task("four", None).unwrap().id(), TaskId::new(4));
}

#[test]
fn snapshot_restore_moves_counter_past_max_persisted_id() {
    let (clock, mut source) = manager();
    for text in ["a", "b", "c"] {
        source.add_task(text, None).unwrap();
    }
    let stale = TaskSnapshot {
        tasks: source.all_tasks(),
        next_id: 1,
    };

    let mut restored = TaskManager::from_snapshot(stale, clock).unwrap();
    assert_eq!(restored.next_id(), TaskId::new(4));
    assert_eq!(restored.add_task("d", None).unwrap().id(), TaskId::new(4));
}

#[test]
fn snapshot_restore_rejects_duplicate_ids() {
    let (clock, mut source) = manager();
    source.add_task("dup", None).unwrap();
    let task = source.all_tasks().remove(0);
    let snapshot = TaskSnapshot {
        tasks: vec![task.clone(), task],
        next_id: 2,
    };

    let err = TaskManager::from_snapshot(snapshot, clock).unwrap_err();
    assert_eq!(err, ValidationError::DuplicateId(TaskId::new(1)));
}

#[test]
fn snapshot_with_max_id_is_rejected_on_restore() {
    let (clock, _) = manager();
    let snapshot: TaskSnapshot = serde_json::from_value(serde_json::json!({
        "tasks": [{
            "id": u64::MAX,
            "text": "last slot",
            "completed": false,
            "created_at": "2026-10-14T12:00:00Z",
            "deadline": null
        }],
        "next_id": 1
    }))
    .unwrap();

    let err = TaskManager::from_snapshot(snapshot, clock).unwrap_err();
    assert_eq!(err, ValidationError::IdSpaceExhausted);
}

#[test]
fn add_task_fails_without_mutation_when_counter_cannot_advance() {
    let (clock, _) = manager();
    let snapshot = TaskSnapshot {
        tasks: Vec::new(),
        next_id: u64::MAX,
    };
    let mut manager = TaskManager::from_snapshot(snapshot, clock).unwrap();

    let err = manager.add_task("one too many", None).unwrap_err();
    assert_eq!(err, ValidationError::IdSpaceExhausted);
    assert!(manager.is_empty());
    assert_eq!(manager.next_id(), TaskId::new(u64::MAX));
}

#[test]
fn default_manager_uses_system_clock() {
    let mut manager = TaskManager::new();
    let before = Utc::now();
    let created_at = manager.add_task("now", None).unwrap().created_at();
    assert!(created_at >= before);
    assert!(manager.stats().total == 1 && !manager.is_empty());
}
