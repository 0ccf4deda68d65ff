use chrono::Utc;
use tasklane_core::{
    NewTask, Result, StoreError, Task, TaskFilter, TaskPatch, TaskPriority, TaskStatus,
};

fn tasks() -> Vec<Task> {
    let now = Utc::now();
    vec![
        NewTask::new("triage inbox", 1).into_task(1, now),
        NewTask::new("fix login", 1)
            .with_priority(TaskPriority::High)
            .with_status(TaskStatus::InProgress)
            .into_task(2, now),
        NewTask::new("release notes", 1)
            .with_status(TaskStatus::Completed)
            .into_task(3, now),
        NewTask::new("someone else's", 2).into_task(4, now),
    ]
}

#[test]
fn test_filter_by_status_and_priority() {
    let all = tasks();

    let high = TaskFilter {
        priority: Some(TaskPriority::High),
        ..TaskFilter::default()
    };
    let ids: Vec<_> = all.iter().filter(|t| high.matches(t)).map(|t| t.id).collect();
    assert_eq!(ids, vec![2]);

    let pending_medium = TaskFilter {
        status: Some(TaskStatus::Pending),
        priority: Some(TaskPriority::Medium),
    };
    let ids: Vec<_> = all
        .iter()
        .filter(|t| pending_medium.matches(t))
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![1, 4]);

    assert!(all.iter().all(|t| TaskFilter::default().matches(t)));
}

#[test]
fn test_cached_snapshot_decodes_to_same_task() {
    let task = tasks().remove(1);
    let bytes = serde_json::to_vec(&task).unwrap();
    let decoded: Task = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(decoded, task);
}

#[test]
fn test_create_payload_from_json_uses_defaults() {
    let payload: NewTask = serde_json::from_str(r#"{"title":"buy milk","user_id":9}"#).unwrap();
    let task = payload.into_task(10, Utc::now());

    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.priority, TaskPriority::Medium);
    assert_eq!(task.description, "");
    assert!(task.due_date.is_none());
}

#[test]
fn test_patch_workflow_propagates_not_found() {
    fn update(store: &mut [Task], id: u64, patch: &TaskPatch) -> Result<Task> {
        let task = store
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::not_found(id))?;
        patch.apply(task);
        Ok(task.clone())
    }

    let mut store = tasks();
    let patch = TaskPatch {
        priority: Some(TaskPriority::Low),
        ..TaskPatch::default()
    };

    assert_eq!(update(&mut store, 3, &patch).unwrap().priority, TaskPriority::Low);
    assert!(update(&mut store, 99, &patch).unwrap_err().is_not_found());
}
