use command_post_core::model::records::Priority;
use command_post_core::store::MemoryMedium;
use command_post_core::{
    Division, DocumentStore, NewTask, RecordId, TaskService, TaskServiceError, TaskStatus,
};
use serde_json::json;

fn task(title: &str, assignee: &str, due_date: Option<&str>) -> NewTask {
    NewTask {
        title: title.to_string(),
        assignee: Some(assignee.to_string()),
        due_date: due_date.map(str::to_string),
        priority: Priority::default(),
        ..NewTask::default()
    }
}

#[test]
fn created_tasks_get_collection_wide_ids() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let mut service = TaskService::new(&mut store);

    let first = service
        .create_task(Division::Gm, task("Audit", "Maya", None))
        .unwrap();
    let second = service
        .create_task(Division::Sg, task("Report", "Maya", None))
        .unwrap();

    assert_eq!(first.id, RecordId::Int(1));
    assert_eq!(second.id, RecordId::Int(2));
    assert_eq!(first.status, TaskStatus::Todo);
    assert!(!first.created_at.is_empty());
    assert_eq!(service.list_tasks(Division::Sg), vec![second]);
}

#[test]
fn create_rejects_blank_titles_and_bad_dates() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let mut service = TaskService::new(&mut store);

    assert!(matches!(
        service.create_task(Division::Gm, task("  ", "Maya", None)),
        Err(TaskServiceError::EmptyTitle)
    ));
    assert!(matches!(
        service.create_task(Division::Gm, task("Audit", "Maya", Some("05/01/2024"))),
        Err(TaskServiceError::InvalidDueDate(_))
    ));
    assert!(service.list_tasks(Division::Gm).is_empty());
}

#[test]
fn status_changes_maintain_completed_at() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let mut service = TaskService::new(&mut store);
    let created = service
        .create_task(Division::Gm, task("Audit", "Maya", None))
        .unwrap();

    let done = service.set_status(&created.id, TaskStatus::Done).unwrap();
    assert!(done.completed_at.is_some());
    let done_again = service.set_status(&created.id, TaskStatus::Done).unwrap();
    assert_eq!(done_again.completed_at, done.completed_at);

    let reopened = service
        .set_status(&created.id, TaskStatus::InProgress)
        .unwrap();
    assert!(reopened.completed_at.is_none());
    assert_eq!(reopened.status, TaskStatus::InProgress);

    assert!(matches!(
        service.set_status(&RecordId::Int(404), TaskStatus::Done),
        Err(TaskServiceError::NotFound(_))
    ));
}

#[test]
fn delete_removes_only_that_task() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let mut service = TaskService::new(&mut store);
    let keep = service
        .create_task(Division::Gm, task("Keep", "Maya", None))
        .unwrap();
    let drop_me = service
        .create_task(Division::Gm, task("Drop", "Maya", None))
        .unwrap();

    let removed = service.delete_task(&drop_me.id).unwrap();
    assert_eq!(removed.title, "Drop");
    assert_eq!(service.list_tasks(Division::Gm), vec![keep]);
    assert!(service.delete_task(&drop_me.id).is_err());
}

#[test]
fn agenda_orders_open_tasks_by_due_date() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let mut service = TaskService::new(&mut store);

    let undated = service
        .create_task(Division::Gm, task("Undated", "maya", None))
        .unwrap();
    let late = service
        .create_task(Division::Sg, task("Late", "Maya", Some("2024-05-20")))
        .unwrap();
    let soon = service
        .create_task(Division::Gm, task("Soon", "MAYA", Some("2024-05-02")))
        .unwrap();
    let finished = service
        .create_task(Division::Sg, task("Finished", "Maya", Some("2024-04-01")))
        .unwrap();
    service
        .create_task(Division::Gm, task("Someone else", "Devon", Some("2024-04-01")))
        .unwrap();
    service.set_status(&finished.id, TaskStatus::Done).unwrap();

    let agenda = service.agenda(" Maya ");
    let titles: Vec<&str> = agenda.iter().map(|item| item.task.title.as_str()).collect();
    assert_eq!(titles, vec!["Soon", "Late", "Undated", "Finished"]);
    assert_eq!(agenda[1].division, Division::Sg);
    assert_eq!(agenda[2].task.id, undated.id);
    assert_eq!(agenda[0].task.id, soon.id);
    assert_eq!(agenda[1].task.id, late.id);
}

#[test]
fn tasks_persist_under_division_partitions() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    TaskService::new(&mut store)
        .create_task(Division::Sg, task("Audit", "Maya", Some("2024-05-02")))
        .unwrap();

    let stored = store.get("tasksData", json!(null));
    assert_eq!(stored["sg"][0]["title"], json!("Audit"));
    assert_eq!(stored["sg"][0]["dueDate"], json!("2024-05-02"));
    assert_eq!(stored["sg"][0]["status"], json!("todo"));
}
