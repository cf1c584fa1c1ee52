//! Task use-case service and personal agenda projection.
//!
//! # Responsibility
//! - Create, re-status and delete division tasks.
//! - Project one person's agenda across divisions.
//!
//! # Invariants
//! - Task ids are unique across all divisions of `tasksData`.
//! - `completedAt` is set exactly when status is `done`.
//! - Agenda order: open tasks first, then due date (undated last), then id.

use crate::model::collections::Tasks;
use crate::model::ids::{now_rfc3339, Record, RecordId};
use crate::model::records::{Division, Priority, Task, TaskStatus};
use crate::repo::collection_repo::{
    append_partitioned, locate_record, CollectionRepository, RepoError,
};
use crate::store::{DocumentStore, StorageMedium};
use log::info;
use std::cmp::Ordering;
use thiserror::Error;
use time::macros::format_description;
use time::Date;

#[derive(Debug, Error)]
pub enum TaskServiceError {
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("invalid due date `{0}`; expected YYYY-MM-DD")]
    InvalidDueDate(String),
    #[error("task not found: {0}")]
    NotFound(RecordId),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub type TaskResult<T> = Result<T, TaskServiceError>;

/// Request model for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assignee: Option<String>,
    pub client_id: Option<RecordId>,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
    pub priority: Priority,
}

/// One agenda row: a task plus the division it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaItem {
    pub division: Division,
    pub task: Task,
}

/// Use-case service over the `tasksData` collection.
pub struct TaskService<'s, M: StorageMedium> {
    repo: CollectionRepository<'s, M>,
}

impl<'s, M: StorageMedium> TaskService<'s, M> {
    pub fn new(store: &'s mut DocumentStore<M>) -> Self {
        Self {
            repo: CollectionRepository::new(store),
        }
    }

    /// Creates a `todo` task in `division`.
    ///
    /// # Errors
    /// - `EmptyTitle` for blank titles.
    /// - `InvalidDueDate` when `due_date` is not a calendar date.
    /// - `Repo` when `tasksData` cannot be decoded or the write is rejected.
    pub fn create_task(&mut self, division: Division, request: NewTask) -> TaskResult<Task> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(TaskServiceError::EmptyTitle);
        }
        let due_date = request
            .due_date
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(validate_due_date)
            .transpose()?;

        let mut task = Task {
            title: title.to_string(),
            description: request.description,
            assignee: request
                .assignee
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            client_id: request.client_id,
            due_date,
            priority: request.priority,
            status: TaskStatus::Todo,
            ..Task::default()
        };

        let now = now_rfc3339();
        let id = self.repo.modify::<Tasks, _>(|tasks| {
            append_partitioned(tasks, division.as_str(), task.clone(), &now)
        })?;
        task.set_id(id);
        task.touch(&now);
        info!(
            "event=task_create module=task status=ok division={} task_id={}",
            division.as_str(),
            task.id
        );
        Ok(task)
    }

    /// Changes status, maintaining `completedAt`.
    pub fn set_status(&mut self, id: &RecordId, status: TaskStatus) -> TaskResult<Task> {
        let mut tasks = self.repo.load_for_write::<Tasks>()?;
        let (division, index) =
            locate_record(&tasks, id).ok_or_else(|| TaskServiceError::NotFound(id.clone()))?;
        let now = now_rfc3339();
        let task = &mut tasks.entry(division).or_default()[index];
        task.completed_at = match status {
            TaskStatus::Done => task.completed_at.take().or_else(|| Some(now.clone())),
            TaskStatus::Todo | TaskStatus::InProgress | TaskStatus::Other(_) => None,
        };
        task.status = status;
        task.touch(&now);
        let updated = task.clone();

        self.repo.persist::<Tasks>(&tasks)?;
        Ok(updated)
    }

    /// Removes a task and returns it.
    pub fn delete_task(&mut self, id: &RecordId) -> TaskResult<Task> {
        let mut tasks = self.repo.load_for_write::<Tasks>()?;
        let (division, index) =
            locate_record(&tasks, id).ok_or_else(|| TaskServiceError::NotFound(id.clone()))?;
        let removed = tasks.entry(division).or_default().remove(index);

        self.repo.persist::<Tasks>(&tasks)?;
        info!("event=task_delete module=task status=ok task_id={id}");
        Ok(removed)
    }

    pub fn list_tasks(&mut self, division: Division) -> Vec<Task> {
        self.repo.partition::<Tasks, _>(division.as_str())
    }

    /// Tasks assigned to `assignee` (case-insensitive) across divisions.
    pub fn agenda(&mut self, assignee: &str) -> Vec<AgendaItem> {
        let assignee = assignee.trim();
        let document = self.repo.load::<Tasks>();
        let tasks = &document;
        let mut items: Vec<AgendaItem> = Division::ALL
            .into_iter()
            .flat_map(move |division| {
                tasks
                    .get(division.as_str())
                    .into_iter()
                    .flatten()
                    .filter(move |task| {
                        task.assignee
                            .as_deref()
                            .is_some_and(|name| name.eq_ignore_ascii_case(assignee))
                    })
                    .map(move |task| AgendaItem {
                        division,
                        task: task.clone(),
                    })
            })
            .collect();
        items.sort_by(|left, right| agenda_order(&left.task, &right.task));
        items
    }
}

fn validate_due_date(value: &str) -> TaskResult<String> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map(|_| value.to_string())
        .map_err(|_| TaskServiceError::InvalidDueDate(value.to_string()))
}

fn agenda_order(left: &Task, right: &Task) -> Ordering {
    let done = |task: &Task| task.status == TaskStatus::Done;
    done(left)
        .cmp(&done(right))
        .then_with(|| match (&left.due_date, &right.due_date) {
            (Some(l), Some(r)) => l.cmp(r),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| left.id.cmp(&right.id))
}
