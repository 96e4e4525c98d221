//! In-memory store used by the integration tests and as a
//! zero-setup dev backend. Mirrors the Postgres implementation's
//! filter, sort and ownership semantics exactly.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::task::{NewTask, SortDirection, SortField, Task, TaskPatch, TaskQuery, TaskSort};
use crate::model::user::{NewUser, User};
use crate::store::{TaskStore, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    tasks: Vec<Task>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        // check and insert under one write guard, so no duplicate can
        // slip in between
        let mut inner = self.inner.write().await;

        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());

        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, owner: Uuid, task: NewTask) -> Result<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            user_id: owner,
            title: task.title.trim().to_string(),
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.write().await;
        inner.tasks.push(task.clone());

        Ok(task)
    }

    async fn list_tasks(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>> {
        let inner = self.inner.read().await;

        let mut tasks: Vec<Task> = inner
            .tasks
            .iter()
            .filter(|t| t.user_id == owner)
            .filter(|t| query.status.is_none_or(|s| t.status == s))
            .filter(|t| query.priority.is_none_or(|p| t.priority == p))
            .filter(|t| match query.due_before {
                // tasks without a due date never match a due-date filter
                Some(bound) => t.due_date.is_some_and(|due| due <= bound),
                None => true,
            })
            .cloned()
            .collect();

        tasks.sort_by(|a, b| compare(a, b, &query.sort));

        Ok(tasks)
    }

    async fn update_task(&self, owner: Uuid, id: Uuid, patch: TaskPatch) -> Result<Task> {
        let mut inner = self.inner.write().await;

        let task = inner
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound("Task not found.".to_string()))?;

        if task.user_id != owner {
            return Err(Error::Forbidden { user: owner, task: id });
        }

        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;

        let position = inner
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound("Task not found.".to_string()))?;

        if inner.tasks[position].user_id != owner {
            return Err(Error::Forbidden { user: owner, task: id });
        }

        inner.tasks.remove(position);

        Ok(())
    }
}

/// Ordering that matches `TaskSort::order_by_sql` applied to the
/// Postgres schema: priority compares as its TEXT form, absent due
/// dates sort last ascending and first descending, and `id ASC` breaks
/// every tie.
fn compare(a: &Task, b: &Task, sort: &TaskSort) -> Ordering {
    let primary = match sort.field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::DueDate => match (a.due_date, b.due_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
        },
        SortField::Priority => a.priority.as_str().cmp(b.priority.as_str()),
        SortField::Title => a.title.cmp(&b.title),
    };

    let primary = match sort.direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };

    primary.then_with(|| a.id.cmp(&b.id))
}
