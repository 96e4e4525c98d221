//! Postgres-backed store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::task::{NewTask, Task, TaskPatch, TaskPriority, TaskQuery, TaskStatus};
use crate::model::user::{NewUser, User};
use crate::store::{TaskStore, UserStore};

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, priority, due_date, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn task_owner(&self, id: Uuid) -> Result<Option<Uuid>> {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        }
    }
}

/// Status and priority live in TEXT columns; the row form carries them
/// as strings and conversion re-checks them against the closed enums.
#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        let status = TaskStatus::parse(&self.status)
            .ok_or_else(|| Error::Internal(format!("unknown status in database: {}", self.status)))?;
        let priority = TaskPriority::parse(&self.priority).ok_or_else(|| {
            Error::Internal(format!("unknown priority in database: {}", self.priority))
        })?;

        Ok(Task {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            status,
            priority,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict("User already exists".to_string())
            } else {
                Error::Database(e)
            }
        })?;

        Ok(row.into_user())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, owner: Uuid, task: NewTask) -> Result<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (id, user_id, title, description, status, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(task.title.trim())
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .fetch_one(&self.pool)
        .await?;

        row.into_task()
    }

    async fn list_tasks(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1");
        let mut bind_count = 2;

        if query.status.is_some() {
            sql.push_str(&format!(" AND status = ${bind_count}"));
            bind_count += 1;
        }
        if query.priority.is_some() {
            sql.push_str(&format!(" AND priority = ${bind_count}"));
            bind_count += 1;
        }
        if query.due_before.is_some() {
            sql.push_str(&format!(" AND due_date <= ${bind_count}"));
        }
        sql.push_str(&format!(" ORDER BY {}", query.sort.order_by_sql()));

        let mut q = sqlx::query_as::<_, TaskRow>(&sql).bind(owner);
        if let Some(status) = query.status {
            q = q.bind(status.as_str());
        }
        if let Some(priority) = query.priority {
            q = q.bind(priority.as_str());
        }
        if let Some(due) = query.due_before {
            q = q.bind(due);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    async fn update_task(&self, owner: Uuid, id: Uuid, patch: TaskPatch) -> Result<Task> {
        match self.task_owner(id).await? {
            None => return Err(Error::NotFound("Task not found.".to_string())),
            Some(holder) if holder != owner => {
                return Err(Error::Forbidden { user: owner, task: id });
            }
            Some(_) => {}
        }

        let mut sql = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if patch.title.is_some() {
            sql.push_str(&format!(", title = ${bind_count}"));
            bind_count += 1;
        }
        if patch.description.is_some() {
            sql.push_str(&format!(", description = ${bind_count}"));
            bind_count += 1;
        }
        if patch.status.is_some() {
            sql.push_str(&format!(", status = ${bind_count}"));
            bind_count += 1;
        }
        if patch.priority.is_some() {
            sql.push_str(&format!(", priority = ${bind_count}"));
            bind_count += 1;
        }
        if patch.due_date.is_some() {
            sql.push_str(&format!(", due_date = ${bind_count}"));
            bind_count += 1;
        }
        sql.push_str(&format!(" WHERE id = ${bind_count} RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, TaskRow>(&sql);
        if let Some(title) = &patch.title {
            q = q.bind(title.trim().to_string());
        }
        if let Some(description) = &patch.description {
            q = q.bind(description.clone());
        }
        if let Some(status) = patch.status {
            q = q.bind(status.as_str());
        }
        if let Some(priority) = patch.priority {
            q = q.bind(priority.as_str());
        }
        if let Some(due) = patch.due_date {
            q = q.bind(due);
        }

        // the row can vanish between the owner check and the update
        let row = q
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Task not found.".to_string()))?;

        row.into_task()
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<()> {
        match self.task_owner(id).await? {
            None => return Err(Error::NotFound("Task not found.".to_string())),
            Some(user) if user != owner => return Err(Error::Forbidden { user: owner, task: id }),
            Some(_) => {}
        }

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Task not found.".to_string()));
        }

        Ok(())
    }
}
