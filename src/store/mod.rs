//! Persistence traits and their backends.
//!
//! Every task operation takes the owner's id and re-checks ownership
//! against stored state; nothing is decided from cached identity. A
//! task that exists but belongs to someone else comes back as
//! [`Error::Forbidden`](crate::error::Error::Forbidden), which the
//! HTTP layer collapses into the same 404 as a missing task.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::model::task::{NewTask, Task, TaskPatch, TaskQuery};
use crate::model::user::{NewUser, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Email uniqueness is enforced by the store itself
    /// and a duplicate is `Error::Conflict`; there is no
    /// check-then-insert window.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, owner: Uuid, task: NewTask) -> Result<Task>;

    /// The owner's tasks only, filtered and ordered per `query`.
    async fn list_tasks(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>>;

    async fn update_task(&self, owner: Uuid, id: Uuid, patch: TaskPatch) -> Result<Task>;

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<()>;
}
