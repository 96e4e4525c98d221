//! Local mirror of the user's task list.
//!
//! Mutations go to the server first and the list is reconciled from
//! the response; nothing is inserted optimistically. Failures land in
//! a single error slot: a later failure overwrites it, a successful
//! fetch clears it. Only [`TaskCache::update_task`] also returns its
//! error, because the board needs to react to a failed move.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::client::api::{ApiClient, ApiMessage, ClientResult};
use crate::client::token_store::TokenStore;
use crate::model::task::{NewTask, Task, TaskListQuery, TaskPatch};

pub struct TaskCache {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
}

impl TaskCache {
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            tokens,
            tasks: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn token(&self) -> Option<String> {
        self.tokens.load()
    }

    /// Replace the whole list with the server's current view.
    pub async fn fetch_tasks(&mut self) {
        self.fetch_tasks_with(&TaskListQuery::default()).await;
    }

    pub async fn fetch_tasks_with(&mut self, query: &TaskListQuery) {
        self.loading = true;
        let token = self.token();

        match self
            .api
            .get_with_query::<_, Vec<Task>>("/api/tasks", query, token.as_deref())
            .await
        {
            Ok(tasks) => {
                self.tasks = tasks;
                self.error = None;
            }
            Err(e) => {
                debug!("fetch failed: {e}");
                self.error = Some("Failed to fetch tasks".to_string());
            }
        }

        self.loading = false;
    }

    /// On success the created record is appended at the tail, wherever
    /// the server's default ordering would have put it.
    pub async fn add_task(&mut self, task: NewTask) {
        let token = self.token();

        match self
            .api
            .post::<_, Task>("/api/tasks", &task, token.as_deref())
            .await
        {
            Ok(created) => self.tasks.push(created),
            Err(e) => {
                debug!("add failed: {e}");
                self.error = Some("Failed to add task".to_string());
            }
        }
    }

    /// The one operation that both records and returns its failure;
    /// callers must handle the `Err`.
    pub async fn update_task(&mut self, id: Uuid, patch: TaskPatch) -> ClientResult<Task> {
        let token = self.token();

        match self
            .api
            .put::<_, Task>(&format!("/api/tasks/{id}"), &patch, token.as_deref())
            .await
        {
            Ok(updated) => {
                if let Some(entry) = self.tasks.iter_mut().find(|t| t.id == id) {
                    *entry = updated.clone();
                }
                Ok(updated)
            }
            Err(e) => {
                self.error = Some("Failed to update task".to_string());
                Err(e)
            }
        }
    }

    /// A delete of an id the server no longer has fails cleanly: the
    /// error slot fills, the list stays as it was.
    pub async fn delete_task(&mut self, id: Uuid) {
        let token = self.token();

        match self
            .api
            .delete::<ApiMessage>(&format!("/api/tasks/{id}"), token.as_deref())
            .await
        {
            Ok(_) => self.tasks.retain(|t| t.id != id),
            Err(e) => {
                debug!("delete failed: {e}");
                self.error = Some("Failed to delete task".to_string());
            }
        }
    }
}
