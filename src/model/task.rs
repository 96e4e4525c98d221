//! Task records and the list-query grammar.
//!
//! Status and priority are closed enums whose wire and database form
//! is the display string ("To Do", "High", ...). Anything outside the
//! enum is rejected at the boundary instead of matching nothing.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<TaskStatus> {
        match s {
            "To Do" => Some(TaskStatus::ToDo),
            "In Progress" => Some(TaskStatus::InProgress),
            "Completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    #[serde(rename = "Low")]
    Low,
    #[default]
    #[serde(rename = "Medium")]
    Medium,
    #[serde(rename = "High")]
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<TaskPriority> {
        match s {
            "Low" => Some(TaskPriority::Low),
            "Medium" => Some(TaskPriority::Medium),
            "High" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload. There is no owner field: the owner is always the
/// authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }
        Ok(())
    }
}

/// Partial update. `description` and `due_date` are nullable, so they
/// distinguish an absent key (keep) from an explicit `null` (clear).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(
        default,
        with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn with_status(status: TaskStatus) -> Self {
        TaskPatch {
            status: Some(status),
            ..TaskPatch::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::Validation("Title is required".to_string()));
            }
        }
        Ok(())
    }
}

/// A present key deserializes through the inner `Option`, so `null`
/// becomes `Some(None)`; an absent key stays `None` via the field's
/// `default`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

/// Raw `GET /api/tasks` query parameters, exactly as they appear on
/// the wire. [`TaskListQuery::parse`] turns them into a [`TaskQuery`]
/// or rejects them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
}

impl TaskListQuery {
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority.as_str().to_string());
        self
    }

    /// Filter to tasks due on or before `date`.
    pub fn due_on_or_before(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date.to_string());
        self
    }

    /// Raw `field[:direction]` sort token, e.g. `"dueDate:desc"`.
    pub fn sort_by(mut self, token: impl Into<String>) -> Self {
        self.sort_by = Some(token.into());
        self
    }

    pub fn parse(&self) -> Result<TaskQuery> {
        let status = match &self.status {
            Some(s) => Some(
                TaskStatus::parse(s)
                    .ok_or_else(|| Error::Validation(format!("Invalid status value: {s}")))?,
            ),
            None => None,
        };

        let priority = match &self.priority {
            Some(p) => Some(
                TaskPriority::parse(p)
                    .ok_or_else(|| Error::Validation(format!("Invalid priority value: {p}")))?,
            ),
            None => None,
        };

        let due_before = match &self.due_date {
            Some(d) => Some(
                d.parse::<NaiveDate>()
                    .map_err(|_| Error::Validation(format!("Invalid dueDate value: {d}")))?,
            ),
            None => None,
        };

        let sort = match &self.sort_by {
            Some(token) => TaskSort::parse(token)?,
            None => TaskSort::default(),
        };

        Ok(TaskQuery {
            status,
            priority,
            due_before,
            sort,
        })
    }
}

/// Validated list query applied by every store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Inclusive upper bound; tasks without a due date never match.
    pub due_before: Option<NaiveDate>,
    pub sort: TaskSort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    DueDate,
    Priority,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for TaskSort {
    fn default() -> Self {
        TaskSort {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl TaskSort {
    /// Parse a `field[:direction]` token. `desc` selects descending;
    /// any other direction token, including none, means ascending.
    pub fn parse(token: &str) -> Result<TaskSort> {
        let (field, direction) = match token.split_once(':') {
            Some((field, direction)) => (field, Some(direction)),
            None => (token, None),
        };

        let field = match field {
            "createdAt" => SortField::CreatedAt,
            "dueDate" => SortField::DueDate,
            "priority" => SortField::Priority,
            "title" => SortField::Title,
            other => {
                return Err(Error::Validation(format!("Invalid sortBy field: {other}")));
            }
        };

        let direction = match direction {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };

        Ok(TaskSort { field, direction })
    }

    /// ORDER BY clause for the Postgres store. Built from closed enums
    /// only, never from caller input. The trailing `id ASC` keeps
    /// equal keys in a stable order.
    pub fn order_by_sql(&self) -> String {
        let column = match self.field {
            SortField::CreatedAt => "created_at",
            SortField::DueDate => "due_date",
            SortField::Priority => "priority",
            SortField::Title => "title",
        };
        let direction = match self.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        format!("{column} {direction}, id ASC")
    }
}
