//! Task CRUD handlers. Every operation runs as the authenticated user;
//! ownership is enforced inside the store on each call.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use crate::error::Result;
use crate::model::task::{NewTask, TaskListQuery, TaskPatch};
use crate::routes::middleware_auth::CurrentUser;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewTask>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let task = state.tasks.create_task(user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<TaskListQuery>,
) -> Result<impl IntoResponse> {
    let query = params.parse()?;

    let tasks = state.tasks.list_tasks(user.id, &query).await?;

    Ok(Json(tasks))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<impl IntoResponse> {
    patch.validate()?;

    let task = state.tasks.update_task(user.id, id, patch).await?;

    Ok(Json(task))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.tasks.delete_task(user.id, id).await?;

    Ok(Json(json!({ "message": "Task removed." })))
}
