//! Task CRUD handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tasklane_core::{
    NewTask, Task, TaskFilter, TaskId, TaskPatch, TaskPriority, TaskStatus, UserId,
};

use crate::error::AppError;
use crate::state::AppState;

/// Query string of `GET /tasks`.
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub user_id: UserId,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl ListTasksQuery {
    fn filter(&self) -> TaskFilter {
        TaskFilter {
            status: self.status,
            priority: self.priority,
        }
    }
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(new_task): Json<NewTask>,
) -> Result<impl IntoResponse, AppError> {
    if new_task.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }

    let task = state.tasks().create(new_task).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /tasks?user_id=&status=&priority=
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = state.tasks().list(query.user_id, &query.filter()).await?;
    Ok(Json(tasks))
}

/// GET /tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.tasks().get_by_id(id).await?))
}

/// PUT /tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.tasks().update(id, &patch).await?))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> Result<StatusCode, AppError> {
    state.tasks().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
