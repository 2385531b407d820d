/// Task management for administrators
///
/// # Endpoints
///
/// - `GET /admin/tasks/all-tasks`
/// - `GET /admin/tasks/task-by-id/:id`
/// - `POST /admin/tasks` (`201`)
/// - `PUT /admin/tasks/:id`
/// - `DELETE /admin/tasks/:id` (`204`)
/// - `GET /admin/tasks/by-status/:status`
/// - `GET /admin/tasks/by-title/:title` (bool)
/// - `GET /admin/tasks/count/:user_id` (number)
/// - `GET /admin/tasks/filter/:title`
/// - `DELETE /admin/tasks/delete/:status` (`204`)

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiPath, ValidatedJson},
    routes::user::{task_responses, TaskResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use todolist_shared::{models::TaskStatus, services::TaskDraft};
use uuid::Uuid;
use validator::Validate;

/// Admin task body; may name an owner
#[derive(Debug, Deserialize, Validate)]
pub struct AdminTaskRequest {
    #[validate(length(min = 1, max = 255, message = "The title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "The description can't be blank"))]
    pub description: String,

    #[serde(alias = "tasksStatus")]
    pub status: TaskStatus,

    /// Owner to assign; on update, `None` keeps the current owner
    #[serde(default, alias = "usuarioId")]
    pub owner_id: Option<Uuid>,
}

impl AdminTaskRequest {
    fn into_parts(self) -> (TaskDraft, Option<Uuid>) {
        let draft = TaskDraft {
            title: self.title,
            description: self.description,
            status: self.status,
        };
        (draft, self.owner_id)
    }
}

pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state.tasks.list_all().await?;
    Ok(Json(task_responses(tasks)))
}

pub async fn get_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    Ok(Json(state.tasks.get(id).await?.into()))
}

/// Creates a task, optionally for another user (who must exist)
pub async fn create_task(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AdminTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let (draft, owner_id) = req.into_parts();
    let task = state.tasks.create(draft, owner_id).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

pub async fn update_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<AdminTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let (draft, owner_id) = req.into_parts();
    let task = state.tasks.update(id, draft, owner_id).await?;
    Ok(Json(task.into()))
}

pub async fn delete_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_by_status(
    State(state): State<AppState>,
    ApiPath(status): ApiPath<TaskStatus>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state.tasks.list_by_status(status).await?;
    Ok(Json(task_responses(tasks)))
}

pub async fn exists_by_title(
    State(state): State<AppState>,
    ApiPath(title): ApiPath<String>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.tasks.exists_by_title(&title).await?))
}

pub async fn count_by_owner(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Json<u64>> {
    Ok(Json(state.tasks.count_by_owner(user_id).await?))
}

/// Tasks whose title is exactly `title`, oldest first
pub async fn filter_by_title(
    State(state): State<AppState>,
    ApiPath(title): ApiPath<String>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state.tasks.filter_by_title(&title).await?;
    Ok(Json(task_responses(tasks)))
}

/// Deletes every task with `status`; `404` when none match
pub async fn delete_by_status(
    State(state): State<AppState>,
    ApiPath(status): ApiPath<TaskStatus>,
) -> ApiResult<StatusCode> {
    state.tasks.delete_by_status(status).await?;
    Ok(StatusCode::NO_CONTENT)
}
