/// Endpoints for the authenticated caller
///
/// Every handler receives the [`CurrentUser`] resolved by the identity layer.
/// Task routes only ever see the caller's own tasks: someone else's task id
/// answers `404`, exactly like an id that does not exist.
///
/// # Endpoints
///
/// - `GET /user/me` / `PUT /user/me`
/// - `GET /user/tasks`
/// - `POST /user/tasks/create`
/// - `GET|PUT|DELETE /user/tasks/:id`

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiPath, ValidatedJson},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use todolist_shared::{
    auth::middleware::CurrentUser,
    models::{Task, TaskStatus, UpdateUser, UserProfile},
    services::TaskDraft,
};
use uuid::Uuid;
use validator::Validate;

/// Task as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub owner_id: Option<Uuid>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            owner_id: task.owner_id,
        }
    }
}

pub(crate) fn task_responses(tasks: Vec<Task>) -> Vec<TaskResponse> {
    tasks.into_iter().map(TaskResponse::from).collect()
}

/// Task create/update body
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    #[validate(length(min = 1, max = 255, message = "The title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "The description can't be blank"))]
    pub description: String,

    #[serde(alias = "tasksStatus")]
    pub status: TaskStatus,
}

impl From<TaskRequest> for TaskDraft {
    fn from(req: TaskRequest) -> Self {
        TaskDraft {
            title: req.title,
            description: req.description,
            status: req.status,
        }
    }
}

/// Profile update body; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 20, message = "Username must be between 3 and 20 characters"))]
    pub username: Option<String>,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: Option<String>,
}

pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.users.profile(&current).await?))
}

/// Updates the caller's username and/or email
///
/// Changing the email invalidates the token used for this request, since
/// tokens are bound to the email.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    let update = UpdateUser {
        username: req.username,
        email: req.email,
    };
    Ok(Json(state.users.update_profile(&current, update).await?))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state.tasks.list_own(&current).await?;
    Ok(Json(task_responses(tasks)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks.get_own(&current, id).await?;
    Ok(Json(task.into()))
}

/// Creates a task owned by the caller
pub async fn create_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<TaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks.create_own(&current, req.into()).await?;
    Ok(Json(task.into()))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<TaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks.update_own(&current, id, req.into()).await?;
    Ok(Json(task.into()))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.tasks.delete_own(&current, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
