/// User management for administrators
///
/// # Endpoints
///
/// - `GET /admin/users/all-users`
/// - `GET /admin/users/user-by-id/:id`
/// - `GET /admin/users/user-by-email/:email`
/// - `GET /admin/users/exists-user/:username` (bool)
/// - `GET /admin/users/count-users/:email` (number)
/// - `POST /admin/users/create-user` (`201`)
/// - `DELETE /admin/users/delete-user/:id` (`204`, cascades to tasks)
/// - `DELETE /admin/users/delete-by-email/:email` (`204`)
/// - `PUT /admin/users/:id/assign-role?roleName=ADMIN|USER`

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiPath, ApiQuery, ValidatedJson},
    routes::auth::RegisterRequest,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use todolist_shared::models::{Role, UserProfile};
use uuid::Uuid;

/// Query of the assign-role endpoint
#[derive(Debug, Deserialize)]
pub struct AssignRoleQuery {
    #[serde(rename = "roleName")]
    pub role_name: Role,
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserProfile>>> {
    Ok(Json(state.users.list().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.users.get(id).await?))
}

pub async fn get_by_email(
    State(state): State<AppState>,
    ApiPath(email): ApiPath<String>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.users.get_by_email(&email).await?))
}

pub async fn exists_by_username(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.users.exists_by_username(&username).await?))
}

pub async fn count_by_email(
    State(state): State<AppState>,
    ApiPath(email): ApiPath<String>,
) -> ApiResult<Json<u64>> {
    Ok(Json(state.users.count_by_email(&email).await?))
}

/// Creates a regular user; same body and rules as registration
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = state.users.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_by_email(
    State(state): State<AppState>,
    ApiPath(email): ApiPath<String>,
) -> ApiResult<StatusCode> {
    state.users.delete_by_email(&email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Grants `roleName` to a user
///
/// The identity layer re-reads the user on every request, so the new role
/// applies from the next request on without a new token.
pub async fn assign_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<AssignRoleQuery>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.users.assign_role(id, query.role_name).await?))
}
