/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/login` - Exchange credentials for a bearer token

use crate::{app::AppState, error::ApiResult, extract::ValidatedJson};
use axum::{extract::State, Json};
use serde::Deserialize;
use todolist_shared::{models::UserProfile, services::Registration};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 3, max = 20, message = "Username must be between 3 and 20 characters"))]
    pub username: String,

    /// Email address, used to log in
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration {
            username: req.username,
            email: req.email,
            password: req.password,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@x.com",
///   "password": "p1"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": "uuid",
///   "username": "alice",
///   "email": "alice@x.com",
///   "role": "USER"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or validation failed
/// - `409 Conflict`: Email already exists
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state.auth.register(req.into()).await?;
    Ok(Json(profile))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "email": "alice@x.com",
///   "password": "p1"
/// }
/// ```
///
/// # Response
///
/// The signed token as `text/plain`:
///
/// ```text
/// eyJhbGciOiJIUzI1NiJ9...
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body
/// - `401 Unauthorized`: Unknown email or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<String> {
    let token = state.auth.authenticate(&req.email, &req.password).await?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "p1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let short_name = RegisterRequest {
            username: "al".to_string(),
            ..valid_request()
        };
        assert!(short_name.validate().is_err());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid_request()
        };
        let errors = bad_email.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));

        let no_password = RegisterRequest {
            password: String::new(),
            ..valid_request()
        };
        assert!(no_password.validate().is_err());
    }

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "p1".to_string(),
        }
    }

    #[test]
    fn test_missing_field_is_a_parse_error() {
        let parsed = serde_json::from_str::<RegisterRequest>(r#"{"email":"a@x.com","password":"p"}"#);
        assert!(parsed.is_err());
    }
}
