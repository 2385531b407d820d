/// Request identity resolution
///
/// Turns the `Authorization` header of one request into the [`CurrentUser`]
/// making it. The HTTP layer runs the resolver once per request and stores
/// the result in that request's extensions, so identity is never shared
/// between requests.
///
/// # Resolution steps
///
/// 1. No `Authorization` header: `AuthError::MissingHeader`
/// 2. Not `Bearer <token>`, or the token fails validation:
///    `AuthError::InvalidToken`
/// 3. Token subject no longer matches a stored user: `AuthError::InvalidToken`
/// 4. Otherwise the stored user, re-read on every request, so role changes
///    and deletions apply to the next request
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use todolist_shared::auth::middleware::CurrentUser;
///
/// async fn handler(Extension(current): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", current.username)
/// }
/// ```

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::TokenService;
use crate::models::{Role, User, UserProfile};
use crate::store::{StoreError, UserStore};

/// The authenticated caller of the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

impl From<CurrentUser> for UserProfile {
    fn from(current: CurrentUser) -> Self {
        Self {
            id: current.id,
            username: current.username,
            email: current.email,
            role: current.role,
        }
    }
}

/// Error type for identity resolution
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("Authorization header is missing")]
    MissingHeader,

    /// Malformed header, bad token, or token for a user that no longer exists
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Credential store failure while looking up the subject
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Extracts the token from a `Bearer <token>` header value
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves request credentials to a [`CurrentUser`]
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Resolves the raw `Authorization` header value, if any
    pub async fn resolve(&self, authorization: Option<&str>) -> Result<CurrentUser, AuthError> {
        let value = authorization.ok_or(AuthError::MissingHeader)?;
        let token = bearer_token(value).ok_or_else(|| {
            tracing::debug!("Authorization header is not a bearer token");
            AuthError::InvalidToken
        })?;

        let email = self
            .tokens
            .validate(token)
            .map_err(|_| AuthError::InvalidToken)?;

        match self.users.find_by_email(&email).await? {
            Some(user) => Ok(user.into()),
            None => {
                tracing::debug!(email = %email, "Token subject no longer exists");
                Err(AuthError::InvalidToken)
            }
        }
    }

    /// Resolves the caller from a request's headers
    ///
    /// A header that is not valid UTF-8 counts as present but invalid.
    pub async fn resolve_headers(&self, headers: &HeaderMap) -> Result<CurrentUser, AuthError> {
        match headers.get(header::AUTHORIZATION) {
            None => Err(AuthError::MissingHeader),
            Some(value) => {
                let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
                self.resolve(Some(value)).await
            }
        }
    }
}
