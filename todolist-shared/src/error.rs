/// Domain error taxonomy
///
/// Every core operation returns `Result<T, DomainError>`. The variants map
/// one-to-one onto transport status codes, but the translation itself happens
/// only at the HTTP boundary (`todolist-api::error`).

use crate::auth::authorization::AuthzError;
use crate::auth::middleware::AuthError;
use crate::auth::password::PasswordError;
use crate::auth::jwt::TokenError;
use crate::store::StoreError;

/// Message shared by every failed login, whatever the cause
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Result alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Malformed or missing input (400)
    #[error("{0}")]
    Validation(String),

    /// Login failed (401). Same message for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing, invalid or expired token (401)
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not allowed (403)
    #[error("{0}")]
    Forbidden(String),

    /// Resource absent, or absent from the caller's point of view (404)
    #[error("{0}")]
    NotFound(String),

    /// Duplicate email (409)
    #[error("{0}")]
    AlreadyExists(String),

    /// Anything else (500). The message is internal and never sent to clients.
    #[error("{0}")]
    Unexpected(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken(email) => {
                DomainError::AlreadyExists(format!("The email already exists: {}", email))
            }
            StoreError::UnknownOwner(id) => DomainError::NotFound(format!("User not found by ID: {}", id)),
            StoreError::Database(e) => DomainError::Unexpected(format!("Database error: {}", e)),
        }
    }
}

impl From<PasswordError> for DomainError {
    fn from(err: PasswordError) -> Self {
        DomainError::Unexpected(format!("Password operation failed: {}", err))
    }
}

impl From<TokenError> for DomainError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => DomainError::Unauthenticated(TokenError::Invalid.to_string()),
            TokenError::CreateError(msg) => DomainError::Unexpected(format!("Token creation failed: {}", msg)),
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(e) => e.into(),
            other => DomainError::Unauthenticated(other.to_string()),
        }
    }
}

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        DomainError::Forbidden(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DomainError {
    fn from(err: tokio::task::JoinError) -> Self {
        DomainError::Unexpected(format!("Background task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_invalid_credentials_message_is_fixed() {
        assert_eq!(DomainError::InvalidCredentials.to_string(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn test_store_conflict_maps_to_already_exists() {
        let err: DomainError = StoreError::EmailTaken("a@x.com".to_string()).into();
        assert!(matches!(err, DomainError::AlreadyExists(ref m) if m.contains("a@x.com")));

        let err: DomainError = StoreError::UnknownOwner(Uuid::new_v4()).into();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_database_failure_maps_to_unexpected() {
        let err: DomainError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, DomainError::Unexpected(ref m) if m.starts_with("Database error")));
    }

    #[test]
    fn test_token_error_maps_to_unauthenticated() {
        let err: DomainError = TokenError::Invalid.into();
        assert!(matches!(err, DomainError::Unauthenticated(ref m) if m == "Invalid or expired token"));
    }

    #[test]
    fn test_authz_error_maps_to_forbidden() {
        let err: DomainError = AuthzError::AdminRequired.into();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
