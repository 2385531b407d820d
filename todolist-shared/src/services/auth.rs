/// Authentication gate: registration and login
///
/// Login is the only path that mints a token. Both failure modes (unknown
/// email, wrong password) return [`DomainError::InvalidCredentials`] so a
/// caller cannot tell which one happened.
///
/// Argon2 is CPU-bound, so hashing and verification run on tokio's blocking
/// pool instead of stalling the async workers.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::error::{DomainError, DomainResult};
use crate::models::{NewUser, Role, UserProfile};
use crate::store::UserStore;

use super::{EMAIL_MAX_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN};

/// Registration input
///
/// HTTP callers validate the shape first; the length bounds are checked
/// again here so that accounts created at startup fit the columns too.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    fn check(&self) -> DomainResult<()> {
        let username_len = self.username.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
            return Err(DomainError::Validation(format!(
                "Username must be between {} and {} characters",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            )));
        }
        if self.email.chars().count() > EMAIL_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Email must be at most {} characters",
                EMAIL_MAX_LEN
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: Arc<TokenService>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Verifies credentials and issues a token whose subject is `email`
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown email or a wrong password
    /// - `Unexpected` for storage or signing failures
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<String> {
        let Some(user) = self.users.find_by_email(email).await? else {
            warn!(email = %email, "Login failed: unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?;

        if !matches {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.email)?;
        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    /// Registers a new `USER`
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the email is taken, including when a concurrent
    /// registration wins the race between the lookup and the insert
    pub async fn register(&self, registration: Registration) -> DomainResult<UserProfile> {
        let user = self.create_account(registration, Role::User).await?;
        info!(user_id = %user.id, email = %user.email, "User registered");
        Ok(user)
    }

    /// Creates an account with an explicit role (admin-created users, bootstrap)
    pub async fn create_account(&self, registration: Registration, role: Role) -> DomainResult<UserProfile> {
        registration.check()?;

        let Registration {
            username,
            email,
            password,
        } = registration;

        // Early, friendly answer; the unique index stays authoritative
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::AlreadyExists(format!(
                "The email already exists: {}",
                email
            )));
        }

        let password_hash = self.hash_password(password).await?;

        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
                role,
            })
            .await?;

        Ok(user.profile())
    }

    async fn hash_password(&self, password: String) -> DomainResult<String> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::HashParams;
    use crate::error::INVALID_CREDENTIALS_MESSAGE;
    use crate::store::MemoryStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service() -> (AuthService, Arc<TokenService>) {
        let tokens = Arc::new(TokenService::new(SECRET));
        let hasher = PasswordHasher::new(HashParams {
            memory_kib: 1024,
            iterations: 1,
            lanes: 1,
        });
        (
            AuthService::new(Arc::new(MemoryStore::new()), hasher, tokens.clone()),
            tokens,
        )
    }

    fn alice() -> Registration {
        Registration {
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "pw123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_assigns_user_role() {
        let (auth, _) = service();
        let profile = auth.register(alice()).await.unwrap();

        assert_eq!(profile.username, "alice");
        assert_eq!(profile.email, "alice@x.com");
        assert_eq!(profile.role, Role::User);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (auth, _) = service();
        auth.register(alice()).await.unwrap();

        let err = auth.register(alice()).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(ref m) if m == "The email already exists: alice@x.com"));
    }

    #[tokio::test]
    async fn test_register_rejects_oversized_fields() {
        let (auth, _) = service();

        let long_name = Registration {
            username: "a".repeat(21),
            ..alice()
        };
        let err = auth.create_account(long_name, Role::Admin).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("Username")));

        let long_email = Registration {
            email: format!("{}@x.com", "a".repeat(250)),
            ..alice()
        };
        assert!(matches!(auth.register(long_email).await, Err(DomainError::Validation(_))));

        let at_limit = Registration {
            username: "a".repeat(20),
            ..alice()
        };
        assert_eq!(auth.register(at_limit).await.unwrap().username.len(), 20);
    }

    #[tokio::test]
    async fn test_authenticate_issues_token_for_email() {
        let (auth, tokens) = service();
        auth.register(alice()).await.unwrap();

        let token = auth.authenticate("alice@x.com", "pw123").await.unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), "alice@x.com");
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() {
        let (auth, _) = service();
        auth.register(alice()).await.unwrap();

        let wrong_password = auth.authenticate("alice@x.com", "nope").await.unwrap_err();
        let unknown_email = auth.authenticate("nobody@x.com", "pw123").await.unwrap_err();

        assert!(matches!(wrong_password, DomainError::InvalidCredentials));
        assert!(matches!(unknown_email, DomainError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.to_string(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let store = MemoryStore::new();
        let auth = AuthService::new(
            Arc::new(store.clone()),
            PasswordHasher::new(HashParams {
                memory_kib: 1024,
                iterations: 1,
                lanes: 1,
            }),
            Arc::new(TokenService::new(SECRET)),
        );
        auth.register(alice()).await.unwrap();

        let stored = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw123");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_create_account_with_admin_role() {
        let (auth, _) = service();
        let profile = auth.create_account(alice(), Role::Admin).await.unwrap();
        assert_eq!(profile.role, Role::Admin);
    }
}
