/// User account operations
///
/// Everything returns [`UserProfile`]; password hashes never leave the
/// storage layer through this service.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::auth::{AuthService, Registration};
use crate::auth::middleware::CurrentUser;
use crate::error::{DomainError, DomainResult};
use crate::models::{Role, UpdateUser, UserProfile};
use crate::store::UserStore;

fn user_not_found(id: Uuid) -> DomainError {
    DomainError::NotFound(format!("User not found by ID: {}", id))
}

fn email_not_found(email: &str) -> DomainError {
    DomainError::NotFound(format!("User not found by email: {}", email))
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    accounts: AuthService,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, accounts: AuthService) -> Self {
        Self { users, accounts }
    }

    /// The caller's own profile, re-read from storage
    pub async fn profile(&self, current: &CurrentUser) -> DomainResult<UserProfile> {
        self.get(current.id).await
    }

    /// Changes the caller's username and/or email
    ///
    /// A new email must not belong to anyone else (`AlreadyExists`). Tokens
    /// carry the email, so changing it invalidates the caller's current token.
    pub async fn update_profile(&self, current: &CurrentUser, update: UpdateUser) -> DomainResult<UserProfile> {
        let user = self
            .users
            .update_profile(current.id, update)
            .await?
            .ok_or_else(|| user_not_found(current.id))?;

        info!(user_id = %user.id, "Profile updated");
        Ok(user.profile())
    }

    pub async fn list(&self) -> DomainResult<Vec<UserProfile>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<UserProfile> {
        self.users
            .find_by_id(id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| user_not_found(id))
    }

    pub async fn get_by_email(&self, email: &str) -> DomainResult<UserProfile> {
        self.users
            .find_by_email(email)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| email_not_found(email))
    }

    pub async fn exists_by_username(&self, username: &str) -> DomainResult<bool> {
        Ok(self.users.exists_by_username(username).await?)
    }

    pub async fn count_by_email(&self, email: &str) -> DomainResult<u64> {
        Ok(self.users.count_by_email(email).await?)
    }

    /// Admin-created account with the `USER` role
    pub async fn create(&self, registration: Registration) -> DomainResult<UserProfile> {
        let profile = self.accounts.create_account(registration, Role::User).await?;
        info!(user_id = %profile.id, "User created by admin");
        Ok(profile)
    }

    /// Deletes a user together with their tasks
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if !self.users.delete(id).await? {
            return Err(user_not_found(id));
        }

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    pub async fn delete_by_email(&self, email: &str) -> DomainResult<()> {
        if !self.users.delete_by_email(email).await? {
            return Err(email_not_found(email));
        }

        info!(email = %email, "User deleted");
        Ok(())
    }

    /// Sets a user's role; effective from that user's next request
    pub async fn assign_role(&self, id: Uuid, role: Role) -> DomainResult<UserProfile> {
        let user = self
            .users
            .set_role(id, role)
            .await?
            .ok_or_else(|| user_not_found(id))?;

        info!(user_id = %id, role = %role, "Role assigned");
        Ok(user.profile())
    }

    /// Creates the initial administrator unless the email is already taken
    ///
    /// Returns `None` when an account with that email exists; running it on
    /// every startup is safe.
    pub async fn bootstrap_admin(&self, registration: Registration) -> DomainResult<Option<UserProfile>> {
        if self.users.find_by_email(&registration.email).await?.is_some() {
            info!(email = %registration.email, "Admin account already present");
            return Ok(None);
        }

        match self.accounts.create_account(registration, Role::Admin).await {
            Ok(profile) => {
                info!(user_id = %profile.id, email = %profile.email, "Admin account created");
                Ok(Some(profile))
            }
            // Another instance created it first
            Err(DomainError::AlreadyExists(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
