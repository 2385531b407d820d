/// Storage traits for users and tasks
///
/// The domain services only ever talk to `dyn UserStore` / `dyn TaskStore`.
/// Two backends implement both traits:
///
/// - [`crate::db`]: PostgreSQL through sqlx (`PgUserStore`, `PgTaskStore`)
/// - [`memory`]: an in-process store for development and tests
///
/// # Storage-level invariants
///
/// Each backend must guarantee, atomically and without help from callers:
///
/// - Email uniqueness: a second `create` (or a profile update) with a taken
///   email fails with [`StoreError::EmailTaken`]
/// - Delete cascade: deleting a user removes all of their tasks
/// - Owner integrity: a task can only reference an existing user
///   ([`StoreError::UnknownOwner`])

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewTask, NewUser, Role, Task, TaskStatus, UpdateTask, UpdateUser, User};

pub use memory::MemoryStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique email constraint violated
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Task references a user that does not exist
    #[error("Unknown owner: {0}")]
    UnknownOwner(Uuid),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user; fails with `EmailTaken` if the email is in use
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// All users, oldest first
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Applies the `Some` fields of `update`; `None` if the user is gone
    async fn update_profile(&self, id: Uuid, update: UpdateUser) -> StoreResult<Option<User>>;

    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>>;

    /// Deletes the user and their tasks; returns whether a user was removed
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    async fn delete_by_email(&self, email: &str) -> StoreResult<bool>;

    async fn exists_by_username(&self, username: &str) -> StoreResult<bool>;

    async fn count_by_email(&self, email: &str) -> StoreResult<u64>;
}

/// Task store
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a new task; fails with `UnknownOwner` for a dangling owner
    async fn create(&self, task: NewTask) -> StoreResult<Task>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Finds a task only if `owner_id` owns it
    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Task>>;

    /// All tasks, oldest first
    async fn list(&self) -> StoreResult<Vec<Task>>;

    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Replaces the editable fields; `None` if the task is gone
    async fn update(&self, id: Uuid, update: UpdateTask) -> StoreResult<Option<Task>>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>>;

    async fn exists_by_title(&self, title: &str) -> StoreResult<bool>;

    async fn count_by_owner(&self, owner_id: Uuid) -> StoreResult<u64>;

    /// Tasks with exactly this title, oldest first
    async fn find_by_title(&self, title: &str) -> StoreResult<Vec<Task>>;

    /// Deletes every task with `status`; returns how many were removed
    async fn delete_by_status(&self, status: TaskStatus) -> StoreResult<u64>;
}
