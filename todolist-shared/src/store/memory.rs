/// In-process storage backend
///
/// Users and tasks live behind a single `tokio::sync::RwLock`, so every
/// multi-step invariant (check-then-insert on email, user delete cascading to
/// tasks, owner existence on task writes) happens under one write guard.
/// Records are kept in insertion order, which doubles as "oldest first".
///
/// Used when no `DATABASE_URL` is configured and by the test suites.
///
/// # Example
///
/// ```
/// use todolist_shared::models::{NewUser, Role};
/// use todolist_shared::store::{MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store
///     .create(NewUser {
///         username: "alice".into(),
///         email: "alice@x.com".into(),
///         password_hash: "$argon2id$...".into(),
///         role: Role::User,
///     })
///     .await?;
/// assert!(store.find_by_email("alice@x.com").await?.is_some());
/// # let _ = user;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{NewTask, NewUser, Role, Task, TaskStatus, UpdateTask, UpdateUser, User};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    tasks: Vec<Task>,
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn remove_user_at(&mut self, index: usize) {
        let user = self.users.remove(index);
        let before = self.tasks.len();
        self.tasks.retain(|t| t.owner_id != Some(user.id));
        tracing::debug!(
            user_id = %user.id,
            tasks_removed = before - self.tasks.len(),
            "Removed user and owned tasks"
        );
    }
}

/// Shared in-memory store implementing both [`UserStore`] and [`TaskStore`]
///
/// Cloning is cheap and every clone sees the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        if inner.email_taken(&user.email, None) {
            return Err(StoreError::EmailTaken(user.email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn update_profile(&self, id: Uuid, update: UpdateUser) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;

        if let Some(email) = &update.email {
            if inner.email_taken(email, Some(id)) {
                return Err(StoreError::EmailTaken(email.clone()));
            }
        }

        let Some(user) = inner.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;

        Ok(inner.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;

        match inner.users.iter().position(|u| u.id == id) {
            Some(index) => {
                inner.remove_user_at(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_email(&self, email: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;

        match inner.users.iter().position(|u| u.email == email) {
            Some(index) => {
                inner.remove_user_at(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().any(|u| u.username == username))
    }

    async fn count_by_email(&self, email: &str) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().filter(|u| u.email == email).count() as u64)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, task: NewTask) -> StoreResult<Task> {
        let mut inner = self.inner.write().await;

        if let Some(owner_id) = task.owner_id {
            if !inner.user_exists(owner_id) {
                return Err(StoreError::UnknownOwner(owner_id));
            }
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            status: task.status,
            owner_id: task.owner_id,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.push(task.clone());

        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .iter()
            .find(|t| t.id == id && t.is_owned_by(owner_id))
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Task>> {
        Ok(self.inner.read().await.tasks.clone())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .iter()
            .filter(|t| t.is_owned_by(owner_id))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, update: UpdateTask) -> StoreResult<Option<Task>> {
        let mut inner = self.inner.write().await;

        if let Some(owner_id) = update.owner_id {
            if !inner.user_exists(owner_id) {
                return Err(StoreError::UnknownOwner(owner_id));
            }
        }

        let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        task.title = update.title;
        task.description = update.description;
        task.status = update.status;
        if update.owner_id.is_some() {
            task.owner_id = update.owner_id;
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != id);
        Ok(inner.tasks.len() < before)
    }

    async fn list_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .iter()
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }

    async fn exists_by_title(&self, title: &str) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.iter().any(|t| t.title == title))
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.iter().filter(|t| t.is_owned_by(owner_id)).count() as u64)
    }

    async fn find_by_title(&self, title: &str) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .iter()
            .filter(|t| t.title == title)
            .cloned()
            .collect())
    }

    async fn delete_by_status(&self, status: TaskStatus) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.status != status);
        Ok((before - inner.tasks.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
            role: Role::User,
        }
    }

    fn new_task(title: &str, status: TaskStatus, owner_id: Option<Uuid>) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: "description".to_string(),
            status,
            owner_id,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryStore::new();
        let user = UserStore::create(&store, new_user("alice", "alice@x.com")).await.unwrap();

        assert_eq!(user.role, Role::User);
        let by_email = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        let by_id = UserStore::find_by_id(&store, user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "alice@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        UserStore::create(&store, new_user("alice", "alice@x.com")).await.unwrap();

        let err = UserStore::create(&store, new_user("alice2", "alice@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken(ref e) if e == "alice@x.com"));
        assert_eq!(store.count_by_email("alice@x.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registration_keeps_email_unique() {
        let store = MemoryStore::new();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    UserStore::create(&store, new_user(&format!("user{}", i), "same@x.com")).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.count_by_email("same@x.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_email() {
        let store = MemoryStore::new();
        let alice = UserStore::create(&store, new_user("alice", "alice@x.com")).await.unwrap();
        UserStore::create(&store, new_user("bob", "bob@x.com")).await.unwrap();

        let err = store
            .update_profile(
                alice.id,
                UpdateUser {
                    email: Some("bob@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken(_)));

        // Keeping one's own email is not a conflict
        let updated = store
            .update_profile(
                alice.id,
                UpdateUser {
                    username: Some("alicia".to_string()),
                    email: Some("alice@x.com".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.username, "alicia");
    }

    #[tokio::test]
    async fn test_set_role() {
        let store = MemoryStore::new();
        let user = UserStore::create(&store, new_user("alice", "alice@x.com")).await.unwrap();

        let updated = store.set_role(user.id, Role::Admin).await.unwrap().unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert!(store.set_role(Uuid::new_v4(), Role::Admin).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user_cascades_tasks() {
        let store = MemoryStore::new();
        let alice = UserStore::create(&store, new_user("alice", "alice@x.com")).await.unwrap();
        let bob = UserStore::create(&store, new_user("bob", "bob@x.com")).await.unwrap();

        TaskStore::create(&store, new_task("a1", TaskStatus::Pending, Some(alice.id))).await.unwrap();
        TaskStore::create(&store, new_task("a2", TaskStatus::Completed, Some(alice.id))).await.unwrap();
        TaskStore::create(&store, new_task("b1", TaskStatus::Pending, Some(bob.id))).await.unwrap();

        assert!(UserStore::delete(&store, alice.id).await.unwrap());
        assert!(!UserStore::delete(&store, alice.id).await.unwrap());

        let remaining = TaskStore::list(&store).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "b1");
    }

    #[tokio::test]
    async fn test_delete_by_email() {
        let store = MemoryStore::new();
        UserStore::create(&store, new_user("alice", "alice@x.com")).await.unwrap();

        assert!(store.delete_by_email("alice@x.com").await.unwrap());
        assert!(!store.delete_by_email("alice@x.com").await.unwrap());
        assert!(!store.exists_by_username("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_task_requires_existing_owner() {
        let store = MemoryStore::new();
        let ghost = Uuid::new_v4();

        let err = TaskStore::create(&store, new_task("t", TaskStatus::Pending, Some(ghost)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownOwner(id) if id == ghost));

        // Unowned tasks are allowed
        TaskStore::create(&store, new_task("t", TaskStatus::Pending, None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_id_and_owner() {
        let store = MemoryStore::new();
        let alice = UserStore::create(&store, new_user("alice", "alice@x.com")).await.unwrap();
        let bob = UserStore::create(&store, new_user("bob", "bob@x.com")).await.unwrap();
        let task = TaskStore::create(&store, new_task("t", TaskStatus::Pending, Some(alice.id)))
            .await
            .unwrap();

        assert!(store.find_by_id_and_owner(task.id, alice.id).await.unwrap().is_some());
        assert!(store.find_by_id_and_owner(task.id, bob.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_task_keeps_owner_when_unset() {
        let store = MemoryStore::new();
        let alice = UserStore::create(&store, new_user("alice", "alice@x.com")).await.unwrap();
        let task = TaskStore::create(&store, new_task("t", TaskStatus::Pending, Some(alice.id)))
            .await
            .unwrap();

        let updated = TaskStore::update(
            &store,
            task.id,
            UpdateTask {
                title: "t2".to_string(),
                description: "d2".to_string(),
                status: TaskStatus::InProgress,
                owner_id: None,
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.title, "t2");
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.owner_id, Some(alice.id));
    }

    #[tokio::test]
    async fn test_status_and_title_queries() {
        let store = MemoryStore::new();
        let alice = UserStore::create(&store, new_user("alice", "alice@x.com")).await.unwrap();

        TaskStore::create(&store, new_task("Test Task 1", TaskStatus::Pending, Some(alice.id))).await.unwrap();
        TaskStore::create(&store, new_task("Test Task 2", TaskStatus::Completed, Some(alice.id))).await.unwrap();
        TaskStore::create(&store, new_task("Test Task 1", TaskStatus::Pending, None)).await.unwrap();

        assert_eq!(store.list_by_status(TaskStatus::Pending).await.unwrap().len(), 2);
        assert!(store.exists_by_title("Test Task 2").await.unwrap());
        assert!(!store.exists_by_title("Nonexistent Task").await.unwrap());
        assert_eq!(store.count_by_owner(alice.id).await.unwrap(), 2);

        let by_title = store.find_by_title("Test Task 1").await.unwrap();
        assert_eq!(by_title.len(), 2);
        assert!(by_title[0].created_at <= by_title[1].created_at);

        assert_eq!(store.delete_by_status(TaskStatus::Pending).await.unwrap(), 2);
        assert_eq!(store.delete_by_status(TaskStatus::Pending).await.unwrap(), 0);
        assert_eq!(TaskStore::list(&store).await.unwrap().len(), 1);
    }
}
