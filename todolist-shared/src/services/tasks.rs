/// Task operations
///
/// User-scoped operations take the caller explicitly and only ever see the
/// caller's own tasks, whatever their role: a task owned by someone else
/// produces the same `NotFound` as a missing id. Admin operations are
/// unscoped; the HTTP layer gates them on the `ADMIN` role.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::middleware::CurrentUser;
use crate::error::{DomainError, DomainResult};
use crate::models::{NewTask, Task, TaskStatus, UpdateTask};
use crate::store::TaskStore;

use super::TITLE_MAX_LEN;

/// Editable fields of a task
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl TaskDraft {
    fn check(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Title must not be blank".to_string()));
        }
        if self.title.chars().count() > TITLE_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Title must be at most {} characters",
                TITLE_MAX_LEN
            )));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::Validation("Description must not be blank".to_string()));
        }
        Ok(())
    }
}

fn task_not_found(id: Uuid) -> DomainError {
    DomainError::NotFound(format!("Task not found with ID: {}", id))
}

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    // ---- user-scoped ----

    pub async fn list_own(&self, current: &CurrentUser) -> DomainResult<Vec<Task>> {
        Ok(self.tasks.list_by_owner(current.id).await?)
    }

    /// Fetches one of the caller's tasks, or `NotFound`
    pub async fn get_own(&self, current: &CurrentUser, id: Uuid) -> DomainResult<Task> {
        self.tasks
            .find_by_id_and_owner(id, current.id)
            .await?
            .ok_or_else(|| {
                debug!(task_id = %id, user_id = %current.id, "Task not found for caller");
                task_not_found(id)
            })
    }

    pub async fn create_own(&self, current: &CurrentUser, draft: TaskDraft) -> DomainResult<Task> {
        draft.check()?;

        let task = self
            .tasks
            .create(NewTask {
                title: draft.title,
                description: draft.description,
                status: draft.status,
                owner_id: Some(current.id),
            })
            .await?;

        info!(task_id = %task.id, user_id = %current.id, "Task created");
        Ok(task)
    }

    /// Replaces a task's fields; ownership is never transferred here
    pub async fn update_own(&self, current: &CurrentUser, id: Uuid, draft: TaskDraft) -> DomainResult<Task> {
        draft.check()?;
        self.get_own(current, id).await?;

        self.tasks
            .update(
                id,
                UpdateTask {
                    title: draft.title,
                    description: draft.description,
                    status: draft.status,
                    owner_id: None,
                },
            )
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    pub async fn delete_own(&self, current: &CurrentUser, id: Uuid) -> DomainResult<()> {
        self.get_own(current, id).await?;
        self.delete(id).await
    }

    // ---- admin ----

    pub async fn list_all(&self) -> DomainResult<Vec<Task>> {
        Ok(self.tasks.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Task> {
        self.tasks.find_by_id(id).await?.ok_or_else(|| task_not_found(id))
    }

    /// Creates a task, optionally assigned to an existing user
    pub async fn create(&self, draft: TaskDraft, owner_id: Option<Uuid>) -> DomainResult<Task> {
        draft.check()?;

        let task = self
            .tasks
            .create(NewTask {
                title: draft.title,
                description: draft.description,
                status: draft.status,
                owner_id,
            })
            .await?;

        info!(task_id = %task.id, owner_id = ?task.owner_id, "Task created by admin");
        Ok(task)
    }

    /// Replaces a task's fields; `owner_id: Some(_)` reassigns it
    pub async fn update(&self, id: Uuid, draft: TaskDraft, owner_id: Option<Uuid>) -> DomainResult<Task> {
        draft.check()?;

        self.tasks
            .update(
                id,
                UpdateTask {
                    title: draft.title,
                    description: draft.description,
                    status: draft.status,
                    owner_id,
                },
            )
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if self.tasks.delete(id).await? {
            info!(task_id = %id, "Task deleted");
            Ok(())
        } else {
            Err(task_not_found(id))
        }
    }

    pub async fn list_by_status(&self, status: TaskStatus) -> DomainResult<Vec<Task>> {
        Ok(self.tasks.list_by_status(status).await?)
    }

    pub async fn exists_by_title(&self, title: &str) -> DomainResult<bool> {
        Ok(self.tasks.exists_by_title(title).await?)
    }

    pub async fn count_by_owner(&self, owner_id: Uuid) -> DomainResult<u64> {
        Ok(self.tasks.count_by_owner(owner_id).await?)
    }

    /// Tasks with exactly `title`, oldest first
    pub async fn filter_by_title(&self, title: &str) -> DomainResult<Vec<Task>> {
        Ok(self.tasks.find_by_title(title).await?)
    }

    /// Deletes every task with `status`; `NotFound` if there were none
    pub async fn delete_by_status(&self, status: TaskStatus) -> DomainResult<u64> {
        let removed = self.tasks.delete_by_status(status).await?;
        if removed == 0 {
            return Err(DomainError::NotFound(format!(
                "No tasks found with status: {}",
                status
            )));
        }

        info!(status = %status, removed, "Tasks deleted by status");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role};
    use crate::store::{MemoryStore, UserStore};

    struct Fixture {
        tasks: TaskService,
        alice: CurrentUser,
        bob: CurrentUser,
        admin: CurrentUser,
    }

    async fn user(store: &MemoryStore, name: &str, role: Role) -> CurrentUser {
        UserStore::create(
            store,
            NewUser {
                username: name.to_string(),
                email: format!("{}@x.com", name),
                password_hash: "hash".to_string(),
                role,
            },
        )
        .await
        .unwrap()
        .into()
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        Fixture {
            alice: user(&store, "alice", Role::User).await,
            bob: user(&store, "bob", Role::User).await,
            admin: user(&store, "admin", Role::Admin).await,
            tasks: TaskService::new(Arc::new(store)),
        }
    }

    fn draft(title: &str, status: TaskStatus) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: "2%".to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn test_create_own_sets_owner() {
        let f = fixture().await;
        let task = f.tasks.create_own(&f.alice, draft("Buy milk", TaskStatus::Pending)).await.unwrap();

        assert_eq!(task.owner_id, Some(f.alice.id));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(f.tasks.list_own(&f.alice).await.unwrap().len(), 1);
        assert!(f.tasks.list_own(&f.bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_owner_sees_not_found() {
        let f = fixture().await;
        let task = f.tasks.create_own(&f.alice, draft("Buy milk", TaskStatus::Pending)).await.unwrap();

        let missing = f.tasks.get_own(&f.bob, Uuid::new_v4()).await.unwrap_err();
        let hidden = f.tasks.get_own(&f.bob, task.id).await.unwrap_err();
        assert!(matches!(hidden, DomainError::NotFound(_)));
        assert!(matches!(missing, DomainError::NotFound(_)));

        let err = f
            .tasks
            .update_own(&f.bob, task.id, draft("Hijacked", TaskStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = f.tasks.delete_own(&f.bob, task.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        // Untouched
        let task = f.tasks.get_own(&f.alice, task.id).await.unwrap();
        assert_eq!(task.title, "Buy milk");
    }

    #[tokio::test]
    async fn test_admin_reaches_any_task_only_unscoped() {
        let f = fixture().await;
        let task = f.tasks.create_own(&f.alice, draft("Buy milk", TaskStatus::Pending)).await.unwrap();

        // The caller-scoped operations stay scoped for admins too
        assert!(matches!(f.tasks.get_own(&f.admin, task.id).await, Err(DomainError::NotFound(_))));
        assert!(matches!(
            f.tasks
                .update_own(&f.admin, task.id, draft("Hijacked", TaskStatus::Completed))
                .await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(f.tasks.delete_own(&f.admin, task.id).await, Err(DomainError::NotFound(_))));

        assert_eq!(f.tasks.get(task.id).await.unwrap().title, "Buy milk");
        let updated = f
            .tasks
            .update(task.id, draft("Buy oat milk", TaskStatus::InProgress), None)
            .await
            .unwrap();
        assert_eq!(updated.owner_id, Some(f.alice.id));
        f.tasks.delete(task.id).await.unwrap();
        assert!(matches!(f.tasks.get(task.id).await, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_owner_updates_and_deletes() {
        let f = fixture().await;
        let task = f.tasks.create_own(&f.alice, draft("Buy milk", TaskStatus::Pending)).await.unwrap();

        let updated = f
            .tasks
            .update_own(&f.alice, task.id, draft("Buy milk", TaskStatus::Completed))
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);

        f.tasks.delete_own(&f.alice, task.id).await.unwrap();
        assert!(f.tasks.list_own(&f.alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_drafts_rejected() {
        let f = fixture().await;
        let err = f.tasks.create_own(&f.alice, draft("  ", TaskStatus::Pending)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let long = "t".repeat(256);
        let err = f.tasks.create(draft(&long, TaskStatus::Pending), None).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("255")));

        let widest = "é".repeat(255);
        assert_eq!(f.tasks.create_own(&f.alice, draft(&widest, TaskStatus::Pending)).await.unwrap().title, widest);
    }

    #[tokio::test]
    async fn test_admin_create_with_unknown_owner() {
        let f = fixture().await;
        let err = f
            .tasks
            .create(draft("Orphan", TaskStatus::Pending), Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref m) if m.starts_with("User not found by ID")));

        let unowned = f.tasks.create(draft("Shared", TaskStatus::Pending), None).await.unwrap();
        assert!(unowned.owner_id.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_status() {
        let f = fixture().await;
        f.tasks.create_own(&f.alice, draft("a", TaskStatus::Pending)).await.unwrap();
        f.tasks.create_own(&f.bob, draft("b", TaskStatus::Pending)).await.unwrap();
        f.tasks.create_own(&f.bob, draft("c", TaskStatus::Completed)).await.unwrap();

        assert_eq!(f.tasks.delete_by_status(TaskStatus::Pending).await.unwrap(), 2);

        let err = f.tasks.delete_by_status(TaskStatus::Pending).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref m) if m == "No tasks found with status: PENDING"));
        assert_eq!(f.tasks.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_queries() {
        let f = fixture().await;
        f.tasks.create_own(&f.alice, draft("Same", TaskStatus::Pending)).await.unwrap();
        f.tasks.create_own(&f.bob, draft("Same", TaskStatus::InProgress)).await.unwrap();

        assert!(f.tasks.exists_by_title("Same").await.unwrap());
        assert!(!f.tasks.exists_by_title("Other").await.unwrap());
        assert_eq!(f.tasks.count_by_owner(f.bob.id).await.unwrap(), 1);
        assert_eq!(f.tasks.filter_by_title("Same").await.unwrap().len(), 2);
        assert_eq!(f.tasks.list_by_status(TaskStatus::InProgress).await.unwrap().len(), 1);
    }
}
