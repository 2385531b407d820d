/// PostgreSQL task store
///
/// `owner_id` is a foreign key into `users`; writes naming a missing owner
/// fail in the database and surface as [`StoreError::UnknownOwner`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewTask, Task, TaskStatus, UpdateTask};
use crate::store::{StoreError, StoreResult, TaskStore};

const TASK_COLUMNS: &str = "id, title, description, status, owner_id, created_at, updated_at";

fn map_owner_violation(err: sqlx::Error, owner_id: Option<Uuid>) -> StoreError {
    match (&err, owner_id) {
        (sqlx::Error::Database(db), Some(owner_id)) if db.is_foreign_key_violation() => {
            StoreError::UnknownOwner(owner_id)
        }
        _ => StoreError::Database(err),
    }
}

#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, query: &str, bind: Option<String>) -> StoreResult<Vec<Task>> {
        let mut q = sqlx::query_as::<_, Task>(query);
        if let Some(value) = bind {
            q = q.bind(value);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, task: NewTask) -> StoreResult<Task> {
        let query = format!(
            r#"
            INSERT INTO tasks (id, title, description, status, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(Uuid::new_v4())
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.as_str())
            .bind(task.owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_owner_violation(e, task.owner_id))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let query = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        Ok(sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Task>> {
        let query = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
            TASK_COLUMNS
        );

        Ok(sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self) -> StoreResult<Vec<Task>> {
        let query = format!("SELECT {} FROM tasks ORDER BY created_at ASC, id ASC", TASK_COLUMNS);
        self.fetch_many(&query, None).await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        let query = format!(
            "SELECT {} FROM tasks WHERE owner_id = $1 ORDER BY created_at ASC, id ASC",
            TASK_COLUMNS
        );

        Ok(sqlx::query_as::<_, Task>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update(&self, id: Uuid, update: UpdateTask) -> StoreResult<Option<Task>> {
        let query = format!(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                status = $4,
                owner_id = COALESCE($5, owner_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.status.as_str())
            .bind(update.owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_owner_violation(e, update.owner_id))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>> {
        let query = format!(
            "SELECT {} FROM tasks WHERE status = $1 ORDER BY created_at ASC, id ASC",
            TASK_COLUMNS
        );
        self.fetch_many(&query, Some(status.as_str().to_string())).await
    }

    async fn exists_by_title(&self, title: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tasks WHERE title = $1)")
            .bind(title)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn find_by_title(&self, title: &str) -> StoreResult<Vec<Task>> {
        let query = format!(
            "SELECT {} FROM tasks WHERE title = $1 ORDER BY created_at ASC, id ASC",
            TASK_COLUMNS
        );
        self.fetch_many(&query, Some(title.to_string())).await
    }

    async fn delete_by_status(&self, status: TaskStatus) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE status = $1")
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
