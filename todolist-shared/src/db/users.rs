/// PostgreSQL credential store
///
/// Email uniqueness is the `users_email_key` unique index; a violation comes
/// back from the database and is reported as [`StoreError::EmailTaken`], which
/// makes concurrent registrations with the same email safe without any
/// application-level locking.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewUser, Role, UpdateUser, User};
use crate::store::{StoreError, StoreResult, UserStore};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

/// Maps a unique-index violation on `email` to `EmailTaken`
fn map_email_conflict(err: sqlx::Error, email: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::EmailTaken(email.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let query = format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_email_conflict(e, &user.email))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let query = format!("SELECT {} FROM users ORDER BY created_at ASC, id ASC", USER_COLUMNS);

        Ok(sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_profile(&self, id: Uuid, update: UpdateUser) -> StoreResult<Option<User>> {
        let query = format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let email = update.email.clone().unwrap_or_default();
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(update.username)
            .bind(update.email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_email_conflict(e, &email))
    }

    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        let query = format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        // tasks.owner_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_email(&self, email: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn count_by_email(&self, email: &str) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}
