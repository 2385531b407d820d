/// PostgreSQL storage backend
///
/// # Modules
///
/// - `pool`: connection pool management with health checks
/// - `migrations`: embedded schema migrations
/// - `users` / `tasks`: [`crate::store`] trait implementations over sqlx
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todolist_shared::db::{create_pool, run_migrations, DatabaseConfig, PgTaskStore, PgUserStore};
/// use todolist_shared::store::{TaskStore, UserStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///     run_migrations(&pool).await?;
///
///     let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
///     let tasks: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool));
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod tasks;
pub mod users;

pub use migrations::run_migrations;
pub use pool::{close_pool, create_pool, health_check, DatabaseConfig};
pub use tasks::PgTaskStore;
pub use users::PgUserStore;
