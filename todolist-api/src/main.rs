//! # Todolist API Server
//!
//! Registration, login and bearer-token protected task/user management.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p todolist-api
//! ```
//!
//! Without `DATABASE_URL` the server keeps everything in memory.

use std::env;

use todolist_api::{
    app::{build_router, AppState},
    config::Config,
};
use todolist_shared::{
    db::{self, DatabaseConfig},
    services::Registration,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "todolist_api=debug,todolist_shared=debug,tower_http=debug".into());

    let json = env::var("LOG_FORMAT").map(|f| f.eq_ignore_ascii_case("json")).unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before the filter reads RUST_LOG
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Todolist API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let bind_address = config.bind_address();
    let admin = config.admin.clone();

    let (state, pool) = match &config.database {
        Some(database) => {
            let pool = db::create_pool(DatabaseConfig {
                url: database.url.clone(),
                max_connections: database.max_connections,
                ..Default::default()
            })
            .await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Using PostgreSQL storage");

            (AppState::postgres(pool.clone(), config), Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            (AppState::in_memory(config), None)
        }
    };

    if let Some(admin) = admin {
        state
            .users
            .bootstrap_admin(Registration {
                username: admin.username,
                email: admin.email,
                password: admin.password,
            })
            .await
            .map_err(|e| anyhow::anyhow!("Admin bootstrap failed: {}", e))?;
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        db::close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
