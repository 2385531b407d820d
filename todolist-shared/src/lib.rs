//! # Todolist Shared Library
//!
//! Domain core of the todolist backend: everything except HTTP.
//!
//! ## Module Organization
//!
//! - `models`: users, tasks and their public projections
//! - `auth`: password hashing, tokens, identity resolution, access rules
//! - `store`: storage traits and the in-memory backend
//! - `db`: PostgreSQL backend, pool and migrations
//! - `services`: registration/login, task and user operations
//! - `error`: domain error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{DomainError, DomainResult};

/// Current version of the todolist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
