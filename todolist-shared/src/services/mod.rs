/// Domain services
///
/// - `auth`: registration and login
/// - `tasks`: user-scoped and admin task operations
/// - `users`: profiles, admin user management, admin bootstrap
///
/// Services hold `Arc<dyn ...Store>` handles and are cheap to clone into
/// per-request handlers.

pub mod auth;
pub mod tasks;
pub mod users;

/// Username length bounds, in characters (`users.username` is `VARCHAR(20)`)
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;

/// Longest email, in characters (`users.email` is `VARCHAR(255)`)
pub const EMAIL_MAX_LEN: usize = 255;

/// Longest task title, in characters (`tasks.title` is `VARCHAR(255)`)
pub const TITLE_MAX_LEN: usize = 255;

pub use auth::{AuthService, Registration};
pub use tasks::{TaskDraft, TaskService};
pub use users::UserService;
