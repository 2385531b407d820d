/// Domain models
///
/// - `user`: user accounts, roles and the public user projection
/// - `task`: tasks and their status
///
/// Models are plain data; persistence lives behind the traits in
/// [`crate::store`].

pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskStatus, UpdateTask};
pub use user::{NewUser, Role, UpdateUser, User, UserProfile};
