/// Administrator endpoints
///
/// Mounted under `/admin`. The admin gate in [`crate::app`] has already
/// rejected non-admin callers with `403` before any handler here runs, so
/// handlers do not re-check the role.
///
/// - `tasks`: `/admin/tasks/...`
/// - `users`: `/admin/users/...`

pub mod tasks;
pub mod users;
