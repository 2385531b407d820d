/// Authorization policy
///
/// [`require_admin`] gates every `/admin` route and surfaces as
/// `403 Forbidden`. Ownership is not a policy check here: user-facing task
/// routes only ever look up tasks filtered by the caller's id, so a task
/// owned by someone else is indistinguishable from a missing one, for
/// administrators too. Administrators reach other users' tasks through the
/// admin routes.
///
/// # Example
///
/// ```
/// use todolist_shared::auth::authorization::require_admin;
/// use todolist_shared::auth::middleware::CurrentUser;
/// use todolist_shared::models::Role;
/// use uuid::Uuid;
///
/// let alice = CurrentUser {
///     id: Uuid::new_v4(),
///     username: "alice".into(),
///     email: "alice@x.com".into(),
///     role: Role::User,
/// };
///
/// assert!(require_admin(&alice).is_err());
/// ```

use super::middleware::CurrentUser;

/// Error type for authorization checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is not an administrator
    #[error("Access denied: administrator role required")]
    AdminRequired,
}

/// Allows the request iff the caller is an administrator
pub fn require_admin(current: &CurrentUser) -> Result<(), AuthzError> {
    if current.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}
