/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: token issuance and validation
/// - [`middleware`]: per-request identity resolution
/// - [`authorization`]: owner/admin access rules
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, 64 MB memory, 3 iterations by default
/// - **Tokens**: HS256, fixed TTL, subject is the user's email
/// - **Uniform failures**: one message for every bad login and one for every
///   bad token
///
/// # Example
///
/// ```no_run
/// use todolist_shared::auth::jwt::TokenService;
/// use todolist_shared::auth::password::PasswordHasher;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::default();
/// let hash = hasher.hash("user_password")?;
/// assert!(hasher.verify("user_password", &hash));
///
/// let tokens = TokenService::new("secret-key-at-least-32-bytes-long!!");
/// let token = tokens.issue("alice@x.com")?;
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod jwt;
pub mod middleware;
pub mod authorization;
