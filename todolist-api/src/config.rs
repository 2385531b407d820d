/// Configuration management for the API server
///
/// Configuration comes from environment variables (a `.env` file is loaded
/// first when present).
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string; unset means in-memory storage
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Token signing secret, at least 32 characters (required)
/// - `JWT_TTL_HOURS`: Token lifetime, 1 to 8784 (default: 24)
/// - `PASSWORD_MEMORY_KIB` / `PASSWORD_ITERATIONS` / `PASSWORD_LANES`:
///   Argon2id cost (default: 65536 / 3 / 4)
/// - `ADMIN_EMAIL` / `ADMIN_PASSWORD` / `ADMIN_USERNAME`: initial administrator
///   (created at startup when email and password are both set)
/// - `LOG_FORMAT`: `json` for JSON logs, anything else for text
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use todolist_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use todolist_shared::{
    auth::password::HashParams,
    services::{USERNAME_MAX_LEN, USERNAME_MIN_LEN},
};

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime (one year)
pub const MAX_JWT_TTL_HOURS: i64 = 24 * 366;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration; `None` selects the in-memory store
    pub database: Option<DatabaseConfig>,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Password hashing cost
    pub password: PasswordConfig,

    /// Initial administrator account
    pub admin: Option<AdminConfig>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in hours
    pub ttl_hours: i64,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub lanes: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let params = HashParams::default();
        Self {
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            lanes: params.lanes,
        }
    }
}

impl From<PasswordConfig> for HashParams {
    fn from(config: PasswordConfig) -> Self {
        HashParams {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            lanes: config.lanes,
        }
    }
}

/// Initial administrator account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Reads an optional variable, falling back to `default`, and parses it
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - A numeric variable does not parse
    /// - `JWT_TTL_HOURS` is outside 1..=8784
    /// - `ADMIN_USERNAME` does not fit the username column
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = parse_or(&lookup, "API_PORT", 8080u16)?;
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?,
            }),
            None => None,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LEN);
        }

        let ttl_hours = parse_or(&lookup, "JWT_TTL_HOURS", 24i64)?;
        if !(1..=MAX_JWT_TTL_HOURS).contains(&ttl_hours) {
            anyhow::bail!("JWT_TTL_HOURS must be between 1 and {}", MAX_JWT_TTL_HOURS);
        }

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: parse_or(&lookup, "PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "PASSWORD_ITERATIONS", defaults.iterations)?,
            lanes: parse_or(&lookup, "PASSWORD_LANES", defaults.lanes)?,
        };

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => {
                let username = lookup("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string());
                let len = username.chars().count();
                if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
                    anyhow::bail!(
                        "ADMIN_USERNAME must be between {} and {} characters",
                        USERNAME_MIN_LEN,
                        USERNAME_MAX_LEN
                    );
                }
                Some(AdminConfig {
                    username,
                    email,
                    password,
                })
            }
            _ => None,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database,
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_hours,
            },
            password,
            admin,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn cors_allows_any(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.cors_allows_any());
        assert!(config.database.is_none());
        assert_eq!(config.jwt.ttl_hours, 24);
        assert_eq!(config.password.memory_kib, 65536);
        assert_eq!(config.password.iterations, 3);
        assert_eq!(config.password.lanes, 4);
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_jwt_secret_required() {
        assert!(load(&[]).is_err());

        let err = load(&[("JWT_SECRET", "short")]).unwrap_err();
        assert!(err.to_string().contains("at least 32 characters"));
    }

    #[test]
    fn test_full_configuration() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("DATABASE_URL", "postgresql://localhost/todolist"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("JWT_TTL_HOURS", "2"),
            ("PASSWORD_MEMORY_KIB", "4096"),
            ("ADMIN_EMAIL", "root@x.com"),
            ("ADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(!config.cors_allows_any());

        let database = config.database.unwrap();
        assert_eq!(database.url, "postgresql://localhost/todolist");
        assert_eq!(database.max_connections, 4);

        assert_eq!(config.jwt.ttl_hours, 2);
        assert_eq!(config.password.memory_kib, 4096);

        let admin = config.admin.unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.email, "root@x.com");
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let err = load(&[("JWT_SECRET", SECRET), ("API_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("API_PORT"));

        assert!(load(&[("JWT_SECRET", SECRET), ("JWT_TTL_HOURS", "0")]).is_err());
    }

    #[test]
    fn test_ttl_upper_bound() {
        let err = load(&[("JWT_SECRET", SECRET), ("JWT_TTL_HOURS", "9999999999999")]).unwrap_err();
        assert!(err.to_string().contains("JWT_TTL_HOURS"));

        let config = load(&[("JWT_SECRET", SECRET), ("JWT_TTL_HOURS", "8784")]).unwrap();
        assert_eq!(config.jwt.ttl_hours, MAX_JWT_TTL_HOURS);

        // The accepted maximum must build a token service without panicking
        crate::app::AppState::in_memory(config);
    }

    #[test]
    fn test_admin_username_length() {
        let long = "a".repeat(21);
        let err = load(&[
            ("JWT_SECRET", SECRET),
            ("ADMIN_EMAIL", "root@x.com"),
            ("ADMIN_PASSWORD", "changeme"),
            ("ADMIN_USERNAME", long.as_str()),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("ADMIN_USERNAME"));

        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("ADMIN_EMAIL", "root@x.com"),
            ("ADMIN_PASSWORD", "changeme"),
            ("ADMIN_USERNAME", "a".repeat(20).as_str()),
        ])
        .unwrap();
        assert_eq!(config.admin.unwrap().username.len(), 20);
    }

    #[test]
    fn test_admin_requires_email_and_password() {
        let config = load(&[("JWT_SECRET", SECRET), ("ADMIN_EMAIL", "root@x.com")]).unwrap();
        assert!(config.admin.is_none());
    }
}
