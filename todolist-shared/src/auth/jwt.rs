/// JWT token issuance and validation
///
/// Tokens are stateless, self-contained credentials: the subject is the
/// user's email and the expiry travels inside the token, so validation needs
/// no lookup.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: fixed TTL per service (default 24 hours), zero leeway
/// - **Validation**: signature, issuer, not-before and expiry
/// - **Secret rotation**: a service built with a new secret rejects every
///   token signed with the old one
///
/// Callers only ever learn that a token is invalid; the concrete cause is
/// logged at debug level.
///
/// # Example
///
/// ```
/// use todolist_shared::auth::jwt::TokenService;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes!");
/// let token = tokens.issue("alice@x.com")?;
/// assert_eq!(tokens.validate(&token)?, "alice@x.com");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer claim stamped on every token
pub const ISSUER: &str = "todolist";

/// Default token lifetime in hours
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token is malformed, forged, expired or signed with another secret
    #[error("Invalid or expired token")]
    Invalid,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user email
    pub sub: String,

    /// Issuer - always "todolist"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for `subject` that expire `expires_in` from now
    pub fn with_expiration(subject: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: subject.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Issues and validates tokens over one process-wide secret
///
/// The keys are derived once at construction and never change afterwards.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a service with the default 24 hour TTL
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// Creates a service with a custom TTL
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `subject` valid for the configured TTL
    ///
    /// # Errors
    ///
    /// Returns `TokenError::CreateError` if encoding fails
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.sign(&Claims::with_expiration(subject, self.ttl))
    }

    /// Signs arbitrary claims with this service's secret
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Validates a token and returns its subject
    ///
    /// Verifies:
    /// - Signature matches the current secret
    /// - Issuer is "todolist"
    /// - `nbf <= now < exp`, with no leeway
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for every failure
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "Token rejected");
            TokenError::Invalid
        })?;

        // jsonwebtoken accepts exp == now; expiry is exclusive here
        if token_data.claims.is_expired() {
            tracing::debug!(sub = %token_data.claims.sub, "Token rejected at expiry boundary");
            return Err(TokenError::Invalid);
        }

        Ok(token_data.claims.sub)
    }
}
