//! JWT Token Handler
//! Mission: Issue and validate signed session tokens

use crate::auth::models::{Claims, User};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Token verification failure. Covers bad signatures, malformed claims
/// and elapsed expiry uniformly - callers only learn that the token is
/// not acceptable.
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidToken;

impl std::fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid or expired token")
    }
}

impl std::error::Error for InvalidToken {}

/// JWT Handler for token operations (HS256, symmetric secret)
pub struct JwtHandler {
    secret: String,
    ttl_secs: u64,
}

impl JwtHandler {
    /// Create a new JWT handler with the process signing secret.
    pub fn new(secret: String, ttl_secs: u64) -> Self {
        Self { secret, ttl_secs }
    }

    /// Issue a token for a user, returning the token and its lifetime
    /// in seconds.
    pub fn issue(&self, user: &User) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::seconds(self.ttl_secs as i64))
            .context("Invalid expiry timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp() as usize,
            exp: expiration,
        };

        debug!(
            "Issuing JWT for user {} ({}), ttl {}s",
            user.username, user.id, self.ttl_secs
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign JWT")?;

        Ok((token, self.ttl_secs as usize))
    }

    /// Validate a token and extract its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| InvalidToken)?;

        debug!("Validated JWT for user {}", decoded.claims.username);

        Ok(decoded.claims)
    }
}
