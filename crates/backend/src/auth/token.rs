//! HS256 session tokens.
//!
//! A token is a signed JWT carrying [`Claims`]. The provider keeps only the
//! SHA-256 digest of each live token, so revocation works without retaining
//! the token itself.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: String,
    pub email: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token id, so two tokens issued in the same second still differ.
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC-SHA256 signing secret.
    pub secret: String,
    /// Token lifetime in minutes.
    pub ttl_mins: i64,
}

/// Issue a signed token for `uid`.
pub fn issue_token(
    uid: &str,
    email: Option<&str>,
    config: &TokenConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: uid.to_string(),
        email: email.map(str::to_string),
        exp: now + config.ttl_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check the signature and expiry of a token and return its claims.
pub fn validate_token(
    token: &str,
    config: &TokenConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(data.claims)
}

/// SHA-256 hex digest of a token, the form in which live sessions are kept.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
