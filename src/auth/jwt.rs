use crate::types::{AppError, Principal, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Claims carried by every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's email
    pub sub: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Structural token failures. These never leave the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token expired")]
    Expired,
}

/// Issues and verifies HS256 bearer tokens.
///
/// The signing secret is fixed for the lifetime of the service; build one at
/// startup and share it behind an `Arc`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    /// Creates a new TokenService.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing secret (should be at least 32 bytes)
    /// * `ttl_secs` - Token validity in seconds
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issues a token for `principal`, valid from now for the configured TTL.
    pub fn issue(&self, principal: &Principal) -> Result<String> {
        self.issue_at(principal, Utc::now())
    }

    pub fn issue_at(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String> {
        let expires_at = Duration::try_seconds(self.ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::Internal(format!("Token TTL of {}s is out of range", self.ttl_secs))
            })?;

        let claims = Claims {
            sub: principal.subject().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry and returns the token's subject.
    pub fn subject_of(&self, token: &str) -> std::result::Result<String, TokenError> {
        self.subject_of_at(token, Utc::now())
    }

    pub fn subject_of_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<String, TokenError> {
        let claims = self.decode_claims(token)?;
        if is_expired(&claims, now) {
            return Err(TokenError::Expired);
        }
        Ok(claims.sub)
    }

    /// Returns true only if the token is authentic, unexpired and was issued
    /// for exactly `principal`'s subject.
    pub fn validate(&self, token: &str, principal: &Principal) -> bool {
        self.validate_at(token, principal, Utc::now())
    }

    pub fn validate_at(&self, token: &str, principal: &Principal, now: DateTime<Utc>) -> bool {
        match self.decode_claims(token) {
            Ok(claims) => claims.sub == principal.subject() && !is_expired(&claims, now),
            Err(_) => false,
        }
    }

    // Signature and shape only; expiry is checked against the caller's clock.
    fn decode_claims(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Malformed(e.to_string()))
    }
}

fn is_expired(claims: &Claims, now: DateTime<Utc>) -> bool {
    now.timestamp() >= claims.exp
}

/// Generates a random signing secret: 128 bytes, hex encoded.
pub fn generate_secret() -> String {
    let mut key = [0u8; 128];
    rand::rng().fill_bytes(&mut key);
    hex::encode(key)
}
