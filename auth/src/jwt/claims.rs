use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// Claims carried inside an access token.
///
/// The whole set is signed, so none of the fields can be altered without
/// invalidating the token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Create claims for a subject expiring `ttl` from now.
    ///
    /// A zero or negative `ttl` produces claims that are already expired.
    ///
    /// # Errors
    /// * `EncodingFailed` - `now + ttl` is outside the representable range
    pub fn for_subject(subject: impl ToString, ttl: Duration) -> Result<Self, TokenError> {
        Self::issued_at(subject, Utc::now(), ttl)
    }

    /// Create claims for a subject issued at an explicit instant.
    ///
    /// # Errors
    /// * `EncodingFailed` - `now + ttl` is outside the representable range
    pub fn issued_at(
        subject: impl ToString,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            TokenError::EncodingFailed(format!("token lifetime out of range: {}", ttl))
        })?;

        Ok(Self {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        })
    }

    /// Check if the claims are expired at `current_timestamp`.
    ///
    /// Expiry is a hard boundary: claims expiring at exactly
    /// `current_timestamp` are expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}
