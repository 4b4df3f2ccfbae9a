use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use jsonwebtoken::Algorithm;
use thiserror::Error;

use crate::password::HashScheme;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Signing keys shorter than this are accepted with a warning.
pub const RECOMMENDED_KEY_BYTES: usize = 32;

/// Upper bound on the access token lifetime (one year).
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

/// Errors raised while assembling authentication configuration.
///
/// All of them are fatal at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Signing key is missing or empty")]
    MissingSigningKey,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error(
        "Access token TTL must be between 1 and {} minutes, got {0}",
        MAX_ACCESS_TOKEN_TTL_MINUTES
    )]
    InvalidTtl(i64),

    #[error("Invalid password hashing configuration: {0}")]
    Password(#[from] PasswordError),
}

/// Opaque signing secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }
        if secret.len() < RECOMMENDED_KEY_BYTES {
            tracing::warn!(
                key_bytes = secret.len(),
                recommended = RECOMMENDED_KEY_BYTES,
                "Signing key is shorter than recommended"
            );
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Immutable authentication settings, built once at process start.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub signing_key: SigningKey,
    pub algorithm: Algorithm,
    pub access_token_ttl: Duration,
    pub password_scheme: HashScheme,
}

impl AuthConfig {
    /// Build and validate authentication settings.
    ///
    /// # Arguments
    /// * `secret` - Signing secret
    /// * `algorithm` - Algorithm name (HS256, HS384 or HS512)
    /// * `access_token_ttl_minutes` - Lifetime of tokens issued at login
    ///
    /// # Errors
    /// * `MissingSigningKey` - Secret is empty
    /// * `UnsupportedAlgorithm` - Unknown or non-HMAC algorithm
    /// * `InvalidTtl` - TTL is not positive or exceeds [`MAX_ACCESS_TOKEN_TTL_MINUTES`]
    pub fn new(
        secret: impl Into<Vec<u8>>,
        algorithm: &str,
        access_token_ttl_minutes: i64,
    ) -> Result<Self, ConfigError> {
        let signing_key = SigningKey::new(secret)?;
        let algorithm = parse_algorithm(algorithm)?;

        let access_token_ttl = Some(access_token_ttl_minutes)
            .filter(|minutes| (1..=MAX_ACCESS_TOKEN_TTL_MINUTES).contains(minutes))
            .and_then(Duration::try_minutes)
            .ok_or(ConfigError::InvalidTtl(access_token_ttl_minutes))?;

        Ok(Self {
            signing_key,
            algorithm,
            access_token_ttl,
            password_scheme: HashScheme::default(),
        })
    }

    /// Select the password hashing scheme, validating its parameters.
    pub fn with_password_scheme(mut self, scheme: HashScheme) -> Result<Self, ConfigError> {
        PasswordHasher::with_scheme(scheme)?;
        self.password_scheme = scheme;
        Ok(self)
    }
}

fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| ConfigError::UnsupportedAlgorithm(name.to_string()))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(ConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}
