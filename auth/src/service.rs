use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::jwt::TokenCodec;
use crate::jwt::TokenError;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::store::StoreError;
use crate::store::StoredCredential;
use crate::store::UserStore;

const TOKEN_TYPE: &str = "bearer";

/// Verified caller identity.
///
/// Display attributes are informational only; trust decisions use
/// `username` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub disabled: bool,
}

impl From<&StoredCredential> for Identity {
    fn from(credential: &StoredCredential) -> Self {
        Self {
            username: credential.username.clone(),
            email: credential.email.clone(),
            full_name: credential.full_name.clone(),
            disabled: credential.disabled,
        }
    }
}

/// Token handed to the caller after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    /// Expiration time (Unix timestamp)
    pub expires_at: i64,
}

/// Authentication and token resolution errors.
///
/// The distinctions are for logs; [`AuthError::is_unauthorized`] tells the
/// boundary which of them collapse into one generic rejection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown user or wrong password, deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid: {0}")]
    TokenInvalid(TokenError),

    #[error("Token has no subject claim")]
    MissingSubjectClaim,

    #[error("User store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),
}

impl AuthError {
    /// Whether this is a credential or token rejection (401-class) rather
    /// than a server-side failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::AccountDisabled
                | AuthError::TokenExpired
                | AuthError::TokenInvalid(_)
                | AuthError::MissingSubjectClaim
        )
    }

    /// Whether the failure is transient and the request may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable(_))
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => AuthError::StoreUnavailable(reason),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::MissingClaim(ref claim) if claim == "sub" => {
                AuthError::MissingSubjectClaim
            }
            TokenError::EncodingFailed(reason) => AuthError::TokenIssuance(reason),
            other => AuthError::TokenInvalid(other),
        }
    }
}

/// Authentication service combining a user store, password verification and
/// token handling.
///
/// Holds no mutable state of its own; the store is the only shared resource.
pub struct AuthService<S>
where
    S: UserStore + ?Sized,
{
    store: Arc<S>,
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    access_token_ttl: Duration,
    dummy_hash: String,
}

impl<S> AuthService<S>
where
    S: UserStore + ?Sized,
{
    /// Create a new authentication service.
    ///
    /// # Arguments
    /// * `store` - User store used for every lookup
    /// * `config` - Validated authentication settings
    ///
    /// # Errors
    /// * `Password` - Hashing scheme could not be initialised
    /// * `TokenIssuance` - Signing key or algorithm rejected by the codec
    pub fn new(store: Arc<S>, config: &AuthConfig) -> Result<Self, AuthError> {
        let password_hasher = PasswordHasher::with_scheme(config.password_scheme)?;
        let token_codec = TokenCodec::new(config.signing_key.as_bytes(), config.algorithm)?;
        // Verified against when the username is unknown. Built with the
        // configured scheme, so the two rejection paths only take the same time
        // for users whose stored hash uses that scheme too.
        let dummy_hash = password_hasher.hash("dummy-password-for-unknown-users")?;

        Ok(Self {
            store,
            password_hasher,
            token_codec,
            access_token_ttl: config.access_token_ttl,
            dummy_hash,
        })
    }

    pub fn token_codec(&self) -> &TokenCodec {
        &self.token_codec
    }

    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(self.password_hasher.hash(password)?)
    }

    /// Verify a username/password pair.
    ///
    /// # Returns
    /// Identity of the authenticated user
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `AccountDisabled` - Password is correct but the account is disabled
    /// * `StoreUnavailable` - The user store could not be read
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let credential = match self.store.lookup(username).await? {
            Some(credential) => credential,
            None => {
                let _ = self.password_hasher.verify(password, &self.dummy_hash);
                tracing::debug!(username, reason = "unknown_user", "Authentication rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .password_hasher
            .verify(password, &credential.password_hash)
        {
            tracing::debug!(username, reason = "wrong_password", "Authentication rejected");
            return Err(AuthError::InvalidCredentials);
        }

        if credential.disabled {
            tracing::warn!(username, reason = "account_disabled", "Authentication rejected");
            return Err(AuthError::AccountDisabled);
        }

        tracing::info!(username, "User authenticated");
        Ok(Identity::from(&credential))
    }

    /// Issue an access token with the configured TTL.
    pub fn issue_token(&self, identity: &Identity) -> Result<AccessToken, AuthError> {
        self.issue_token_with_ttl(identity, Some(self.access_token_ttl))
    }

    /// Issue an access token with an explicit TTL.
    ///
    /// `None` falls back to the codec default.
    pub fn issue_token_with_ttl(
        &self,
        identity: &Identity,
        ttl: Option<Duration>,
    ) -> Result<AccessToken, AuthError> {
        let (access_token, claims) = self.token_codec.issue(&identity.username, ttl)?;

        Ok(AccessToken {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_at: claims.exp,
        })
    }

    /// Authenticate and issue a token in one step.
    pub async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        let identity = self.authenticate(username, password).await?;
        self.issue_token(&identity)
    }

    /// Resolve a presented token back to a current identity.
    ///
    /// The subject is re-read from the store on every call, so disabling an
    /// account invalidates tokens already issued to it.
    ///
    /// # Errors
    /// * `TokenExpired`, `TokenInvalid`, `MissingSubjectClaim` - Token rejected
    /// * `InvalidCredentials` - Subject no longer exists
    /// * `AccountDisabled` - Subject is disabled
    /// * `StoreUnavailable` - The user store could not be read
    pub async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.token_codec.decode(token).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AuthError::from(e)
        })?;

        let credential = self.store.lookup(&claims.sub).await?.ok_or_else(|| {
            tracing::debug!(subject = %claims.sub, reason = "unknown_subject", "Token rejected");
            AuthError::InvalidCredentials
        })?;

        if credential.disabled {
            tracing::warn!(subject = %claims.sub, reason = "account_disabled", "Token rejected");
            return Err(AuthError::AccountDisabled);
        }

        Ok(Identity::from(&credential))
    }
}
