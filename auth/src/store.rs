use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

/// Credential record as held by a user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub username: String,
    pub password_hash: String,
    pub disabled: bool,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl StoredCredential {
    pub fn new(username: impl ToString, password_hash: impl ToString) -> Self {
        Self {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            disabled: false,
            email: None,
            full_name: None,
        }
    }

    pub fn with_email(mut self, email: impl ToString) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_full_name(mut self, full_name: impl ToString) -> Self {
        self.full_name = Some(full_name.to_string());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Failures of the store itself. "Not found" is not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to stored credentials.
///
/// Implementations own their concurrency discipline; every call is treated
/// as one atomic read that may block or fail. No retries happen above this
/// trait.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Look up a credential by username.
    ///
    /// # Returns
    /// Optional credential (None if no such user)
    ///
    /// # Errors
    /// * `Unavailable` - Backing storage could not be read
    async fn lookup(&self, username: &str) -> Result<Option<StoredCredential>, StoreError>;
}

/// Map-backed user store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, StoredCredential>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: impl IntoIterator<Item = StoredCredential>) -> Self {
        let users = credentials
            .into_iter()
            .map(|credential| (credential.username.clone(), credential))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    /// Insert or replace a credential.
    pub fn insert(&self, credential: StoredCredential) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        users.insert(credential.username.clone(), credential);
        Ok(())
    }

    /// Toggle the disabled flag.
    ///
    /// # Returns
    /// False when no user has this username
    pub fn set_disabled(&self, username: &str, disabled: bool) -> Result<bool, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        Ok(match users.get_mut(username) {
            Some(credential) => {
                credential.disabled = disabled;
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn lookup(&self, username: &str) -> Result<Option<StoredCredential>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(username).cloned())
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("user map lock poisoned".to_string())
}
