//! Credential and bearer-token authentication core
//!
//! Provides the stateless pieces every service in the workspace wraps:
//! - Password hashing (Argon2id by default, bcrypt as an alternate scheme)
//! - Signed, expiring JWT access tokens
//! - A user store capability with an in-memory implementation
//! - An authentication service composing the three
//!
//! HTTP, persistence and configuration loading live in the services that
//! depend on this crate.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("not_my_password", &hash));
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{Algorithm, TokenCodec};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Algorithm::HS256).unwrap();
//! let (token, _) = codec.issue("alice", None).unwrap();
//! let claims = codec.decode(&token).unwrap();
//! assert_eq!(claims.sub, "alice");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use std::sync::Arc;
//!
//! use auth::{AuthConfig, AuthService, InMemoryUserStore, PasswordHasher, StoredCredential};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::new("secret_key_at_least_32_bytes_long!", "HS256", 30)?;
//! let hash = PasswordHasher::new().hash("wonderland")?;
//! let store = Arc::new(InMemoryUserStore::with_credentials([
//!     StoredCredential::new("alice", hash),
//! ]));
//! let service = AuthService::new(store, &config)?;
//!
//! // Login: verify and generate token
//! let token = service.login("alice", "wonderland").await?;
//!
//! // Later requests: resolve the bearer token
//! let identity = service.resolve(&token.access_token).await?;
//! assert_eq!(identity.username, "alice");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod jwt;
pub mod password;
pub mod service;
pub mod store;

// Re-export commonly used items
pub use config::AuthConfig;
pub use config::ConfigError;
pub use jsonwebtoken::Algorithm;
pub use jwt::Claims;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use password::HashScheme;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use service::AccessToken;
pub use service::AuthError;
pub use service::AuthService;
pub use service::Identity;
pub use store::InMemoryUserStore;
pub use store::StoreError;
pub use store::StoredCredential;
pub use store::UserStore;
