use std::env;
use std::fmt;

use auth::HashScheme;
use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PasswordSchemeName {
    Argon2id,
    Bcrypt,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PasswordConfig {
    pub scheme: PasswordSchemeName,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            scheme: PasswordSchemeName::Argon2id,
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
            bcrypt_cost: 12,
        }
    }
}

impl PasswordConfig {
    pub fn scheme(&self) -> HashScheme {
        match self.scheme {
            PasswordSchemeName::Argon2id => HashScheme::Argon2id {
                memory_kib: self.memory_kib,
                iterations: self.iterations,
                parallelism: self.parallelism,
            },
            PasswordSchemeName::Bcrypt => HashScheme::Bcrypt {
                cost: self.bcrypt_cost,
            },
        }
    }
}

/// Bare environment variables that override the `auth` section.
const AUTH_OVERRIDES: [(&str, &str); 3] = [
    ("SECRET_KEY", "auth.secret_key"),
    ("ALGORITHM", "auth.algorithm"),
    ("ACCESS_TOKEN_EXPIRE_MINUTES", "auth.access_token_expire_minutes"),
];

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. SECRET_KEY, ALGORITHM, ACCESS_TOKEN_EXPIRE_MINUTES
    /// 2. Environment variables (AUTH__SECRET_KEY, SERVER__HTTP_PORT, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: AUTH__SECRET_KEY=... overrides auth.secret_key
            .add_source(Environment::default().separator("__"));

        Self::from_builder(builder, |name| env::var(name).ok())
    }

    /// Apply the bare `auth` overrides found through `lookup` and deserialize.
    fn from_builder<F>(
        builder: ConfigBuilder<DefaultState>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let builder = AUTH_OVERRIDES
            .iter()
            .try_fold(builder, |builder, &(name, key)| {
                builder.set_override_option(key, lookup(name))
            })?;

        builder.build()?.try_deserialize()
    }

    /// Validated authentication settings for the auth core.
    ///
    /// # Errors
    /// * `auth::ConfigError` - Empty key, unsupported algorithm, bad TTL or
    ///   invalid password parameters
    pub fn auth_config(&self) -> Result<auth::AuthConfig, auth::ConfigError> {
        auth::AuthConfig::new(
            self.auth.secret_key.as_bytes(),
            &self.auth.algorithm,
            self.auth.access_token_expire_minutes,
        )?
        .with_password_scheme(self.password.scheme())
    }
}
