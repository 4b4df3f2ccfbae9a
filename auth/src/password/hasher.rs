use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;
const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Hashing scheme used for newly created hashes.
///
/// Verification never depends on this value: every hash names its own
/// scheme, so credentials written under an older scheme keep verifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    /// Argon2id with explicit cost parameters.
    Argon2id {
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
    /// bcrypt with a log2 work factor.
    Bcrypt { cost: u32 },
}

impl Default for HashScheme {
    fn default() -> Self {
        HashScheme::Argon2id {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Password hashing implementation.
///
/// Produces salted, self-describing hashes and verifies plaintext against
/// them. Argon2id is the default scheme; bcrypt is available for stores that
/// already hold bcrypt hashes.
#[derive(Clone)]
pub struct PasswordHasher {
    scheme: HashScheme,
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a password hasher with secure defaults (Argon2id).
    pub fn new() -> Self {
        Self {
            scheme: HashScheme::default(),
            argon2: Argon2::default(),
        }
    }

    /// Create a password hasher for a specific scheme.
    ///
    /// # Arguments
    /// * `scheme` - Scheme and cost parameters for new hashes
    ///
    /// # Errors
    /// * `InvalidParameters` - Cost parameters are out of range for the scheme
    pub fn with_scheme(scheme: HashScheme) -> Result<Self, PasswordError> {
        let argon2 = match scheme {
            HashScheme::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => {
                let params = Params::new(memory_kib, iterations, parallelism, None)
                    .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;
                Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params)
            }
            HashScheme::Bcrypt { cost } => {
                if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&cost) {
                    return Err(PasswordError::InvalidParameters(format!(
                        "bcrypt cost must be between {} and {}, got {}",
                        BCRYPT_MIN_COST, BCRYPT_MAX_COST, cost
                    )));
                }
                Argon2::default()
            }
        };

        Ok(Self { scheme, argon2 })
    }

    /// Scheme used for new hashes.
    pub fn scheme(&self) -> HashScheme {
        self.scheme
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string (Argon2id) or modular crypt string (bcrypt); both embed
    /// algorithm, parameters and salt
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        match self.scheme {
            HashScheme::Argon2id { .. } => {
                let salt = SaltString::generate(&mut OsRng);
                self.argon2
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| PasswordError::HashingFailed(e.to_string()))
            }
            HashScheme::Bcrypt { cost } => bcrypt::hash(password, cost)
                .map_err(|e| PasswordError::HashingFailed(e.to_string())),
        }
    }

    /// Verify a password against a stored hash.
    ///
    /// The comparison is constant time. Malformed or unrecognised hashes
    /// verify as `false`.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash
    ///
    /// # Returns
    /// True if password matches, false otherwise
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix)) {
            return bcrypt::verify(password, hash).unwrap_or(false);
        }

        match PasswordHash::new(hash) {
            Ok(parsed_hash) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
