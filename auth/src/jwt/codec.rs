use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;

use super::claims::Claims;
use super::errors::TokenError;

/// TTL applied when the caller does not supply one.
pub const DEFAULT_TTL_MINUTES: i64 = 15;

/// Wire shape used while decoding, before `sub` is known to be present.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    iat: Option<i64>,
}

/// Signs claims into compact JWTs and verifies them back.
///
/// Only the HMAC family is accepted. The key and algorithm are fixed at
/// construction; the codec holds no other state and is safe to share.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl TokenCodec {
    /// Create a token codec.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing key (at least 32 bytes recommended)
    /// * `algorithm` - One of HS256, HS384, HS512
    ///
    /// # Errors
    /// * `EncodingFailed` - Key is empty or the algorithm is not an HMAC scheme
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EncodingFailed(
                "signing key must not be empty".to_string(),
            ));
        }
        if !is_hmac(algorithm) {
            return Err(TokenError::EncodingFailed(format!(
                "unsupported signing algorithm {:?}",
                algorithm
            )));
        }

        let mut validation = Validation::new(algorithm);
        // Expiry is checked by the codec with a strict boundary, after the
        // signature has been verified.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Encode claims into a signed token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Issue a token for `subject` expiring after `ttl`.
    ///
    /// Falls back to [`DEFAULT_TTL_MINUTES`] when `ttl` is `None`.
    ///
    /// # Returns
    /// The token string and the claims that were signed
    ///
    /// # Errors
    /// * `EncodingFailed` - The expiry overflows or signing failed
    pub fn issue(
        &self,
        subject: &str,
        ttl: Option<Duration>,
    ) -> Result<(String, Claims), TokenError> {
        let ttl = ttl.unwrap_or_else(|| Duration::minutes(DEFAULT_TTL_MINUTES));
        let claims = Claims::for_subject(subject, ttl)?;
        let token = self.encode(&claims)?;
        Ok((token, claims))
    }

    /// Decode and validate a token against the current time.
    ///
    /// # Errors
    /// * `Malformed` - Token is not a well-formed JWT
    /// * `Forged` - Signature or declared algorithm does not match
    /// * `MissingClaim` - `sub` or `exp` is absent
    /// * `Expired` - `exp` is not strictly in the future
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Decode and validate a token against an explicit Unix timestamp.
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let token_data = decode::<RawClaims>(token, &self.decoding_key, &self.validation)
            .map_err(classify)?;
        let raw = token_data.claims;

        let sub = raw
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| TokenError::MissingClaim("sub".to_string()))?;

        let exp = raw
            .exp
            .ok_or_else(|| TokenError::MissingClaim("exp".to_string()))?;

        let claims = Claims {
            sub,
            exp,
            iat: raw.iat.unwrap_or_default(),
        };

        if claims.is_expired(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

fn classify(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::Forged,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::MissingRequiredClaim(claim) => TokenError::MissingClaim(claim.clone()),
        _ => TokenError::Malformed(error.to_string()),
    }
}
