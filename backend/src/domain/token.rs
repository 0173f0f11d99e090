//! Bearer token engine.
//!
//! Tokens are PASETO v2.local: the claims are JSON, encrypted and
//! authenticated under a 32-byte symmetric key, and carry a single-space
//! footer. Validity is seven days from minting, matching
//! [`super::session_lifetime`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{UserId, session_lifetime};

mod paseto;

const FOOTER: &[u8] = b" ";
const ISSUER: &str = "test_service";
const AUDIENCE: &str = "test";
const SUBJECT: &str = "test_subject";
const JTI_LEN: usize = 16;

/// Symmetric key used to seal and open tokens.
#[derive(Clone)]
pub struct TokenKey(Zeroizing<[u8; TokenKey::LEN]>);

impl TokenKey {
    /// Required key length in bytes.
    pub const LEN: usize = 32;

    /// Build a key from raw bytes, which must be exactly [`Self::LEN`] long.
    ///
    /// # Examples
    /// ```
    /// use conduit::domain::TokenKey;
    ///
    /// assert!(TokenKey::from_bytes(b"0123456789abcdef0123456789abcdef").is_ok());
    /// assert!(TokenKey::from_bytes(b"short").is_err());
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenKeyError> {
        let raw: [u8; Self::LEN] = bytes
            .try_into()
            .map_err(|_| TokenKeyError::InvalidLength {
                actual: bytes.len(),
            })?;
        Ok(Self(Zeroizing::new(raw)))
    }

    fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl std::fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenKey(..)")
    }
}

/// Raised when a token key has the wrong length.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenKeyError {
    #[error("token key must be exactly {expected} bytes, got {actual}", expected = TokenKey::LEN)]
    InvalidLength { actual: usize },
}

/// Failures while minting or decoding tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not a well-formed v2.local token with the expected footer.
    #[error("token is malformed")]
    Malformed,
    /// Authentication failed: wrong key or tampered contents.
    #[error("token failed cryptographic verification")]
    CryptographicFailure,
    /// Decrypted payload is not a valid claim set.
    #[error("token claims are invalid")]
    InvalidClaims,
    /// Expiration lies in the past.
    #[error("token has expired")]
    Expired,
    /// Minting failed.
    #[error("token could not be issued: {message}")]
    Issue { message: String },
}

impl From<paseto::PasetoError> for TokenError {
    fn from(value: paseto::PasetoError) -> Self {
        use paseto::PasetoError as P;
        match value {
            P::Malformed | P::FooterMismatch => Self::Malformed,
            P::Authentication => Self::CryptographicFailure,
            P::RandomSource { message } => Self::Issue { message },
            P::Seal => Self::Issue {
                message: "encryption failed".to_owned(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    aud: String,
    iss: String,
    jti: String,
    sub: String,
    #[serde(with = "rfc3339")]
    exp: DateTime<Utc>,
    #[serde(with = "rfc3339")]
    iat: DateTime<Utc>,
    #[serde(with = "rfc3339")]
    nbf: DateTime<Utc>,
    uid: String,
}

mod rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

/// Mints and decodes bearer tokens.
#[derive(Clone)]
pub struct TokenEngine {
    key: TokenKey,
    clock: Arc<dyn Clock>,
}

impl TokenEngine {
    pub fn new(key: TokenKey, clock: Arc<dyn Clock>) -> Self {
        Self { key, clock }
    }

    /// Issue a token for `user_id`, valid for seven days from now.
    pub fn mint(&self, user_id: &UserId) -> Result<String, TokenError> {
        let now = self.clock.utc();
        let mut jti = [0_u8; JTI_LEN];
        OsRng
            .try_fill_bytes(&mut jti)
            .map_err(|err| TokenError::Issue {
                message: err.to_string(),
            })?;

        let claims = Claims {
            aud: AUDIENCE.to_owned(),
            iss: ISSUER.to_owned(),
            jti: hex::encode(jti),
            sub: SUBJECT.to_owned(),
            exp: now + session_lifetime(),
            iat: now,
            nbf: now,
            uid: user_id.to_string(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|err| TokenError::Issue {
            message: err.to_string(),
        })?;
        Ok(paseto::encrypt(self.key.as_bytes(), &payload, FOOTER)?)
    }

    /// Open `token` and return the user it was issued for.
    pub fn decode(&self, token: &str) -> Result<UserId, TokenError> {
        let payload = paseto::decrypt(self.key.as_bytes(), token, FOOTER)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::InvalidClaims)?;
        if claims.exp < self.clock.utc() {
            return Err(TokenError::Expired);
        }
        UserId::new(&claims.uid).map_err(|_| TokenError::InvalidClaims)
    }

    #[cfg(test)]
    fn seal_claims(&self, claims: &Claims) -> String {
        let payload = serde_json::to_vec(claims).expect("claims serialise");
        paseto::encrypt(self.key.as_bytes(), &payload, FOOTER).expect("seal")
    }
}

impl std::fmt::Debug for TokenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
