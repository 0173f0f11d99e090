//! Password credential engine.
//!
//! Passwords are stored as a [`PasswordVerifier`]: an Argon2id hash and the
//! random salt it was derived with, both encoded as standard base64 without
//! padding. Cost parameters are fixed; changing them invalidates every stored
//! verifier.
//!
//! Both [`derive`] and [`verify`] are CPU and memory heavy (64 MiB per call).
//! Async callers should run them on the blocking pool.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const TIME_COST: u32 = 1;
const MEMORY_COST_KIB: u32 = 64 * 1024;
const PARALLELISM: u32 = 4;

/// Errors raised while deriving a verifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// The operating system random source failed.
    #[error("random source failed: {message}")]
    RandomSource { message: String },
    /// The key-derivation function rejected its inputs.
    #[error("password derivation failed: {message}")]
    Derivation { message: String },
}

/// Stored password verifier (hash and salt, both base64 without padding).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordVerifier {
    hash: String,
    salt: String,
}

impl PasswordVerifier {
    /// Rebuild a verifier from stored columns.
    pub fn new(hash: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            salt: salt.into(),
        }
    }

    /// Encoded hash.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Encoded salt.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Check a candidate secret against this verifier.
    pub fn matches(&self, candidate: &str) -> bool {
        verify(candidate, &self.hash, &self.salt)
    }
}

impl std::fmt::Debug for PasswordVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordVerifier").finish_non_exhaustive()
    }
}

fn argon2id() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(HASH_LEN)).map_err(
        |err| PasswordError::Derivation {
            message: err.to_string(),
        },
    )?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn derive_key(secret: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; HASH_LEN]>, PasswordError> {
    let mut key = Zeroizing::new([0_u8; HASH_LEN]);
    argon2id()?
        .hash_password_into(secret, salt, key.as_mut_slice())
        .map_err(|err| PasswordError::Derivation {
            message: err.to_string(),
        })?;
    Ok(key)
}

/// Derive a verifier for `secret` under a fresh random salt.
///
/// # Examples
/// ```
/// use conduit::domain::password;
///
/// let verifier = password::derive("hunter2").unwrap();
/// assert!(password::verify("hunter2", verifier.hash(), verifier.salt()));
/// ```
pub fn derive(secret: &str) -> Result<PasswordVerifier, PasswordError> {
    let mut salt = [0_u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|err| PasswordError::RandomSource {
            message: err.to_string(),
        })?;

    let key = derive_key(secret.as_bytes(), &salt)?;
    Ok(PasswordVerifier {
        hash: STANDARD_NO_PAD.encode(key.as_slice()),
        salt: STANDARD_NO_PAD.encode(salt),
    })
}

/// Recompute the hash of `candidate` under the stored salt and compare.
///
/// A salt that is not valid base64, or too short for Argon2, yields `false`.
pub fn verify(candidate: &str, stored_hash: &str, stored_salt: &str) -> bool {
    let Ok(salt) = STANDARD_NO_PAD.decode(stored_salt) else {
        return false;
    };
    let Ok(key) = derive_key(candidate.as_bytes(), &salt) else {
        return false;
    };
    let recomputed = STANDARD_NO_PAD.encode(key.as_slice());
    recomputed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn verifier() -> PasswordVerifier {
        derive("hunter2").expect("derivation succeeds")
    }

    #[rstest]
    fn derived_verifier_has_expected_encoded_lengths(verifier: PasswordVerifier) {
        let hash = STANDARD_NO_PAD.decode(verifier.hash()).expect("hash is base64");
        let salt = STANDARD_NO_PAD.decode(verifier.salt()).expect("salt is base64");
        assert_eq!(hash.len(), HASH_LEN);
        assert_eq!(salt.len(), SALT_LEN);
        assert!(!verifier.hash().ends_with('='));
    }

    #[rstest]
    fn verify_accepts_the_original_secret(verifier: PasswordVerifier) {
        assert!(verify("hunter2", verifier.hash(), verifier.salt()));
        assert!(verifier.matches("hunter2"));
    }

    #[rstest]
    #[case("nope!")]
    #[case("hunter3")]
    #[case("")]
    fn verify_rejects_other_secrets(verifier: PasswordVerifier, #[case] candidate: &str) {
        assert!(!verify(candidate, verifier.hash(), verifier.salt()));
    }

    #[rstest]
    fn same_secret_with_fresh_salt_yields_different_hash(verifier: PasswordVerifier) {
        let other = derive("hunter2").expect("derivation succeeds");
        assert_ne!(other.salt(), verifier.salt());
        assert_ne!(other.hash(), verifier.hash());
    }

    #[rstest]
    #[case("***not base64***")]
    #[case("c2hvcnQ")]
    fn verify_returns_false_for_unusable_salt(verifier: PasswordVerifier, #[case] salt: &str) {
        assert!(!verify("hunter2", verifier.hash(), salt));
    }

    #[rstest]
    fn debug_output_hides_material(verifier: PasswordVerifier) {
        let rendered = format!("{verifier:?}");
        assert!(!rendered.contains(verifier.hash()));
        assert!(!rendered.contains(verifier.salt()));
    }
}
