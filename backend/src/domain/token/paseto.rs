//! PASETO v2.local sealing and opening.
//!
//! Layout: `v2.local.` || base64url(nonce || ciphertext) [ `.` || base64url(footer) ].
//! The nonce is BLAKE2b-192 of the payload keyed with 24 random bytes, and the
//! AEAD is XChaCha20-Poly1305 with `PAE([header, nonce, footer])` as
//! associated data. All base64 is URL-safe without padding.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use blake2::Blake2bMac;
use blake2::digest::Mac;
use blake2::digest::consts::U24;
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::{Key, KeyInit, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

const HEADER: &str = "v2.local.";
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(super) enum PasetoError {
    #[error("token is not a v2.local token")]
    Malformed,
    #[error("token footer does not match")]
    FooterMismatch,
    #[error("token failed authentication")]
    Authentication,
    #[error("random source failed: {message}")]
    RandomSource { message: String },
    #[error("token sealing failed")]
    Seal,
}

/// Pre-authentication encoding of `pieces`.
pub(super) fn pae(pieces: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + pieces.iter().map(|p| 8 + p.len()).sum::<usize>());
    out.extend_from_slice(&le64(pieces.len()));
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len()));
        out.extend_from_slice(piece);
    }
    out
}

fn le64(n: usize) -> [u8; 8] {
    // The most significant bit is cleared for interoperability with
    // languages lacking unsigned 64-bit integers.
    (u64::try_from(n).unwrap_or(u64::MAX) & (u64::MAX >> 1)).to_le_bytes()
}

/// Seal `payload` under `key` with a fresh random nonce key.
pub(super) fn encrypt(key: &[u8; 32], payload: &[u8], footer: &[u8]) -> Result<String, PasetoError> {
    let mut nonce_key = [0_u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce_key)
        .map_err(|err| PasetoError::RandomSource {
            message: err.to_string(),
        })?;
    seal(key, payload, footer, &nonce_key)
}

pub(super) fn seal(
    key: &[u8; 32],
    payload: &[u8],
    footer: &[u8],
    nonce_key: &[u8; NONCE_LEN],
) -> Result<String, PasetoError> {
    let mut mac =
        <Blake2bMac<U24> as Mac>::new_from_slice(nonce_key).map_err(|_| PasetoError::Seal)?;
    mac.update(payload);
    let nonce = mac.finalize().into_bytes();

    let aad = pae(&[HEADER.as_bytes(), nonce.as_slice(), footer]);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let ciphertext = cipher
        .encrypt(
            XNonce::from_slice(nonce.as_slice()),
            Payload {
                msg: payload,
                aad: &aad,
            },
        )
        .map_err(|_| PasetoError::Seal)?;

    let mut body = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    body.extend_from_slice(nonce.as_slice());
    body.extend_from_slice(&ciphertext);

    let mut token = format!("{HEADER}{}", URL_SAFE_NO_PAD.encode(body));
    if !footer.is_empty() {
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(footer));
    }
    Ok(token)
}

/// Open `token`, requiring its footer to equal `footer`.
pub(super) fn decrypt(key: &[u8; 32], token: &str, footer: &[u8]) -> Result<Vec<u8>, PasetoError> {
    let rest = token.strip_prefix(HEADER).ok_or(PasetoError::Malformed)?;
    let (encoded_body, encoded_footer) = match rest.split_once('.') {
        Some((body, footer)) => (body, Some(footer)),
        None => (rest, None),
    };

    let presented_footer = match encoded_footer {
        Some(raw) => URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|_| PasetoError::Malformed)?,
        None => Vec::new(),
    };
    if !bool::from(presented_footer.as_slice().ct_eq(footer)) {
        return Err(PasetoError::FooterMismatch);
    }

    let raw = URL_SAFE_NO_PAD
        .decode(encoded_body)
        .map_err(|_| PasetoError::Malformed)?;
    if raw.len() < NONCE_LEN + TAG_LEN {
        return Err(PasetoError::Malformed);
    }
    let (nonce, ciphertext) = raw.split_at(NONCE_LEN);

    let aad = pae(&[HEADER.as_bytes(), nonce, footer]);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: &aad,
            },
        )
        .map_err(|_| PasetoError::Authentication)
}
