//! crypto/nonce.rs
//! Deterministic chunk nonces from the container nonce base and chunk counter.
//!
//! Design:
//! - TLS-like scheme: a 12-byte base IV (derived per container), then XOR the
//!   low 8 bytes with the little-endian chunk index.
//! - The counter strictly increases; a reordered or replayed chunk is opened
//!   under the wrong nonce and fails authentication.
//!
//! Security notes:
//! - Never reuse the same (base, index) pair. The base is salt-derived, and
//!   the salt is random per container.
//! - All-zero salts are rejected before anything is derived from them.

use crate::constants::SALT_LEN;
use crate::crypto::types::{CryptoError, NONCE_LEN_12};

/// Derive the 12-byte AEAD nonce for `chunk_index`.
///
/// Bytes 0..4 of the base stay fixed; bytes 4..12 are XORed with the
/// little-endian counter. Encrypt and decrypt must use this exact schedule.
#[inline]
pub fn derive_chunk_nonce(base: &[u8; NONCE_LEN_12], chunk_index: u64) -> [u8; NONCE_LEN_12] {
    let mut nonce = *base;
    let ctr: [u8; 8] = chunk_index.to_le_bytes();
    for (n, c) in nonce[4..].iter_mut().zip(ctr.iter()) {
        *n ^= c;
    }
    nonce
}

/// Reject an all-zero salt.
#[inline]
pub fn validate_salt(salt: &[u8; SALT_LEN]) -> Result<(), CryptoError> {
    if salt.iter().all(|&b| b == 0) {
        return Err(CryptoError::InvalidSalt);
    }
    Ok(())
}

/// Fresh random container salt from the OS RNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    use rand::RngCore;

    let mut salt = [0u8; SALT_LEN];
    loop {
        rand::rngs::OsRng.fill_bytes(&mut salt);
        if validate_salt(&salt).is_ok() {
            return salt;
        }
    }
}
