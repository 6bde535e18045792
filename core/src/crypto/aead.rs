//! crypto/aead.rs
//! AEAD interface for AES-256-GCM and ChaCha20-Poly1305.
//!
//! Design notes:
//! - Both ciphers use 32-byte keys and 12-byte nonces.
//! - Tag verification is constant-time and fails closed (no partial plaintext).
//! - Caller provides nonce and AAD (built by the aad module) per chunk.
//! - Cipher selection is driven by `ContainerConfig::cipher`.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce as AesNonce};
use chacha20poly1305::{ChaCha20Poly1305, Nonce as ChaNonce};

use crate::config::CipherSuite;
use crate::crypto::types::{CryptoError, KEY_LEN_32, NONCE_LEN_12, TAG_LEN};

/// Unified AEAD cipher selected by the container configuration.
#[derive(Clone)]
pub enum AeadImpl {
    AesGcm(Aes256Gcm),
    ChaCha(ChaCha20Poly1305),
}

impl AeadImpl {
    pub fn new(cipher: CipherSuite, key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_LEN_32 {
            return Err(CryptoError::InvalidKeyLen { expected: KEY_LEN_32, actual: key.len() });
        }
        let bad_len = |_| CryptoError::InvalidKeyLen { expected: KEY_LEN_32, actual: key.len() };

        match cipher {
            CipherSuite::Aes256Gcm => Ok(Self::AesGcm(Aes256Gcm::new_from_slice(key).map_err(bad_len)?)),
            CipherSuite::Chacha20Poly1305 => {
                Ok(Self::ChaCha(ChaCha20Poly1305::new_from_slice(key).map_err(bad_len)?))
            }
        }
    }

    /// Seal `plaintext`; output is ciphertext ‖ 16-byte tag.
    pub fn seal(&self, nonce_12: &[u8; NONCE_LEN_12], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let payload = Payload { msg: plaintext, aad };
        match self {
            AeadImpl::AesGcm(cipher) => cipher
                .encrypt(AesNonce::from_slice(nonce_12), payload)
                .map_err(|_| CryptoError::Failure("AES-GCM seal failed".into())),
            AeadImpl::ChaCha(cipher) => cipher
                .encrypt(ChaNonce::from_slice(nonce_12), payload)
                .map_err(|_| CryptoError::Failure("ChaCha20-Poly1305 seal failed".into())),
        }
    }

    /// Open ciphertext ‖ tag. Any mismatch is `TagMismatch`; nothing is returned.
    pub fn open(
        &self,
        nonce_12: &[u8; NONCE_LEN_12],
        aad: &[u8],
        ciphertext_and_tag: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if ciphertext_and_tag.len() < TAG_LEN {
            return Err(CryptoError::ChunkTooShort { have: ciphertext_and_tag.len(), need: TAG_LEN });
        }

        let payload = Payload { msg: ciphertext_and_tag, aad };
        match self {
            AeadImpl::AesGcm(cipher) => cipher
                .decrypt(AesNonce::from_slice(nonce_12), payload)
                .map_err(|_| CryptoError::TagMismatch),
            AeadImpl::ChaCha(cipher) => cipher
                .decrypt(ChaNonce::from_slice(nonce_12), payload)
                .map_err(|_| CryptoError::TagMismatch),
        }
    }
}
