//! crypto/mac.rs
//! Whole-container HMAC-SHA256 trailer.
//!
//! The chunk AEAD already authenticates each chunk and the final flag blocks
//! truncation; the trailer additionally binds the clear-text salt and every
//! chunk wire byte under the authentication key.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::constants::MAC_LEN;
use crate::crypto::types::{CryptoError, KEY_LEN_32};

type HmacSha256 = Hmac<Sha256>;

/// Running MAC over the container wire.
#[derive(Clone)]
pub struct ContainerMac {
    inner: HmacSha256,
}

impl ContainerMac {
    pub fn new(mac_key: &[u8; KEY_LEN_32]) -> Result<Self, CryptoError> {
        let inner = HmacSha256::new_from_slice(mac_key)
            .map_err(|_| CryptoError::InvalidKeyLen { expected: KEY_LEN_32, actual: mac_key.len() })?;
        Ok(Self { inner })
    }

    pub fn update(&mut self, wire: &[u8]) {
        self.inner.update(wire);
    }

    pub fn finalize(self) -> [u8; MAC_LEN] {
        self.inner.finalize().into_bytes().into()
    }

    /// Constant-time comparison against the stored trailer.
    pub fn verify(self, expected: &[u8]) -> Result<(), CryptoError> {
        self.inner.verify_slice(expected).map_err(|_| CryptoError::MacMismatch)
    }
}
