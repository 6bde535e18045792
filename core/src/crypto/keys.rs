//! crypto/keys.rs
//! Credential and key-material types.
//!
//! Every secret here is zeroized on drop and redacted in `Debug`.

use std::fmt;

use bytes::Bytes;
use zeroize::Zeroize;

use crate::constants::{MAX_ACCOUNT_ID_LEN, MAX_METADATA_LEN};
use crate::crypto::types::{KeyError, KEY_LEN_32, NONCE_LEN_12, TOKEN_LEN};

/// Long-lived 256-bit backup key held by the device.
#[derive(Clone)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN_32],
}

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN_32]) -> Result<Self, KeyError> {
        if bytes.iter().all(|&b| b == 0) {
            return Err(KeyError::ZeroMasterKey);
        }
        Ok(Self { bytes })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; KEY_LEN_32] = bytes.try_into().map_err(|_| KeyError::InvalidMasterKeyLen {
            expected: KEY_LEN_32,
            actual: bytes.len(),
        })?;
        Self::from_bytes(arr)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN_32] {
        &self.bytes
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Opaque account identifier (e.g. the 16 raw bytes of an account UUID).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccountId(Vec<u8>);

impl AccountId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let bytes = bytes.into();
        if bytes.is_empty() || bytes.len() > MAX_ACCOUNT_ID_LEN {
            return Err(KeyError::InvalidAccountId { len: bytes.len(), max: MAX_ACCOUNT_ID_LEN });
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", hex::encode(&self.0))
    }
}

/// One-time token issued by the backup service. Discarding it makes every
/// container sealed under it permanently unreadable.
#[derive(Clone)]
pub struct ForwardSecrecyToken {
    bytes: [u8; TOKEN_LEN],
}

impl ForwardSecrecyToken {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; TOKEN_LEN] = bytes.try_into().map_err(|_| KeyError::InvalidTokenLen {
            expected: TOKEN_LEN,
            actual: bytes.len(),
        })?;
        if arr.iter().all(|&b| b == 0) {
            return Err(KeyError::ZeroToken);
        }
        Ok(Self { bytes: arr })
    }

    pub fn as_bytes(&self) -> &[u8; TOKEN_LEN] {
        &self.bytes
    }
}

impl Drop for ForwardSecrecyToken {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for ForwardSecrecyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardSecrecyToken")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Per-profile key material: encryption key, authentication key, nonce seed.
///
/// Salt-independent. The stream cipher mixes in the per-container salt.
#[derive(Clone)]
pub struct KeyMaterial {
    pub enc_key: [u8; KEY_LEN_32],
    pub auth_key: [u8; KEY_LEN_32],
    pub nonce_seed: [u8; NONCE_LEN_12],
}

impl KeyMaterial {
    /// Bytes of HKDF output consumed by `from_okm`.
    pub const OKM_LEN: usize = KEY_LEN_32 + KEY_LEN_32 + NONCE_LEN_12;

    pub(crate) fn from_okm(okm: &[u8; Self::OKM_LEN]) -> Self {
        let mut enc_key = [0u8; KEY_LEN_32];
        let mut auth_key = [0u8; KEY_LEN_32];
        let mut nonce_seed = [0u8; NONCE_LEN_12];
        enc_key.copy_from_slice(&okm[..KEY_LEN_32]);
        auth_key.copy_from_slice(&okm[KEY_LEN_32..2 * KEY_LEN_32]);
        nonce_seed.copy_from_slice(&okm[2 * KEY_LEN_32..]);
        Self { enc_key, auth_key, nonce_seed }
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.enc_key == other.enc_key
            && self.auth_key == other.auth_key
            && self.nonce_seed == other.nonce_seed
    }
}

impl Eq for KeyMaterial {}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.enc_key.zeroize();
        self.auth_key.zeroize();
        self.nonce_seed.zeroize();
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("enc_key", &"[REDACTED]")
            .field("auth_key", &"[REDACTED]")
            .field("nonce_seed", &"[REDACTED]")
            .finish()
    }
}

/// The two credential profiles. Exactly one is active per container and the
/// container does not record which; the caller must supply the same one on read.
#[derive(Clone)]
pub enum KeyProfile {
    /// Local export and device-linking transfer. Reproducible forever.
    Local {
        master_key: MasterKey,
        account_id: AccountId,
    },
    /// Server-held backups. Unreadable once the token is discarded.
    ForwardSecret {
        master_key: MasterKey,
        account_id: AccountId,
        token: ForwardSecrecyToken,
        /// Persisted by the storage layer alongside the container.
        metadata: Bytes,
    },
}

impl KeyProfile {
    pub fn local(master_key: &[u8], account_id: &[u8]) -> Result<Self, KeyError> {
        Ok(KeyProfile::Local {
            master_key: MasterKey::from_slice(master_key)?,
            account_id: AccountId::new(account_id)?,
        })
    }

    pub fn forward_secret(
        master_key: &[u8],
        account_id: &[u8],
        token: &[u8],
        metadata: &[u8],
    ) -> Result<Self, KeyError> {
        if metadata.is_empty() || metadata.len() > MAX_METADATA_LEN {
            return Err(KeyError::InvalidMetadata { len: metadata.len(), max: MAX_METADATA_LEN });
        }
        Ok(KeyProfile::ForwardSecret {
            master_key: MasterKey::from_slice(master_key)?,
            account_id: AccountId::new(account_id)?,
            token: ForwardSecrecyToken::from_slice(token)?,
            metadata: Bytes::copy_from_slice(metadata),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeyProfile::Local { .. } => "local",
            KeyProfile::ForwardSecret { .. } => "forward-secret",
        }
    }
}

impl fmt::Debug for KeyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyProfile::Local { master_key, account_id } => f
                .debug_struct("Local")
                .field("master_key", master_key)
                .field("account_id", account_id)
                .finish(),
            KeyProfile::ForwardSecret { master_key, account_id, token, metadata } => f
                .debug_struct("ForwardSecret")
                .field("master_key", master_key)
                .field("account_id", account_id)
                .field("token", token)
                .field("metadata_len", &metadata.len())
                .finish(),
        }
    }
}
