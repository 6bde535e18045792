//! crypto/kdf.rs
//! HKDF-SHA256 key derivation for both credential profiles and for the
//! per-container subkeys.
//!
//! Design:
//! - backup_id = HKDF(ikm = master_key, info = BACKUP_ID ‖ account_id)[..16]
//! - Local:          HKDF(ikm = master_key,         salt = backup_id, info = LOCAL)
//! - Forward-secret: HKDF(ikm = master_key ‖ token, salt = backup_id,
//!                        info = FORWARD_SECRET ‖ u32le(len) ‖ metadata)
//! - Output (76 bytes) splits into enc_key ‖ auth_key ‖ nonce_seed.
//!
//! Security notes:
//! - Pure functions of their inputs. Same inputs, bit-identical output.
//! - The token is part of the IKM, not the info: without it the PRK cannot be
//!   recomputed even by a holder of the master key.
//! - A supplied token always selects the forward-secret branch; there is no
//!   fallback to the local derivation.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::constants::{labels, SALT_LEN};
use crate::crypto::keys::{AccountId, ForwardSecrecyToken, KeyMaterial, KeyProfile, MasterKey};
use crate::crypto::nonce::validate_salt;
use crate::crypto::types::{CryptoError, KeyError, BACKUP_ID_LEN, KEY_LEN_32, NONCE_LEN_12};

/// HKDF-SHA256 expand over a multi-part info into `okm`.
#[inline]
fn hkdf_expand(salt: Option<&[u8]>, ikm: &[u8], info: &[&[u8]], okm: &mut [u8]) -> Result<(), KeyError> {
    let hk = Hkdf::<Sha256>::new(salt, ikm);
    hk.expand_multi_info(info, okm)
        .map_err(|e| KeyError::Expand(e.to_string()))
}

/// Stable 16-byte identifier of (master_key, account_id).
pub fn derive_backup_id(master_key: &MasterKey, account_id: &AccountId) -> Result<[u8; BACKUP_ID_LEN], KeyError> {
    let mut id = [0u8; BACKUP_ID_LEN];
    hkdf_expand(
        None,
        master_key.as_bytes(),
        &[labels::BACKUP_ID, account_id.as_bytes()],
        &mut id,
    )?;
    Ok(id)
}

/// Local/linking profile: deterministic in (master_key, account_id).
pub fn derive_local(master_key: &MasterKey, account_id: &AccountId) -> Result<KeyMaterial, KeyError> {
    let backup_id = derive_backup_id(master_key, account_id)?;

    let mut okm = Zeroizing::new([0u8; KeyMaterial::OKM_LEN]);
    hkdf_expand(Some(&backup_id[..]), master_key.as_bytes(), &[labels::LOCAL], &mut okm[..])?;

    Ok(KeyMaterial::from_okm(&okm))
}

/// Forward-secret profile: additionally folds in the one-time token and the
/// opaque metadata blob.
pub fn derive_forward_secret(
    master_key: &MasterKey,
    account_id: &AccountId,
    token: &ForwardSecrecyToken,
    metadata: &[u8],
) -> Result<KeyMaterial, KeyError> {
    let backup_id = derive_backup_id(master_key, account_id)?;

    let mut ikm = Zeroizing::new(Vec::with_capacity(KEY_LEN_32 * 2));
    ikm.extend_from_slice(master_key.as_bytes());
    ikm.extend_from_slice(token.as_bytes());

    let meta_len = (metadata.len() as u32).to_le_bytes();

    let mut okm = Zeroizing::new([0u8; KeyMaterial::OKM_LEN]);
    hkdf_expand(
        Some(&backup_id[..]),
        &ikm,
        &[labels::FORWARD_SECRET, &meta_len[..], metadata],
        &mut okm[..],
    )?;

    Ok(KeyMaterial::from_okm(&okm))
}

impl KeyProfile {
    /// Derive the key material for this profile.
    pub fn derive(&self) -> Result<KeyMaterial, KeyError> {
        match self {
            KeyProfile::Local { master_key, account_id } => derive_local(master_key, account_id),
            KeyProfile::ForwardSecret { master_key, account_id, token, metadata } => {
                derive_forward_secret(master_key, account_id, token, metadata)
            }
        }
    }
}

/// Subkeys for one container: key material bound to the container salt.
pub struct ContainerKeys {
    pub chunk_key: [u8; KEY_LEN_32],
    pub nonce_base: [u8; NONCE_LEN_12],
    pub mac_key: [u8; KEY_LEN_32],
}

impl Drop for ContainerKeys {
    fn drop(&mut self) {
        self.chunk_key.zeroize();
        self.nonce_base.zeroize();
        self.mac_key.zeroize();
    }
}

/// Bind `material` to a container salt.
///
/// Two containers with different salts never share a chunk key or nonce base,
/// so byte-identical content encrypts differently every time.
pub fn derive_container_keys(
    material: &KeyMaterial,
    salt: &[u8; SALT_LEN],
) -> Result<ContainerKeys, CryptoError> {
    validate_salt(salt)?;

    let mut keys = ContainerKeys {
        chunk_key: [0u8; KEY_LEN_32],
        nonce_base: [0u8; NONCE_LEN_12],
        mac_key: [0u8; KEY_LEN_32],
    };
    hkdf_expand(Some(&salt[..]), &material.enc_key, &[labels::CHUNK_KEY], &mut keys.chunk_key)?;
    hkdf_expand(Some(&salt[..]), &material.nonce_seed, &[labels::NONCE], &mut keys.nonce_base)?;
    hkdf_expand(Some(&salt[..]), &material.auth_key, &[labels::MAC_KEY], &mut keys.mac_key)?;
    Ok(keys)
}
