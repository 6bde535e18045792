use tracing::trace;
use zeroize::Zeroizing;

use crate::config::ContainerConfig;
use crate::constants::{CHUNK_PREFIX_LEN, SALT_LEN};
use crate::crypto::{
    aad::build_chunk_aad,
    aead::AeadImpl,
    kdf::{derive_container_keys, ContainerKeys},
    keys::KeyMaterial,
    mac::ContainerMac,
    nonce::derive_chunk_nonce,
};
use crate::stream::cipher::types::{ChunkLayout, OpenedChunk};
use crate::types::{BackupError, Result};

/// Opens chunks in order and checks the MAC trailer.
///
/// Output is only ever returned after the chunk tag verified.
pub struct ChunkDecryptor {
    config: ContainerConfig,
    aead: AeadImpl,
    keys: ContainerKeys,
    mac: Option<ContainerMac>,
    layout: ChunkLayout,
    next_index: u64,
}

impl ChunkDecryptor {
    /// `salt` is the first 16 bytes of the container; `container_len` the declared total length.
    pub fn new(
        material: &KeyMaterial,
        config: ContainerConfig,
        salt: &[u8; SALT_LEN],
        container_len: u64,
    ) -> Result<Self> {
        config.validate()?;
        let layout = ChunkLayout::from_container_len(container_len, &config)?;
        let keys = derive_container_keys(material, salt)?;
        let aead = AeadImpl::new(config.cipher, &keys.chunk_key)?;
        let mut mac = ContainerMac::new(&keys.mac_key)?;
        mac.update(salt);

        Ok(Self { config, aead, keys, mac: Some(mac), layout, next_index: 0 })
    }

    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    /// Chunks not yet opened.
    pub fn remaining(&self) -> u64 {
        self.layout.chunk_count - self.next_index
    }

    /// Wire length of the next chunk, `None` once every chunk was opened.
    pub fn next_wire_len(&self) -> Option<usize> {
        self.layout.wire_len(self.next_index)
    }

    /// Authenticate and open the next chunk.
    pub fn open_next(&mut self, wire: &[u8]) -> Result<OpenedChunk> {
        let index = self.next_index;
        let expected = self
            .layout
            .wire_len(index)
            .ok_or_else(|| BackupError::Sequencing(format!("no chunk {} in this container", index)))?;
        if wire.len() != expected {
            return Err(BackupError::Truncated(format!(
                "chunk {} has {} bytes, expected {}",
                index,
                wire.len(),
                expected
            )));
        }

        let is_final = self.layout.is_final(index);
        let aad = build_chunk_aad(&self.config, index, is_final);
        let nonce = derive_chunk_nonce(&self.keys.nonce_base, index);
        let plaintext = Zeroizing::new(self.aead.open(&nonce, &aad, wire)?);

        if plaintext.len() < CHUNK_PREFIX_LEN {
            return Err(BackupError::MalformedLength(format!("chunk {} lacks its length prefix", index)));
        }
        let mut prefix = [0u8; CHUNK_PREFIX_LEN];
        prefix.copy_from_slice(&plaintext[..CHUNK_PREFIX_LEN]);
        let used = u32::from_le_bytes(prefix) as usize;
        let data_len = plaintext.len() - CHUNK_PREFIX_LEN;
        if used > data_len {
            return Err(BackupError::MalformedLength(format!(
                "chunk {} claims {} content bytes of {}",
                index, used, data_len
            )));
        }

        if let Some(mac) = self.mac.as_mut() {
            mac.update(wire);
        }
        self.next_index += 1;
        trace!(index, used, data_len, is_final, "chunk opened");

        Ok(OpenedChunk {
            index,
            is_final,
            content: plaintext[CHUNK_PREFIX_LEN..CHUNK_PREFIX_LEN + used].to_vec(),
            data_len,
            wire_len: wire.len(),
        })
    }

    /// Verify the trailer once every chunk was opened.
    pub fn verify_trailer(&mut self, trailer: &[u8]) -> Result<()> {
        if self.remaining() != 0 {
            return Err(BackupError::Sequencing(format!(
                "trailer checked with {} chunks unread",
                self.remaining()
            )));
        }
        let mac = self
            .mac
            .take()
            .ok_or_else(|| BackupError::Sequencing("trailer already verified".into()))?;
        mac.verify(trailer)?;
        Ok(())
    }
}
