use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::config::ContainerConfig;
use crate::constants::{CHUNK_PREFIX_LEN, MAC_LEN, SALT_LEN};
use crate::crypto::{
    aad::build_chunk_aad,
    aead::AeadImpl,
    kdf::{derive_container_keys, ContainerKeys},
    keys::KeyMaterial,
    mac::ContainerMac,
    nonce::{derive_chunk_nonce, generate_salt},
    types::CryptoError,
};
use crate::padding::PaddingBuckets;
use crate::telemetry::ContainerCounters;
use crate::types::{BackupError, Result};

/// Seals the framed content stream into container bytes.
///
/// Content arrives through `append` in arbitrary slices. A full chunk is held
/// back until more content shows up, so the chunk that turns out to be last
/// can still be sealed with the final flag.
pub struct ChunkEncryptor {
    config: ContainerConfig,
    aead: AeadImpl,
    keys: ContainerKeys,
    mac: Option<ContainerMac>,
    salt: [u8; SALT_LEN],
    buckets: PaddingBuckets,
    pending: Zeroizing<Vec<u8>>,
    next_index: u64,
    content_len: u64,
    sealed_data: u64,
    salt_emitted: bool,
    counters: ContainerCounters,
}

impl ChunkEncryptor {
    /// New engine with a fresh random salt.
    pub fn new(material: &KeyMaterial, config: ContainerConfig) -> Result<Self> {
        Self::with_salt(material, config, generate_salt())
    }

    pub(crate) fn with_salt(material: &KeyMaterial, config: ContainerConfig, salt: [u8; SALT_LEN]) -> Result<Self> {
        config.validate()?;
        let keys = derive_container_keys(material, &salt)?;
        let aead = AeadImpl::new(config.cipher, &keys.chunk_key)?;
        let mut mac = ContainerMac::new(&keys.mac_key)?;
        mac.update(&salt);

        Ok(Self {
            config,
            aead,
            keys,
            mac: Some(mac),
            salt,
            buckets: PaddingBuckets::standard(),
            pending: Zeroizing::new(Vec::with_capacity(config.chunk_data_len())),
            next_index: 0,
            content_len: 0,
            sealed_data: 0,
            salt_emitted: false,
            counters: ContainerCounters::default(),
        })
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Framed content bytes accepted so far.
    pub fn content_len(&self) -> u64 {
        self.content_len
    }

    pub fn chunks_sealed(&self) -> u64 {
        self.next_index
    }

    pub fn is_finalized(&self) -> bool {
        self.mac.is_none()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.mac.is_none() {
            return Err(BackupError::Sequencing("chunk engine already finalized".into()));
        }
        Ok(())
    }

    fn emit_salt<F>(&mut self, emit: &mut F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        if !self.salt_emitted {
            emit(&self.salt)?;
            self.salt_emitted = true;
            self.counters.add_wire(SALT_LEN);
        }
        Ok(())
    }

    /// Seal `pending` as the next chunk carrying `data_len` data bytes.
    fn seal_pending<F>(&mut self, data_len: usize, is_final: bool, emit: &mut F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        let used = self.pending.len();
        if used > data_len {
            return Err(BackupError::Sequencing(format!(
                "chunk holds {} content bytes but only {} fit",
                used, data_len
            )));
        }

        let mut plaintext = Zeroizing::new(Vec::with_capacity(CHUNK_PREFIX_LEN + data_len));
        plaintext.extend_from_slice(&(used as u32).to_le_bytes());
        plaintext.extend_from_slice(&self.pending);
        plaintext.resize(CHUNK_PREFIX_LEN + data_len, 0);
        self.pending.clear();

        let index = self.next_index;
        let aad = build_chunk_aad(&self.config, index, is_final);
        let nonce = derive_chunk_nonce(&self.keys.nonce_base, index);
        let wire = self.aead.seal(&nonce, &aad, &plaintext)?;
        self.next_index = index.checked_add(1).ok_or(CryptoError::CounterExhausted)?;

        if let Some(mac) = self.mac.as_mut() {
            mac.update(&wire);
        }
        emit(&wire)?;

        self.sealed_data += data_len as u64;
        self.counters.add_chunk(wire.len());
        trace!(index, used, data_len, is_final, "chunk sealed");
        Ok(())
    }

    /// Accept framed content, emitting every chunk that is known not to be last.
    pub fn append<F>(&mut self, content: &[u8], emit: &mut F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        self.ensure_open()?;
        self.emit_salt(emit)?;

        let data_len = self.config.chunk_data_len();
        let mut rest = content;
        while !rest.is_empty() {
            if self.pending.len() == data_len {
                self.seal_pending(data_len, false, emit)?;
            }
            let take = (data_len - self.pending.len()).min(rest.len());
            self.pending.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
        }

        self.content_len += content.len() as u64;
        Ok(())
    }

    /// Seal the remaining content and the zero filler up to the padding
    /// bucket, flag the last chunk final and emit the MAC trailer.
    pub fn finalize<F>(&mut self, emit: &mut F) -> Result<ContainerCounters>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        self.ensure_open()?;
        self.emit_salt(emit)?;

        let data_len = self.config.chunk_data_len() as u64;
        let padded = self.buckets.bucket_size(self.content_len);
        let padding = padded - self.content_len;
        debug!(content_len = self.content_len, padded, padding, "padding computed");

        // Content not yet sealed is pending.len() <= padded - sealed_data.
        let mut remaining = padded - self.sealed_data;
        loop {
            let this = remaining.min(data_len);
            remaining -= this;
            let is_final = remaining == 0;
            self.seal_pending(this as usize, is_final, emit)?;
            if is_final {
                break;
            }
        }

        let mac = self
            .mac
            .take()
            .ok_or_else(|| BackupError::Sequencing("chunk engine already finalized".into()))?;
        let trailer = mac.finalize();
        emit(&trailer)?;

        self.counters.add_wire(MAC_LEN);
        self.counters.add_padding(padding);
        debug!(
            chunks = self.next_index,
            container_len = self.counters.bytes_wire,
            "container finalized"
        );
        Ok(self.counters.clone())
    }
}
