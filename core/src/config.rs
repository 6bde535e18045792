//! config.rs
//! Container configuration shared by writer and reader.
//!
//! Nothing here is recorded inside the container. A reader must be built with
//! the same chunk size and cipher suite the writer used, exactly like the key
//! profile.

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::constants::{
    cipher_ids, ALLOWED_CHUNK_SIZES, CHUNK_PREFIX_LEN, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FRAME_LEN,
    MAC_LEN, MAX_FRAME_LEN_CEILING, SALT_LEN,
};
use crate::crypto::types::TAG_LEN;
use crate::padding::PaddingBuckets;
use crate::utils::enum_name_or_hex;

/// Cipher suites usable for chunk sealing. Both take 32-byte keys and 96-bit nonces.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherSuite {
    Aes256Gcm        = cipher_ids::AES256_GCM,
    Chacha20Poly1305 = cipher_ids::CHACHA20_POLY1305,
}

impl CipherSuite {
    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(raw: u16) -> Result<Self, ConfigError> {
        CipherSuite::try_from(raw).map_err(|_| ConfigError::UnknownCipherSuite {
            name: enum_name_or_hex::<CipherSuite>(raw),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("chunk size {have} not one of {allowed:?}")]
    InvalidChunkSize { have: u32, allowed: &'static [usize] },

    #[error("max frame length {have} outside 1..={max}")]
    InvalidMaxFrameLen { have: u32, max: u32 },

    #[error("unknown cipher suite: {name}")]
    UnknownCipherSuite { name: String },

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Container parameters.
///
/// Defaults: 64 KiB chunks, ChaCha20-Poly1305, 16 MiB frame ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Plaintext bytes per chunk, including the 4-byte used-length prefix.
    pub chunk_size: u32,
    pub cipher: CipherSuite,
    /// Frames larger than this are refused on write and rejected on read.
    pub max_frame_len: u32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE as u32,
            cipher: CipherSuite::Chacha20Poly1305,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl ContainerConfig {
    pub fn with_cipher(mut self, cipher: CipherSuite) -> Self {
        self.cipher = cipher;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_frame_len(mut self, max_frame_len: u32) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Parse a JSON document; missing fields fall back to defaults.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: ContainerConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !ALLOWED_CHUNK_SIZES.contains(&(self.chunk_size as usize)) {
            return Err(ConfigError::InvalidChunkSize {
                have: self.chunk_size,
                allowed: ALLOWED_CHUNK_SIZES,
            });
        }
        if self.max_frame_len == 0 || self.max_frame_len > MAX_FRAME_LEN_CEILING {
            return Err(ConfigError::InvalidMaxFrameLen {
                have: self.max_frame_len,
                max: MAX_FRAME_LEN_CEILING,
            });
        }
        Ok(())
    }

    /// Content/filler bytes carried by one full chunk.
    #[inline]
    pub fn chunk_data_len(&self) -> usize {
        self.chunk_size as usize - CHUNK_PREFIX_LEN
    }

    /// Wire bytes of one full chunk (plaintext + tag).
    #[inline]
    pub fn chunk_wire_len(&self) -> usize {
        self.chunk_size as usize + TAG_LEN
    }
}

/// Predict the container length produced for `content_len` bytes of framed content.
///
/// `content_len` counts header and frames including their 4-byte length prefixes.
pub fn expected_container_len(content_len: u64, config: &ContainerConfig) -> u64 {
    let padded = PaddingBuckets::standard().bucket_size(content_len.max(1));
    let data_per_chunk = config.chunk_data_len() as u64;
    let chunks = padded.div_ceil(data_per_chunk);
    SALT_LEN as u64 + padded + chunks * (CHUNK_PREFIX_LEN + TAG_LEN) as u64 + MAC_LEN as u64
}
