//! headers/types.rs
//! Header record struct, flags and errors.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::constants::{HEADER_V1, MAGIC_BKH1, MAX_METADATA_LEN};
use crate::utils::fmt_bytes;

bitflags::bitflags! {
    /// Presence bits for optional header fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HeaderFlags: u16 {
        /// Opaque metadata follows the fixed prefix.
        const HAS_METADATA = 0b0000_0001;
    }
}

/// Header record.
///
/// Wire layout (little-endian):
///
/// ```text
/// [ magic "BKH1" (4) ]
/// [ version (2) ]
/// [ flags (2) ]
/// [ created_at_ms (8, signed) ]
/// [ metadata_len (4) ]
/// [ metadata (metadata_len) ]
/// [ crc32 (4) over everything above ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupHeader {
    pub version: u16,
    pub flags: HeaderFlags,
    /// Creation time, milliseconds since the Unix epoch (UTC).
    pub created_at_ms: i64,
    pub metadata: Option<Bytes>,
}

impl BackupHeader {
    /// Fixed bytes before the metadata.
    pub const PREFIX_LEN: usize = 4 // magic
        + 2                          // version
        + 2                          // flags
        + 8                          // created_at_ms
        + 4;                         // metadata_len

    /// Fixed bytes after the metadata.
    pub const SUFFIX_LEN: usize = 4; // crc32

    /// Header stamped with the current UTC time and no metadata.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Header stamped with an explicit creation time.
    pub fn at(created_at: DateTime<Utc>) -> Self {
        Self {
            version: HEADER_V1,
            flags: HeaderFlags::empty(),
            created_at_ms: created_at.timestamp_millis(),
            metadata: None,
        }
    }

    /// Attach opaque metadata. Empty metadata clears the field.
    pub fn with_metadata(mut self, metadata: impl Into<Bytes>) -> Self {
        let metadata: Bytes = metadata.into();
        if metadata.is_empty() {
            self.metadata = None;
            self.flags.remove(HeaderFlags::HAS_METADATA);
        } else {
            self.metadata = Some(metadata);
            self.flags.insert(HeaderFlags::HAS_METADATA);
        }
        self
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at_ms)
    }

    pub fn metadata_len(&self) -> usize {
        self.metadata.as_ref().map_or(0, |m| m.len())
    }

    /// Encoded size of this record.
    pub fn encoded_len(&self) -> usize {
        Self::PREFIX_LEN + self.metadata_len() + Self::SUFFIX_LEN
    }

    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.version != HEADER_V1 {
            return Err(HeaderError::UnsupportedVersion { have: self.version });
        }

        let len = self.metadata_len();
        if len > MAX_METADATA_LEN {
            return Err(HeaderError::MetadataTooLarge { have: len, max: MAX_METADATA_LEN });
        }

        // Flag and field must agree
        if self.flags.contains(HeaderFlags::HAS_METADATA) != (len > 0) {
            return Err(HeaderError::MetadataFlagMismatch);
        }

        Ok(())
    }

    /// Concise debug summary; metadata is summarized by size only.
    pub fn summary(&self) -> String {
        format!(
            "BackupHeader {{ version: {}, flags: {:?}, created_at_ms: {}, metadata_len: {} }}",
            self.version,
            self.flags,
            self.created_at_ms,
            self.metadata_len(),
        )
    }
}

impl Default for BackupHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("header buffer too short: {have} < {need}")]
    BufferTooShort { have: usize, need: usize },

    #[error("invalid magic: expected {}, got {}", fmt_bytes(.need), fmt_bytes(.have))]
    InvalidMagic { have: [u8; 4], need: [u8; 4] },

    #[error("unsupported header version: {have}")]
    UnsupportedVersion { have: u16 },

    #[error("unknown header flags: 0x{raw:04x}")]
    UnknownFlags { raw: u16 },

    #[error("metadata too large: {have} > {max}")]
    MetadataTooLarge { have: usize, max: usize },

    #[error("HAS_METADATA flag disagrees with metadata length")]
    MetadataFlagMismatch,

    #[error("header crc32 mismatch: stored 0x{have:08x}, computed 0x{need:08x}")]
    InvalidCrc32 { have: u32, need: u32 },

    #[error("{extra} trailing bytes after header record")]
    TrailingBytes { extra: usize },
}

pub(crate) const HEADER_MAGIC: [u8; 4] = MAGIC_BKH1;
