use crate::config::ContainerConfig;
use crate::constants::{CHUNK_PREFIX_LEN, MAC_LEN, SALT_LEN};
use crate::crypto::types::TAG_LEN;
use crate::types::{BackupError, Result};

/// Smallest chunk a writer can produce: prefix, one data byte, tag.
pub const MIN_CHUNK_WIRE_LEN: usize = CHUNK_PREFIX_LEN + 1 + TAG_LEN;

/// Chunk boundaries implied by a declared container length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    pub chunk_count: u64,
    pub full_wire_len: usize,
    pub last_wire_len: usize,
}

impl ChunkLayout {
    pub fn from_container_len(container_len: u64, config: &ContainerConfig) -> Result<Self> {
        let framing = (SALT_LEN + MAC_LEN) as u64;
        let min_len = framing + MIN_CHUNK_WIRE_LEN as u64;
        if container_len < min_len {
            return Err(BackupError::Truncated(format!(
                "container length {} below minimum {}",
                container_len, min_len
            )));
        }

        let region = container_len - framing;
        let full = config.chunk_wire_len() as u64;
        let chunk_count = region.div_ceil(full);
        let last = region - (chunk_count - 1) * full;
        if last < MIN_CHUNK_WIRE_LEN as u64 {
            return Err(BackupError::Truncated(format!(
                "declared length leaves a {}-byte final chunk",
                last
            )));
        }

        Ok(Self {
            chunk_count,
            full_wire_len: full as usize,
            last_wire_len: last as usize,
        })
    }

    pub fn is_final(&self, index: u64) -> bool {
        index + 1 == self.chunk_count
    }

    /// Wire length of chunk `index`, `None` past the end.
    pub fn wire_len(&self, index: u64) -> Option<usize> {
        if index >= self.chunk_count {
            None
        } else if self.is_final(index) {
            Some(self.last_wire_len)
        } else {
            Some(self.full_wire_len)
        }
    }

    pub fn container_len(&self) -> u64 {
        (SALT_LEN + MAC_LEN) as u64
            + (self.chunk_count - 1) * self.full_wire_len as u64
            + self.last_wire_len as u64
    }
}

/// One authenticated chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedChunk {
    pub index: u64,
    pub is_final: bool,
    /// Content bytes (the first `used` data bytes). Filler is dropped.
    pub content: Vec<u8>,
    /// Data bytes carried, content plus filler.
    pub data_len: usize,
    pub wire_len: usize,
}

impl OpenedChunk {
    /// True once content stops short of the chunk capacity; every later chunk is padding.
    pub fn ends_content(&self) -> bool {
        self.content.len() < self.data_len
    }

    pub fn is_padding(&self) -> bool {
        self.content.is_empty()
    }
}
