//! crypto/aad.rs
//! Per-chunk associated data.
//!
//! AAD = container invariants + chunk invariants known before encryption:
//!
//! ```text
//! [ magic "BKC1" (4) ][ version (2) ][ cipher (2) ][ chunk_size (4) ]
//! [ chunk_index (8) ][ final (1) ]
//! ```
//!
//! Binding the final flag stops truncation at a chunk boundary: the chunk the
//! reader expects to be last must have been sealed as last.

use crate::config::ContainerConfig;
use crate::constants::{CONTAINER_VERSION, MAGIC_BKC1};

/// Fixed AAD length.
pub const AAD_LEN: usize = 4 + 2 + 2 + 4 + 8 + 1;

#[inline]
pub fn build_chunk_aad(config: &ContainerConfig, chunk_index: u64, is_final: bool) -> [u8; AAD_LEN] {
    let mut out = [0u8; AAD_LEN];
    out[0..4].copy_from_slice(&MAGIC_BKC1);
    out[4..6].copy_from_slice(&CONTAINER_VERSION.to_le_bytes());
    out[6..8].copy_from_slice(&config.cipher.id().to_le_bytes());
    out[8..12].copy_from_slice(&config.chunk_size.to_le_bytes());
    out[12..20].copy_from_slice(&chunk_index.to_le_bytes());
    out[20] = is_final as u8;
    out
}
