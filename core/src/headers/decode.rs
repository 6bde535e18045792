//! headers/decode.rs
//! Parse and validate a header record.

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;

use crate::constants::MAX_METADATA_LEN;
use crate::headers::types::{BackupHeader, HeaderError, HeaderFlags, HEADER_MAGIC};
use crate::utils::compute_crc32;

/// Decode one complete header record. The buffer must hold exactly the record.
pub fn decode_header(buf: &[u8]) -> Result<BackupHeader, HeaderError> {
    let min = BackupHeader::PREFIX_LEN + BackupHeader::SUFFIX_LEN;
    if buf.len() < min {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need: min });
    }

    // --- fixed offsets ---
    let mut off = 0;

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&buf[off..off + 4]);
    off += 4;
    if magic != HEADER_MAGIC {
        return Err(HeaderError::InvalidMagic { have: magic, need: HEADER_MAGIC });
    }

    let version = LittleEndian::read_u16(&buf[off..off + 2]);
    off += 2;

    let raw_flags = LittleEndian::read_u16(&buf[off..off + 2]);
    off += 2;
    let flags = HeaderFlags::from_bits(raw_flags)
        .ok_or(HeaderError::UnknownFlags { raw: raw_flags })?;

    let created_at_ms = LittleEndian::read_i64(&buf[off..off + 8]);
    off += 8;

    let metadata_len = LittleEndian::read_u32(&buf[off..off + 4]) as usize;
    off += 4;
    if metadata_len > MAX_METADATA_LEN {
        return Err(HeaderError::MetadataTooLarge { have: metadata_len, max: MAX_METADATA_LEN });
    }

    let need = off + metadata_len + BackupHeader::SUFFIX_LEN;
    if buf.len() < need {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need });
    }
    if buf.len() > need {
        return Err(HeaderError::TrailingBytes { extra: buf.len() - need });
    }

    let metadata = (metadata_len > 0).then(|| Bytes::copy_from_slice(&buf[off..off + metadata_len]));
    off += metadata_len;

    // CRC32 covers every byte before it
    let stored = LittleEndian::read_u32(&buf[off..off + 4]);
    let computed = compute_crc32(&buf[..off]);
    if stored != computed {
        return Err(HeaderError::InvalidCrc32 { have: stored, need: computed });
    }

    let header = BackupHeader { version, flags, created_at_ms, metadata };
    header.validate()?;
    Ok(header)
}
