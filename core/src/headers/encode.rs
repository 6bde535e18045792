//! headers/encode.rs
//! Serialize a `BackupHeader` into its record bytes.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::headers::types::{BackupHeader, HeaderError, HEADER_MAGIC};
use crate::utils::compute_crc32;

/// Serialize `h` into a freshly allocated record.
///
/// Validation runs first so an invalid header never reaches the wire.
pub fn encode_header(h: &BackupHeader) -> Result<Vec<u8>, HeaderError> {
    h.validate()?;

    let mut out = Vec::with_capacity(h.encoded_len());

    // Writes into a Vec are infallible; the io::Result is an artifact of the trait.
    out.extend_from_slice(&HEADER_MAGIC);
    let _ = out.write_u16::<LittleEndian>(h.version);
    let _ = out.write_u16::<LittleEndian>(h.flags.bits());
    let _ = out.write_i64::<LittleEndian>(h.created_at_ms);
    let _ = out.write_u32::<LittleEndian>(h.metadata_len() as u32);
    if let Some(meta) = &h.metadata {
        out.extend_from_slice(meta);
    }

    let crc = compute_crc32(&out);
    let _ = out.write_u32::<LittleEndian>(crc);

    debug_assert_eq!(out.len(), h.encoded_len(), "encoding wrote incorrect length");
    Ok(out)
}
