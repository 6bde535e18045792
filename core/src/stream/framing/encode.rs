use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::constants::FRAME_PREFIX_LEN;
use crate::stream::framing::types::FrameError;

#[inline]
fn check_len(payload: &[u8], max_frame_len: u32) -> Result<u32, FrameError> {
    if payload.len() as u64 > max_frame_len as u64 {
        return Err(FrameError::TooLarge { len: payload.len() as u64, max: max_frame_len });
    }
    Ok(payload.len() as u32)
}

/// Encode a frame into canonical wire format.
///
/// Layout:
///
/// ```text
/// [ payload_len (4, little-endian) ]
/// [ payload (payload_len) ]
/// ```
pub fn encode_frame(payload: &[u8], max_frame_len: u32) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::with_capacity(FRAME_PREFIX_LEN + payload.len());
    write_frame(&mut out, payload, max_frame_len)?;
    Ok(out)
}

/// Stream a frame into `sink`. Returns the number of bytes written.
pub fn write_frame<W: Write>(sink: &mut W, payload: &[u8], max_frame_len: u32) -> Result<usize, FrameError> {
    let len = check_len(payload, max_frame_len)?;
    sink.write_u32::<LittleEndian>(len)?;
    sink.write_all(payload)?;
    Ok(FRAME_PREFIX_LEN + payload.len())
}
