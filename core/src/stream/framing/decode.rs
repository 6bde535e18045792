use std::io::{ErrorKind, Read};

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;

use crate::constants::FRAME_PREFIX_LEN;
use crate::stream::framing::types::FrameError;

/// Fill `buf` as far as the stream allows. Returns the bytes read; short only at end of stream.
fn read_up_to<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<usize, FrameError> {
    let mut off = 0;
    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(FrameError::Io(e)),
        }
    }
    Ok(off)
}

/// Decode a single frame from `r`.
///
/// - zero bytes left: `Ok(None)`, the normal end of content
/// - 1..=3 prefix bytes: `PartialPrefix`
/// - length above `max_frame_len`: `TooLarge`, nothing is allocated
/// - fewer payload bytes than declared: `Truncated`
pub fn read_frame<R: Read>(r: &mut R, max_frame_len: u32) -> Result<Option<Bytes>, FrameError> {
    let mut prefix = [0u8; FRAME_PREFIX_LEN];
    let have = read_up_to(r, &mut prefix)?;
    if have == 0 {
        return Ok(None);
    }
    if have < FRAME_PREFIX_LEN {
        return Err(FrameError::PartialPrefix { have });
    }

    let len = LittleEndian::read_u32(&prefix);
    if len > max_frame_len {
        return Err(FrameError::TooLarge { len: len as u64, max: max_frame_len });
    }

    let len = len as usize;
    let mut payload = vec![0u8; len];
    let got = read_up_to(r, &mut payload)?;
    if got != len {
        return Err(FrameError::Truncated { expected: len, actual: got });
    }

    Ok(Some(Bytes::from(payload)))
}
