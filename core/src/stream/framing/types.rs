use std::fmt;
use std::io::{Read, Write};

use bytes::Bytes;

use crate::constants::{DEFAULT_MAX_FRAME_LEN, FRAME_PREFIX_LEN};

/// One opaque unit of account state. Only its length matters to the container.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Frame(Bytes);

impl Frame {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Frame(payload.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bytes this frame occupies on the content stream.
    pub fn encoded_len(&self) -> usize {
        FRAME_PREFIX_LEN + self.0.len()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Frame {
    fn from(v: Vec<u8>) -> Self {
        Frame(Bytes::from(v))
    }
}

impl From<&[u8]> for Frame {
    fn from(v: &[u8]) -> Self {
        Frame(Bytes::copy_from_slice(v))
    }
}

impl From<Bytes> for Frame {
    fn from(b: Bytes) -> Self {
        Frame(b)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({} bytes)", self.0.len())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream ended inside the 4-byte length prefix.
    #[error("stream ended mid-prefix after {have} of 4 bytes")]
    PartialPrefix { have: usize },

    /// Declared length exceeds the sanity ceiling.
    #[error("frame length {len} exceeds ceiling {max}")]
    TooLarge { len: u64, max: u32 },

    /// The stream ended inside the payload.
    #[error("frame truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Frame codec with a fixed length ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    max_frame_len: u32,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl FrameCodec {
    pub fn new(max_frame_len: u32) -> Self {
        Self { max_frame_len }
    }

    pub fn max_frame_len(&self) -> u32 {
        self.max_frame_len
    }

    /// Write `u32le(len) ‖ payload`. Returns bytes written.
    pub fn write<W: Write>(&self, sink: &mut W, payload: &[u8]) -> Result<usize, FrameError> {
        super::encode::write_frame(sink, payload, self.max_frame_len)
    }

    /// Encode into a new buffer.
    pub fn encode(&self, payload: &[u8]) -> Result<Vec<u8>, FrameError> {
        super::encode::encode_frame(payload, self.max_frame_len)
    }

    /// Read one frame; `Ok(None)` on a clean end of content.
    pub fn read<R: Read>(&self, stream: &mut R) -> Result<Option<Bytes>, FrameError> {
        super::decode::read_frame(stream, self.max_frame_len)
    }
}
