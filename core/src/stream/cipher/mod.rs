//! stream/cipher
//! Chunked AEAD engine for the container body.
//!
//! Wire layout:
//!
//! ```text
//! [ salt (16) ][ chunk 0 ] ... [ chunk n-1 ][ hmac-sha256 (32) ]
//! ```
//!
//! Every chunk seals `u32le(used) ‖ data` and is `chunk_size + 16` bytes on
//! the wire except the last, which may be shorter. The chunk layout follows
//! from the container length alone, so the reader never trusts an
//! unauthenticated length field.

pub mod types;
pub mod encrypt;
pub mod decrypt;

pub use types::{ChunkLayout, OpenedChunk, MIN_CHUNK_WIRE_LEN};
pub use encrypt::ChunkEncryptor;
pub use decrypt::ChunkDecryptor;
