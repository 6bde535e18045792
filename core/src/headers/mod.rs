//! headers/mod.rs
//! The header record: the first frame of every container.
//!
//! Notes:
//! - The record travels through FrameCodec like any other frame; this module
//!   only defines its payload layout.
//! - Little-endian throughout, fixed prefix followed by variable metadata.
//! - A CRC32 closes the record so the unauthenticated plaintext profile can
//!   still detect a corrupted header. Encrypted containers get integrity from
//!   the chunk AEAD on top of that.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
