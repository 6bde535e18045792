//! Length-delimited framing of opaque payloads over a byte stream.
//!
//! Responsibilities:
//! - Define the frame record and codec errors
//! - Encode `u32le(len) ‖ payload`
//! - Decode with strict length validation and clean end-of-content detection
//!
//! Non-responsibilities:
//! - Cryptography
//! - Padding
//! - Interpreting payloads

pub mod types;
pub mod encode;
pub mod decode;

pub use types::{Frame, FrameCodec, FrameError};
