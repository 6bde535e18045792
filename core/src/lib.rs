//! backup-container
//!
//! Padded, authenticated, streaming container for account backups.
//! Header record and opaque frames in, fixed-size AEAD chunks plus an
//! HMAC trailer out. No async, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;
pub mod padding;

pub mod headers;
pub mod crypto;
pub mod telemetry;

// Stream layers
pub mod stream;

pub use config::{expected_container_len, CipherSuite, ContainerConfig};
pub use types::{BackupError, Result};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{expected_container_len, CipherSuite, ContainerConfig};
    pub use crate::crypto::keys::{KeyMaterial, KeyProfile};
    pub use crate::headers::BackupHeader;
    pub use crate::padding::{bucket_size, PaddingBuckets};
    pub use crate::stream::{
        BackupReader, BackupWriter, ChunkSink, EncryptedBackupReader, EncryptedBackupWriter, Frame,
        PlainTextBackupReader, PlainTextBackupWriter, WriteSink, WriterState,
    };
    pub use crate::telemetry::ContainerSummary;
    pub use crate::types::{BackupError, Result};
}
