//! stream
//! Writers and readers for backup containers.
//!
//! Design notes:
//! - Content stream = header record frame, then data frames, each `u32le(len) ‖ payload`.
//! - The encrypted pair pads the content stream to a bucket and seals it in
//!   fixed-size AEAD chunks; the plaintext pair writes it as is.
//! - Both pairs share the `BackupWriter` / `BackupReader` surface so callers can
//!   swap one for the other.

pub mod framing;
pub mod io;
pub mod cipher;
pub mod writer;
pub mod reader;
pub mod plaintext;

pub use framing::{Frame, FrameCodec, FrameError};
pub use io::{open_input, ChunkSink, CountingReader, InputSource, WriteSink};
pub use writer::EncryptedBackupWriter;
pub use reader::EncryptedBackupReader;
pub use plaintext::{PlainTextBackupReader, PlainTextBackupWriter};

use crate::headers::BackupHeader;
use crate::telemetry::ContainerSummary;
use crate::types::Result;

/// Lifecycle of a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Created,
    HeaderWritten,
    Finalized,
    /// The sink failed; the container is unusable.
    Failed,
}

/// Producer side: one header, any number of frames, exactly one close.
pub trait BackupWriter {
    fn write_header(&mut self, header: &BackupHeader) -> Result<()>;
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;
    fn close(&mut self) -> Result<ContainerSummary>;
    fn state(&self) -> WriterState;
}

/// Consumer side: header up front, frames lazily.
pub trait BackupReader: Iterator<Item = Result<Frame>> {
    fn header(&self) -> &BackupHeader;
    fn has_next(&mut self) -> Result<bool>;
    /// Container bytes consumed so far.
    fn bytes_read(&self) -> u64;
    /// The declared container length.
    fn stream_length(&self) -> u64;
}
