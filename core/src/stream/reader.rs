//! stream/reader.rs
//! Encrypted backup reader.
//!
//! Design notes:
//! - The declared container length fixes the chunk layout before any byte is
//!   read; chunks are decrypted lazily as frames are pulled.
//! - At the end of frames the remaining padding chunks and the MAC trailer
//!   are read and verified, and the source must end right there.
//! - The first error fuses the reader.

use std::io::{self, ErrorKind, Read};

use tracing::{debug, warn};

use crate::config::ContainerConfig;
use crate::constants::{CHUNK_PREFIX_LEN, FRAME_PREFIX_LEN, MAC_LEN, SALT_LEN};
use crate::crypto::keys::{KeyMaterial, KeyProfile};
use crate::headers::{decode_header, BackupHeader};
use crate::stream::cipher::{ChunkDecryptor, ChunkLayout, OpenedChunk};
use crate::stream::framing::{Frame, FrameCodec};
use crate::stream::BackupReader;
use crate::telemetry::ContainerCounters;
use crate::types::{BackupError, Result};

fn read_exact_or_truncated<R: Read>(source: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    source.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            BackupError::Truncated(format!("stream ended inside {}", what))
        } else {
            BackupError::from(e)
        }
    })
}

/// Decrypted content stream over the chunk sequence.
struct ChunkStream<R> {
    source: R,
    decryptor: ChunkDecryptor,
    wire: Vec<u8>,
    current: Vec<u8>,
    pos: usize,
    /// Wire length of the chunk in `current`, 0 before the first chunk.
    current_wire: usize,
    /// Salt plus wire of chunks fully behind `current`.
    consumed: u64,
    content_ended: bool,
    finished: bool,
    counters: ContainerCounters,
}

impl<R: Read> ChunkStream<R> {
    fn new(source: R, decryptor: ChunkDecryptor) -> Self {
        let mut counters = ContainerCounters::default();
        counters.add_wire(SALT_LEN);
        Self {
            source,
            decryptor,
            wire: Vec::new(),
            current: Vec::new(),
            pos: 0,
            current_wire: 0,
            consumed: SALT_LEN as u64,
            content_ended: false,
            finished: false,
            counters,
        }
    }

    fn load_next(&mut self) -> Result<Option<OpenedChunk>> {
        let Some(wire_len) = self.decryptor.next_wire_len() else {
            return Ok(None);
        };
        self.wire.resize(wire_len, 0);
        read_exact_or_truncated(&mut self.source, &mut self.wire, "a chunk")?;
        let chunk = self.decryptor.open_next(&self.wire)?;

        self.consumed += self.current_wire as u64;
        self.current_wire = wire_len;
        self.counters.add_chunk(wire_len);
        Ok(Some(chunk))
    }

    fn bytes_read(&self) -> u64 {
        if self.current_wire == 0 {
            self.consumed
        } else {
            self.consumed + (CHUNK_PREFIX_LEN + self.pos) as u64
        }
    }

    /// Drain padding, verify the trailer, and require the source to end.
    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        while let Some(chunk) = self.load_next()? {
            if !chunk.is_padding() {
                return Err(BackupError::MalformedLength(format!(
                    "content in chunk {} after the end of content",
                    chunk.index
                )));
            }
            self.counters.add_padding(chunk.data_len as u64);
        }

        let mut trailer = [0u8; MAC_LEN];
        read_exact_or_truncated(&mut self.source, &mut trailer, "the MAC trailer")?;
        self.decryptor.verify_trailer(&trailer)?;

        let mut probe = [0u8; 1];
        loop {
            match self.source.read(&mut probe) {
                Ok(0) => break,
                Ok(_) => {
                    return Err(BackupError::MalformedLength(
                        "bytes past the declared container length".into(),
                    ))
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.consumed += (self.current_wire + MAC_LEN) as u64;
        self.counters.add_wire(MAC_LEN);
        self.current_wire = 0;
        self.current.clear();
        self.pos = 0;
        self.finished = true;
        Ok(())
    }
}

impl<R: Read> Read for ChunkStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.current.len() {
                let n = (self.current.len() - self.pos).min(buf.len());
                buf[..n].copy_from_slice(&self.current[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.content_ended || buf.is_empty() {
                return Ok(0);
            }
            match self.load_next().map_err(BackupError::into_io)? {
                Some(chunk) => {
                    if chunk.ends_content() {
                        self.content_ended = true;
                        self.counters.add_padding((chunk.data_len - chunk.content.len()) as u64);
                    }
                    self.current = chunk.content;
                    self.pos = 0;
                }
                None => self.content_ended = true,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Open,
    Finished,
    Failed,
}

pub struct EncryptedBackupReader<R: Read> {
    stream: ChunkStream<R>,
    codec: FrameCodec,
    header: BackupHeader,
    peeked: Option<Frame>,
    state: ReaderState,
    stream_length: u64,
    counters: ContainerCounters,
}

impl<R: Read> EncryptedBackupReader<R> {
    /// Read the salt, derive keys for `profile` and decode the header record.
    pub fn open(source: R, declared_length: u64, profile: &KeyProfile, config: ContainerConfig) -> Result<Self> {
        let material = profile.derive()?;
        let reader = Self::open_with_material(source, declared_length, &material, config)?;
        debug!(profile = profile.name(), "profile keys derived");
        Ok(reader)
    }

    pub fn open_with_material(
        mut source: R,
        declared_length: u64,
        material: &KeyMaterial,
        config: ContainerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let layout = ChunkLayout::from_container_len(declared_length, &config)?;

        let mut salt = [0u8; SALT_LEN];
        read_exact_or_truncated(&mut source, &mut salt, "the salt")?;
        let decryptor = ChunkDecryptor::new(material, config, &salt, declared_length)?;

        let codec = FrameCodec::new(config.max_frame_len);
        let mut stream = ChunkStream::new(source, decryptor);
        let record = codec
            .read(&mut stream)?
            .ok_or_else(|| BackupError::Truncated("container holds no header record".into()))?;
        let header = decode_header(&record)?;

        let mut counters = ContainerCounters::default();
        counters.add_header(FRAME_PREFIX_LEN + record.len());
        debug!(
            declared_length,
            chunks = layout.chunk_count,
            header = %header.summary(),
            "reader opened"
        );

        Ok(Self {
            stream,
            codec,
            header,
            peeked: None,
            state: ReaderState::Open,
            stream_length: declared_length,
            counters,
        })
    }

    /// Next frame, `Ok(None)` once the container was fully verified.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(frame) = self.peeked.take() {
            return Ok(Some(frame));
        }
        match self.state {
            ReaderState::Open => self.pull(),
            ReaderState::Finished => Ok(None),
            ReaderState::Failed => Err(self.fused()),
        }
    }

    /// Frame and chunk counters so far. Padding is counted as chunks are opened.
    pub fn counters(&self) -> ContainerCounters {
        let mut all = self.counters.clone();
        all += self.stream.counters.clone();
        all
    }

    pub fn is_finished(&self) -> bool {
        self.state == ReaderState::Finished
    }

    fn fused(&self) -> BackupError {
        BackupError::Sequencing("reader failed earlier; import aborted".into())
    }

    fn fail(&mut self, e: BackupError) -> BackupError {
        self.state = ReaderState::Failed;
        warn!(error = %e, bytes_read = self.stream.bytes_read(), "import aborted");
        e
    }

    fn pull(&mut self) -> Result<Option<Frame>> {
        match self.codec.read(&mut self.stream) {
            Ok(Some(payload)) => {
                self.counters.add_frame(FRAME_PREFIX_LEN + payload.len());
                Ok(Some(Frame::from(payload)))
            }
            Ok(None) => match self.stream.finish() {
                Ok(()) => {
                    self.state = ReaderState::Finished;
                    debug!(
                        frames = self.counters.frames_data,
                        bytes_read = self.stream.bytes_read(),
                        "reader finished"
                    );
                    Ok(None)
                }
                Err(e) => Err(self.fail(e)),
            },
            Err(e) => Err(self.fail(e.into())),
        }
    }
}

impl<R: Read> BackupReader for EncryptedBackupReader<R> {
    fn header(&self) -> &BackupHeader {
        &self.header
    }

    fn has_next(&mut self) -> Result<bool> {
        if self.peeked.is_some() {
            return Ok(true);
        }
        match self.state {
            ReaderState::Finished => Ok(false),
            ReaderState::Failed => Err(self.fused()),
            ReaderState::Open => {
                self.peeked = self.pull()?;
                Ok(self.peeked.is_some())
            }
        }
    }

    fn bytes_read(&self) -> u64 {
        self.stream.bytes_read()
    }

    fn stream_length(&self) -> u64 {
        self.stream_length
    }
}

impl<R: Read> Iterator for EncryptedBackupReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ReaderState::Failed {
            return None;
        }
        self.next_frame().transpose()
    }
}
