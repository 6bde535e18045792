//! stream/plaintext.rs
//! Unencrypted, unpadded variant of the container.
//!
//! The byte stream is just the header record frame followed by the data
//! frames. Only the header CRC protects anything; use it for local debugging
//! and tests, never for data leaving the device.

use std::io::{Read, Take, Write};
use std::time::Instant;

use tracing::{debug, warn};

use crate::constants::FRAME_PREFIX_LEN;
use crate::headers::{decode_header, encode_header, BackupHeader};
use crate::stream::framing::{Frame, FrameCodec};
use crate::stream::io::CountingReader;
use crate::stream::{BackupReader, BackupWriter, WriterState};
use crate::telemetry::{ContainerCounters, ContainerSummary};
use crate::types::{BackupError, Result};

pub struct PlainTextBackupWriter<W: Write> {
    sink: W,
    codec: FrameCodec,
    state: WriterState,
    counters: ContainerCounters,
    started: Instant,
}

impl<W: Write> PlainTextBackupWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_codec(sink, FrameCodec::default())
    }

    pub fn with_codec(sink: W, codec: FrameCodec) -> Self {
        Self {
            sink,
            codec,
            state: WriterState::Created,
            counters: ContainerCounters::default(),
            started: Instant::now(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn emit(&mut self, payload: &[u8]) -> Result<usize> {
        match self.codec.write(&mut self.sink, payload) {
            Ok(n) => {
                self.counters.add_wire(n);
                Ok(n)
            }
            Err(e) => {
                let e = BackupError::from(e);
                if matches!(e, BackupError::Io(_)) {
                    self.state = WriterState::Failed;
                    warn!(error = %e, "plaintext writer failed");
                }
                Err(e)
            }
        }
    }

    fn refuse(&self, op: &str) -> BackupError {
        BackupError::Sequencing(format!("{} not allowed in state {:?}", op, self.state))
    }
}

impl<W: Write> BackupWriter for PlainTextBackupWriter<W> {
    fn write_header(&mut self, header: &BackupHeader) -> Result<()> {
        if self.state != WriterState::Created {
            return Err(self.refuse("write_header"));
        }
        let record = encode_header(header)?;
        let n = self.emit(&record)?;
        self.counters.add_header(n);
        self.state = WriterState::HeaderWritten;
        debug!(header_len = n, "plaintext header written");
        Ok(())
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        if self.state != WriterState::HeaderWritten {
            return Err(self.refuse("write_frame"));
        }
        let n = self.emit(frame)?;
        self.counters.add_frame(n);
        Ok(())
    }

    fn close(&mut self) -> Result<ContainerSummary> {
        if self.state != WriterState::HeaderWritten {
            return Err(self.refuse("close"));
        }
        if let Err(e) = self.sink.flush() {
            self.state = WriterState::Failed;
            return Err(e.into());
        }
        self.state = WriterState::Finalized;
        Ok(ContainerSummary::from_counters("plaintext", &self.counters, self.started.elapsed()))
    }

    fn state(&self) -> WriterState {
        self.state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Open,
    Finished,
    Failed,
}

pub struct PlainTextBackupReader<R: Read> {
    source: CountingReader<Take<R>>,
    codec: FrameCodec,
    header: BackupHeader,
    peeked: Option<Frame>,
    state: ReaderState,
    stream_length: u64,
    counters: ContainerCounters,
}

impl<R: Read> PlainTextBackupReader<R> {
    pub fn open(source: R, declared_length: u64) -> Result<Self> {
        Self::open_with_codec(source, declared_length, FrameCodec::default())
    }

    pub fn open_with_codec(source: R, declared_length: u64, codec: FrameCodec) -> Result<Self> {
        let mut source = CountingReader::new(source.take(declared_length));
        let record = codec
            .read(&mut source)?
            .ok_or_else(|| BackupError::Truncated("stream holds no header record".into()))?;
        let header = decode_header(&record)?;

        let mut counters = ContainerCounters::default();
        counters.add_header(FRAME_PREFIX_LEN + record.len());
        debug!(declared_length, "plaintext reader opened");

        Ok(Self {
            source,
            codec,
            header,
            peeked: None,
            state: ReaderState::Open,
            stream_length: declared_length,
            counters,
        })
    }

    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(frame) = self.peeked.take() {
            return Ok(Some(frame));
        }
        match self.state {
            ReaderState::Open => self.pull(),
            ReaderState::Finished => Ok(None),
            ReaderState::Failed => Err(BackupError::Sequencing("reader failed earlier".into())),
        }
    }

    pub fn counters(&self) -> &ContainerCounters {
        &self.counters
    }

    fn pull(&mut self) -> Result<Option<Frame>> {
        let result = match self.codec.read(&mut self.source) {
            Ok(Some(payload)) => {
                self.counters.add_frame(FRAME_PREFIX_LEN + payload.len());
                Ok(Some(Frame::from(payload)))
            }
            Ok(None) if self.source.count() == self.stream_length => {
                self.state = ReaderState::Finished;
                Ok(None)
            }
            Ok(None) => Err(BackupError::Truncated(format!(
                "stream ended at {} of {} declared bytes",
                self.source.count(),
                self.stream_length
            ))),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            self.state = ReaderState::Failed;
            warn!(error = %e, "plaintext import aborted");
        }
        result
    }
}

impl<R: Read> BackupReader for PlainTextBackupReader<R> {
    fn header(&self) -> &BackupHeader {
        &self.header
    }

    fn has_next(&mut self) -> Result<bool> {
        if self.peeked.is_some() {
            return Ok(true);
        }
        match self.state {
            ReaderState::Finished => Ok(false),
            ReaderState::Failed => Err(BackupError::Sequencing("reader failed earlier".into())),
            ReaderState::Open => {
                self.peeked = self.pull()?;
                Ok(self.peeked.is_some())
            }
        }
    }

    fn bytes_read(&self) -> u64 {
        // A peeked frame is already counted.
        self.source.count()
    }

    fn stream_length(&self) -> u64 {
        self.stream_length
    }
}

impl<R: Read> Iterator for PlainTextBackupReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ReaderState::Failed {
            return None;
        }
        self.next_frame().transpose()
    }
}
