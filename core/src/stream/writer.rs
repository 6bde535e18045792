//! stream/writer.rs
//! Encrypted, padded backup writer.
//!
//! Design notes:
//! - `Created → HeaderWritten → Finalized`; any sink failure moves to `Failed`.
//! - Frames go through `FrameCodec` straight into the chunk engine; nothing
//!   but the pending chunk is buffered.
//! - Dropping a writer after its header finalizes it.
//!
//! Security notes:
//! - Key material lives only inside the engine and is zeroized on drop.
//! - Logs carry sizes and counters, never keys or salts.

use std::io::{self, Write};
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::ContainerConfig;
use crate::constants::SALT_LEN;
use crate::crypto::keys::{KeyMaterial, KeyProfile};
use crate::headers::{encode_header, BackupHeader};
use crate::stream::cipher::ChunkEncryptor;
use crate::stream::framing::FrameCodec;
use crate::stream::io::ChunkSink;
use crate::stream::{BackupWriter, WriterState};
use crate::telemetry::{ContainerCounters, ContainerSummary};
use crate::types::{BackupError, Result};

/// Adapts engine + sink to `io::Write` so the frame codec can stream into it.
struct SealingWriter<'a, S: ChunkSink> {
    engine: &'a mut ChunkEncryptor,
    sink: &'a mut S,
}

impl<S: ChunkSink> Write for SealingWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let sink = &mut *self.sink;
        self.engine
            .append(buf, &mut |bytes: &[u8]| sink.accept(bytes).map_err(BackupError::Io))
            .map_err(BackupError::into_io)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct EncryptedBackupWriter<S: ChunkSink> {
    sink: Option<S>,
    engine: ChunkEncryptor,
    codec: FrameCodec,
    state: WriterState,
    counters: ContainerCounters,
    profile: &'static str,
    started: Instant,
}

impl<S: ChunkSink> EncryptedBackupWriter<S> {
    /// Derive keys for `profile` and prepare a container with a fresh salt.
    /// Nothing reaches the sink before `write_header`.
    pub fn new(sink: S, profile: &KeyProfile, config: ContainerConfig) -> Result<Self> {
        let material = profile.derive()?;
        let mut writer = Self::with_material(sink, &material, config)?;
        writer.profile = profile.name();
        Ok(writer)
    }

    /// Same as `new` with already derived key material.
    pub fn with_material(sink: S, material: &KeyMaterial, config: ContainerConfig) -> Result<Self> {
        let engine = ChunkEncryptor::new(material, config)?;
        Ok(Self {
            sink: Some(sink),
            engine,
            codec: FrameCodec::new(config.max_frame_len),
            state: WriterState::Created,
            counters: ContainerCounters::default(),
            profile: "custom",
            started: Instant::now(),
        })
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        self.engine.salt()
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn counters(&self) -> &ContainerCounters {
        &self.counters
    }

    /// Close if still open, then hand back the sink.
    pub fn into_sink(mut self) -> Result<S> {
        if self.state == WriterState::HeaderWritten {
            self.close()?;
        }
        self.sink
            .take()
            .ok_or_else(|| BackupError::Sequencing("sink already taken".into()))
    }

    fn refuse(&self, op: &str) -> BackupError {
        let why = match self.state {
            WriterState::Created => "header not written yet",
            WriterState::HeaderWritten => "header already written",
            WriterState::Finalized => "writer already closed",
            WriterState::Failed => "writer failed earlier; container is unusable",
        };
        BackupError::Sequencing(format!("{}: {}", op, why))
    }

    /// Frame `payload` into the engine. A failure poisons the writer.
    fn push(&mut self, payload: &[u8]) -> Result<usize> {
        let codec = self.codec;
        let result = match self.sink.as_mut() {
            Some(sink) => {
                let mut out = SealingWriter { engine: &mut self.engine, sink };
                codec.write(&mut out, payload).map_err(BackupError::from)
            }
            None => Err(BackupError::Sequencing("sink already taken".into())),
        };
        if let Err(e) = &result {
            self.state = WriterState::Failed;
            warn!(error = %e, "encrypted writer failed");
        }
        result
    }

    fn check_frame_len(&self, len: usize) -> Result<()> {
        if len as u64 > self.codec.max_frame_len() as u64 {
            return Err(BackupError::MalformedLength(format!(
                "frame of {} bytes exceeds ceiling {}",
                len,
                self.codec.max_frame_len()
            )));
        }
        Ok(())
    }
}

impl<S: ChunkSink> BackupWriter for EncryptedBackupWriter<S> {
    fn write_header(&mut self, header: &BackupHeader) -> Result<()> {
        if self.state != WriterState::Created {
            return Err(self.refuse("write_header"));
        }
        let record = encode_header(header)?;
        self.check_frame_len(record.len())?;

        let written = self.push(&record)?;
        self.counters.add_header(written);
        self.state = WriterState::HeaderWritten;
        debug!(profile = self.profile, header_len = written, "header written");
        Ok(())
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        if self.state != WriterState::HeaderWritten {
            return Err(self.refuse("write_frame"));
        }
        self.check_frame_len(frame.len())?;

        let written = self.push(frame)?;
        self.counters.add_frame(written);
        Ok(())
    }

    fn close(&mut self) -> Result<ContainerSummary> {
        if self.state != WriterState::HeaderWritten {
            return Err(self.refuse("close"));
        }

        let result = match self.sink.as_mut() {
            Some(sink) => {
                let sealed = self
                    .engine
                    .finalize(&mut |bytes: &[u8]| sink.accept(bytes).map_err(BackupError::Io));
                sealed.and_then(|engine_counters| {
                    sink.flush()?;
                    Ok(engine_counters)
                })
            }
            None => Err(BackupError::Sequencing("sink already taken".into())),
        };

        match result {
            Ok(engine_counters) => {
                self.counters += engine_counters;
                self.state = WriterState::Finalized;
                let summary =
                    ContainerSummary::from_counters(self.profile, &self.counters, self.started.elapsed());
                debug!(
                    profile = self.profile,
                    frames = summary.frames_data,
                    container_len = summary.container_len,
                    "writer closed"
                );
                Ok(summary)
            }
            Err(e) => {
                self.state = WriterState::Failed;
                warn!(error = %e, "finalize failed");
                Err(e)
            }
        }
    }

    fn state(&self) -> WriterState {
        self.state
    }
}

impl<S: ChunkSink> Drop for EncryptedBackupWriter<S> {
    fn drop(&mut self) {
        if self.state == WriterState::HeaderWritten {
            warn!(profile = self.profile, "writer dropped without close; finalizing");
            if let Err(e) = self.close() {
                warn!(error = %e, "finalize on drop failed");
            }
        }
    }
}
