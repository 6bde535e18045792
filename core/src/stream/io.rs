//! stream/io.rs
//! Sinks for container bytes and normalized input sources.
//!
//! Design notes:
//! - The writer hands every produced byte slice to a `ChunkSink`, in order.
//!   Any `FnMut(&[u8]) -> io::Result<()>` closure is a sink, and `WriteSink`
//!   adapts an `io::Write`.
//! - Readers need the declared container length up front. `open_input`
//!   resolves it from the file metadata or buffer length.

use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;

/// Destination for container bytes.
pub trait ChunkSink {
    /// Accept the next slice of container bytes. Errors abort the container.
    fn accept(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<F> ChunkSink for F
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    fn accept(&mut self, bytes: &[u8]) -> io::Result<()> {
        self(bytes)
    }
}

/// `io::Write` adapter.
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ChunkSink for WriteSink<W> {
    fn accept(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Canonical input abstraction.
pub enum InputSource {
    /// Reader with an explicitly declared length.
    Reader(Box<dyn Read + Send>, u64),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Normalize an input source into a boxed reader plus its declared length.
pub fn open_input(src: InputSource) -> io::Result<(Box<dyn Read + Send>, u64)> {
    match src {
        InputSource::Reader(r, len) => Ok((r, len)),
        InputSource::File(p) => {
            let file = File::open(p)?;
            let len = file.metadata()?.len();
            Ok((Box::new(io::BufReader::new(file)), len))
        }
        InputSource::Memory(b) => {
            let len = b.len() as u64;
            Ok((Box::new(Cursor::new(b)), len))
        }
    }
}

/// Counts bytes pulled through an inner reader.
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
