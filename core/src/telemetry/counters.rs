//! telemetry/counters.rs
//! Mutable counters updated by the writer, reader and chunk engine.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerCounters {
    /// Header records processed (0 or 1).
    pub frames_header: u64,
    /// Data frames processed.
    pub frames_data: u64,
    /// Framed content bytes: header and data frames, length prefixes included.
    pub bytes_content: u64,
    /// Zero bytes appended to reach the padding bucket.
    pub bytes_padding: u64,
    /// Chunks sealed or opened.
    pub chunks: u64,
    /// Container bytes emitted or consumed: salt, chunk wire and trailer.
    pub bytes_wire: u64,
}

impl ContainerCounters {
    pub fn add_header(&mut self, encoded_len: usize) {
        self.frames_header += 1;
        self.bytes_content += encoded_len as u64;
    }

    pub fn add_frame(&mut self, encoded_len: usize) {
        self.frames_data += 1;
        self.bytes_content += encoded_len as u64;
    }

    pub fn add_chunk(&mut self, wire_len: usize) {
        self.chunks += 1;
        self.bytes_wire += wire_len as u64;
    }

    /// Salt and trailer bytes.
    pub fn add_wire(&mut self, len: usize) {
        self.bytes_wire += len as u64;
    }

    pub fn add_padding(&mut self, len: u64) {
        self.bytes_padding += len;
    }

    /// Wire bytes that are not content: salt, prefixes, tags, trailer and padding.
    pub fn bytes_overhead(&self) -> u64 {
        self.bytes_wire.saturating_sub(self.bytes_content)
    }
}

impl AddAssign for ContainerCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.frames_header += rhs.frames_header;
        self.frames_data   += rhs.frames_data;
        self.bytes_content += rhs.bytes_content;
        self.bytes_padding += rhs.bytes_padding;
        self.chunks        += rhs.chunks;
        self.bytes_wire    += rhs.bytes_wire;
    }
}
