//! telemetry/snapshot.rs
//! Immutable summary of one finished container.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::ContainerCounters;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSummary {
    /// Key profile used ("local", "forward-secret" or "plaintext").
    pub profile: String,
    pub frames_data: u64,
    pub bytes_content: u64,
    pub bytes_padding: u64,
    pub chunks: u64,
    /// Total container length; what a reader must be given as the declared length.
    pub container_len: u64,
    /// Padding overhead relative to content, 0.0 when there is no content.
    pub padding_ratio: f64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
}

impl ContainerSummary {
    pub fn from_counters(profile: &str, counters: &ContainerCounters, elapsed: Duration) -> Self {
        let padding_ratio = if counters.bytes_content > 0 {
            counters.bytes_padding as f64 / counters.bytes_content as f64
        } else {
            0.0
        };
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_content as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            profile: profile.to_string(),
            frames_data: counters.frames_data,
            bytes_content: counters.bytes_content,
            bytes_padding: counters.bytes_padding,
            chunks: counters.chunks,
            container_len: counters.bytes_wire,
            padding_ratio,
            throughput_bytes_per_sec: throughput,
            elapsed,
        }
    }

    /// Content plus padding: the padding bucket this container landed in.
    pub fn padded_len(&self) -> u64 {
        self.bytes_content + self.bytes_padding
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
