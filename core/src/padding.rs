//! padding.rs
//! Quantized padding buckets.
//!
//! Design notes:
//! - Container size must not reveal the exact content size. Content is padded
//!   up to the first boundary of a fixed, strictly increasing sequence.
//! - Boundaries grow geometrically (~5 % per step) above a floor, so the
//!   relative overhead stays bounded while small backups all collapse into the
//!   floor bucket.
//! - The table is pure data: no state, no I/O.
//! - Padding bytes are zero. Only their count carries meaning.

use crate::constants::{BUCKET_GROWTH_DEN, BUCKET_GROWTH_NUM, MIN_BUCKET_SIZE};

/// Geometric bucket table: `b0 = floor`, `b(k+1) = ceil(b(k) * num / den)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingBuckets {
    floor: u64,
    growth_num: u64,
    growth_den: u64,
}

impl Default for PaddingBuckets {
    fn default() -> Self {
        Self::standard()
    }
}

impl PaddingBuckets {
    /// The table every container uses: 16 KiB floor, 21/20 growth.
    pub const fn standard() -> Self {
        Self {
            floor: MIN_BUCKET_SIZE,
            growth_num: BUCKET_GROWTH_NUM,
            growth_den: BUCKET_GROWTH_DEN,
        }
    }

    /// Custom table. Returns `None` unless `floor > 0` and `num > den > 0`.
    pub fn new(floor: u64, growth_num: u64, growth_den: u64) -> Option<Self> {
        if floor == 0 || growth_den == 0 || growth_num <= growth_den {
            return None;
        }
        Some(Self { floor, growth_num, growth_den })
    }

    pub fn floor(&self) -> u64 {
        self.floor
    }

    /// The boundary following `b`, or `None` once the sequence leaves `u64`.
    #[inline]
    fn step(&self, b: u64) -> Option<u64> {
        let scaled = (b as u128) * (self.growth_num as u128);
        let next = scaled.div_ceil(self.growth_den as u128);
        // ceil(b * num / den) > b whenever num > den and b > 0.
        u64::try_from(next).ok()
    }

    /// Strictly increasing bucket boundaries, starting at the floor.
    pub fn boundaries(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::successors(Some(self.floor), move |&b| self.step(b))
    }

    /// Smallest boundary `>= content_len`.
    ///
    /// Past the last representable boundary the content length is returned
    /// unchanged, which keeps the function monotonic.
    pub fn bucket_size(&self, content_len: u64) -> u64 {
        self.boundaries()
            .find(|&b| b >= content_len)
            .unwrap_or(content_len)
    }

    /// Zero bytes needed to reach the bucket of `content_len`.
    pub fn padding_for(&self, content_len: u64) -> u64 {
        self.bucket_size(content_len) - content_len
    }
}

/// `PaddingBuckets::standard().bucket_size(content_len)`.
#[inline]
pub fn bucket_size(content_len: u64) -> u64 {
    PaddingBuckets::standard().bucket_size(content_len)
}
