//! Segment headers and the derived per-segment descriptor.

use serde::{Deserialize, Serialize};

use crate::image::reader::{ByteReader, Result};

/// Size of the on-disk segment header.
pub const SEGMENT_HEADER_SIZE: usize = 8;

/// On-disk segment header; `data_len` raw bytes follow immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentHeader {
    pub load_addr: u32,
    pub data_len: u32,
}

impl SegmentHeader {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            load_addr: reader.read_u32()?,
            data_len: reader.read_u32()?,
        })
    }

    pub fn to_bytes(&self) -> [u8; SEGMENT_HEADER_SIZE] {
        let mut out = [0u8; SEGMENT_HEADER_SIZE];
        out[..4].copy_from_slice(&self.load_addr.to_le_bytes());
        out[4..].copy_from_slice(&self.data_len.to_le_bytes());
        out
    }
}

/// A decoded segment with the file offset of its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub load_addr: u32,
    pub data_len: u32,
    /// Offset in the raw file where the segment data starts
    pub file_offset: u64,
}

impl SegmentInfo {
    pub fn start(&self) -> u64 {
        self.load_addr as u64
    }

    /// Exclusive end address; computed in 64 bits so it cannot wrap.
    pub fn end(&self) -> u64 {
        self.load_addr as u64 + self.data_len as u64
    }

    /// File offset one past the last data byte.
    pub fn file_end(&self) -> u64 {
        self.file_offset + self.data_len as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data_len == 0
    }
}
