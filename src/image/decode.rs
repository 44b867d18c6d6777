//! Sequential decoder: header, then back-to-back segments.
//!
//! The decoder trusts nothing but also judges nothing beyond readability.
//! It does not check segment lengths against the file size or against the
//! chip's address map; that is the reconciler's job.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::image::header::{ImageHeader, IMAGE_HEADER_SIZE};
use crate::image::reader::ByteReader;
use crate::image::segment::{SegmentHeader, SegmentInfo, SEGMENT_HEADER_SIZE};

/// Nothing usable could be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Image header truncated: need {needed} bytes, found {found}")]
    HeaderTruncated { needed: usize, found: usize },
}

/// The segment table ended early; the segments before it are still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truncation {
    /// Offset of the segment header that could not be read
    pub offset: u64,
    /// Segments successfully read
    pub read: usize,
    /// Segments that should have been read (declared count, capped)
    pub declared: usize,
}

/// Result of decoding an image buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedImage {
    pub header: ImageHeader,
    pub segments: Vec<SegmentInfo>,
    /// Set when fewer than the declared segments could be read
    pub truncation: Option<Truncation>,
}

impl DecodedImage {
    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    pub fn entry_point(&self) -> u64 {
        self.header.entry_addr as u64
    }
}

/// Decode the header and up to 16 segment descriptors from `data`.
///
/// A short header is fatal. A short segment table is not: the segments read
/// so far are returned and `truncation` records where decoding stopped.
pub fn decode(data: &[u8]) -> Result<DecodedImage, DecodeError> {
    let mut reader = ByteReader::new(data);
    let header = ImageHeader::parse(&mut reader).map_err(|_| DecodeError::HeaderTruncated {
        needed: IMAGE_HEADER_SIZE,
        found: data.len(),
    })?;

    let declared = header.effective_segment_count();
    if (header.segment_count as usize) > declared {
        warn!(
            declared = header.segment_count,
            cap = declared,
            "Segment count above cap, only the first segments are read"
        );
    }

    let mut segments = Vec::with_capacity(declared);
    let mut truncation = None;
    let mut offset = IMAGE_HEADER_SIZE as u64;

    for index in 0..declared {
        reader.seek(offset);
        let seg_header = match SegmentHeader::parse(&mut reader) {
            Ok(h) => h,
            Err(e) => {
                warn!(
                    index,
                    offset = e.offset,
                    read = segments.len(),
                    declared,
                    "Segment table truncated"
                );
                truncation = Some(Truncation {
                    offset,
                    read: segments.len(),
                    declared,
                });
                break;
            }
        };

        let seg = SegmentInfo {
            load_addr: seg_header.load_addr,
            data_len: seg_header.data_len,
            file_offset: offset + SEGMENT_HEADER_SIZE as u64,
        };
        debug!(
            index,
            load_addr = format_args!("{:#010x}", seg.load_addr),
            data_len = format_args!("{:#x}", seg.data_len),
            file_offset = format_args!("{:#x}", seg.file_offset),
            "Decoded segment"
        );
        offset = seg.file_end();
        segments.push(seg);
    }

    debug!(
        magic = format_args!("{:#04x}", header.magic),
        segments = segments.len(),
        entry = format_args!("{:#010x}", header.entry_addr),
        chip_id = format_args!("{:#06x}", header.chip_id),
        "Decoded image header"
    );

    Ok(DecodedImage {
        header,
        segments,
        truncation,
    })
}
