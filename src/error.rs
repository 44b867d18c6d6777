//! Error types for the ESP application image loader.
//!
//! Every failure the loader can report lives in [`EspAppError`]. Variants
//! carry enough context (segment index, addresses, region names) to diagnose
//! a rejected image without re-running the load.

use thiserror::Error;

use crate::image::DecodeError;
use crate::io::error::IoError;

/// Main error type for image loading operations.
#[derive(Debug, Error)]
pub enum EspAppError {
    /// First byte of the image is not the application image magic
    #[error("Invalid image magic: {found:#04x} (expected {expected:#04x})")]
    InvalidMagic { found: u8, expected: u8 },

    /// Declared segment count is zero or above the hard cap
    #[error("Invalid segment count: {count} (expected 1..={max})")]
    InvalidSegmentCount { count: u8, max: u8 },

    /// Buffer too short to hold the fixed image header
    #[error("Image header truncated: need {needed} bytes, found {found}")]
    HeaderTruncated { needed: usize, found: usize },

    /// Stream ended before the declared number of segments were read
    #[error("Segment table truncated at offset {offset:#x}: read {read} of {declared} segments")]
    DecodeTruncated {
        offset: u64,
        read: usize,
        declared: usize,
    },

    /// Nothing to map
    #[error("No segments found in image")]
    NoSegments,

    /// Chip identifier has no registry entry
    #[error("Unknown chip id {chip_id:#06x}")]
    UnknownChip { chip_id: u16 },

    /// Segment start address is outside every known region
    #[error("Segment {index} at {load_addr:#010x} is not in any known memory region")]
    SegmentOutOfRegion { index: usize, load_addr: u32 },

    /// Segment starts in one region and ends in another
    #[error("Segment {index} at {start:#010x}-{end:#010x} spans multiple regions ({first} and {second})")]
    SegmentSpansRegions {
        index: usize,
        start: u64,
        end: u64,
        first: &'static str,
        second: &'static str,
    },

    /// Segment runs past the end of its region into unmapped space
    #[error("Segment {index} at {start:#010x}-{end:#010x} exceeds region {region} boundary ({region_start:#010x}-{region_end:#010x})")]
    SegmentExceedsRegion {
        index: usize,
        start: u64,
        end: u64,
        region: &'static str,
        region_start: u64,
        region_end: u64,
    },

    /// Two segments share a load address
    #[error("Segments {first} and {second} share load address {load_addr:#010x}")]
    DuplicateLoadAddress {
        first: usize,
        second: usize,
        load_addr: u32,
    },

    /// Two segments in the same region overlap
    #[error("Segment {second} at {second_start:#010x} overlaps segment {first} ending at {first_end:#010x} in region {region}")]
    OverlappingSegments {
        first: usize,
        second: usize,
        first_end: u64,
        second_start: u64,
        region: &'static str,
    },

    /// Architecture name is unknown to the host
    #[error("Architecture '{0}' not found")]
    UnknownArchitecture(String),

    /// Invalid loader configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

impl EspAppError {
    /// True for the region-validation failures that abort reconciliation.
    pub fn is_region_violation(&self) -> bool {
        matches!(
            self,
            EspAppError::SegmentOutOfRegion { .. }
                | EspAppError::SegmentSpansRegions { .. }
                | EspAppError::SegmentExceedsRegion { .. }
                | EspAppError::DuplicateLoadAddress { .. }
                | EspAppError::OverlappingSegments { .. }
        )
    }
}

impl From<DecodeError> for EspAppError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::HeaderTruncated { needed, found } => {
                EspAppError::HeaderTruncated { needed, found }
            }
        }
    }
}

/// Result type alias for loader operations
pub type Result<T> = std::result::Result<T, EspAppError>;
