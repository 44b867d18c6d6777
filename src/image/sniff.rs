//! Cheap format check used for auto-detection by a host.
//!
//! Looks at the first two bytes and the total length only. No parsing, no
//! allocation.

use crate::error::EspAppError;
use crate::image::header::{IMAGE_HEADER_SIZE, IMAGE_MAGIC, MAX_SEGMENTS};

/// Why a buffer was ruled out, in check order.
pub fn check(data: &[u8]) -> Result<(), EspAppError> {
    if data.len() < IMAGE_HEADER_SIZE {
        return Err(EspAppError::HeaderTruncated {
            needed: IMAGE_HEADER_SIZE,
            found: data.len(),
        });
    }
    if data[0] != IMAGE_MAGIC {
        return Err(EspAppError::InvalidMagic {
            found: data[0],
            expected: IMAGE_MAGIC,
        });
    }
    let count = data[1];
    if count == 0 || count > MAX_SEGMENTS {
        return Err(EspAppError::InvalidSegmentCount {
            count,
            max: MAX_SEGMENTS,
        });
    }
    Ok(())
}

/// True if `data` plausibly holds an application image.
pub fn looks_like_image(data: &[u8]) -> bool {
    check(data).is_ok()
}
