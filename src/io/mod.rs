//! Image file access under size and read limits.
//!
//! [`ImageFile`] maps an image read-only and serves exactly two reads: the
//! fixed header window used for sniffing, and the full contents. Both are
//! returned as owned `Bytes` copies and both count against
//! `IOLimits::max_read_bytes`, so a file that fails the sniff costs 24 bytes
//! of copying, not its whole size.

pub mod error;

use crate::io::error::{IoError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Bytes needed to sniff an image (the fixed header).
pub const SNIFF_SIZE: u64 = 24;

/// Size and read limits for one image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOLimits {
    /// Files larger than this are refused at open.
    pub max_file_size: u64,
    /// Total bytes copied out of one file, header window included.
    pub max_read_bytes: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        // Flash parts top out at 16MB; app images are smaller still.
        Self {
            max_file_size: 32 * 1024 * 1024,
            max_read_bytes: 64 * 1024 * 1024,
        }
    }
}

/// A memory-mapped image file.
pub struct ImageFile {
    path: PathBuf,
    // memmap cannot map empty files
    mmap: Option<Mmap>,
    limits: IOLimits,
    consumed: u64,
}

impl ImageFile {
    /// Open and map `path`, refusing files above `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        if size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size,
                limit = limits.max_file_size,
                "Image file is too large"
            );
            return Err(IoError::FileTooLarge {
                path: path.to_path_buf(),
                limit: limits.max_file_size,
                found: size,
            });
        }

        // Safety: read-only map of a regular file we just opened.
        let mmap = if size == 0 {
            None
        } else {
            Some(unsafe { Mmap::map(&file)? })
        };
        debug!(path = %path.display(), size, "Mapped image file");

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            limits,
            consumed: 0,
        })
    }

    pub fn len(&self) -> u64 {
        self.mmap.as_ref().map_or(0, |m| m.len() as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The header window, short if the file is.
    pub fn header(&mut self) -> Result<Bytes> {
        self.take(SNIFF_SIZE.min(self.len()))
    }

    /// The whole image.
    pub fn contents(&mut self) -> Result<Bytes> {
        self.take(self.len())
    }

    /// Copy the first `len` bytes, charging them to the read budget.
    fn take(&mut self, len: u64) -> Result<Bytes> {
        if self.consumed.saturating_add(len) > self.limits.max_read_bytes {
            warn!(
                path = %self.path.display(),
                consumed = self.consumed,
                requested = len,
                limit = self.limits.max_read_bytes,
                "Read budget exhausted"
            );
            return Err(IoError::ReadLimitExceeded {
                limit: self.limits.max_read_bytes,
                current: self.consumed,
                requested: len,
            });
        }
        self.consumed += len;
        Ok(match &self.mmap {
            Some(map) => Bytes::copy_from_slice(&map[..len as usize]),
            None => Bytes::new(),
        })
    }
}
