//! Errors raised while reading image files from disk.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("{}: image is {found} bytes, above the {limit}-byte limit", .path.display())]
    FileTooLarge {
        path: PathBuf,
        limit: u64,
        found: u64,
    },

    #[error("Reading {requested} more bytes would exceed the {limit}-byte read budget ({current} already read)")]
    ReadLimitExceeded {
        limit: u64,
        current: u64,
        requested: u64,
    },

    #[error(transparent)]
    StdIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
