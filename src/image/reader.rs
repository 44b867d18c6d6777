//! Little-endian cursor over an untrusted byte slice.

use std::fmt;

/// Ran out of input before a field was fully read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadError {
    pub offset: u64,
    pub needed: usize,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Truncated at {:#x}, needed {} bytes", self.offset, self.needed)
    }
}

impl std::error::Error for ReadError {}

pub type Result<T> = std::result::Result<T, ReadError>;

/// Sequential reader with an explicit cursor.
///
/// Reads never panic: a short buffer yields `ReadError` and leaves the
/// cursor where it was.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: u64,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Moves the cursor. Seeking past the end is allowed; the next read fails.
    pub fn seek(&mut self, pos: u64) {
        self.pos = pos;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let err = ReadError {
            offset: self.pos,
            needed: N,
        };
        let start = usize::try_from(self.pos).map_err(|_| err)?;
        let end = start.checked_add(N).ok_or(err)?;
        let bytes: [u8; N] = self
            .data
            .get(start..end)
            .and_then(|s| s.try_into().ok())
            .ok_or(err)?;
        self.pos = end as u64;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_array::<1>().map(|b| b[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array::<2>().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }
}
