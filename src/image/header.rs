//! Fixed 24-byte application image header.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chip::ChipId;
use crate::image::reader::{ByteReader, Result};

/// First byte of every application image.
pub const IMAGE_MAGIC: u8 = 0xE9;
/// Size of the fixed header in bytes.
pub const IMAGE_HEADER_SIZE: usize = 24;
/// Hard cap on segments processed per image, regardless of the declared count.
pub const MAX_SEGMENTS: u8 = 16;

/// SPI flash read mode stored in byte 2 of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlashMode {
    Qio,
    Qout,
    Dio,
    Dout,
    FastRead,
    SlowRead,
    Unknown(u8),
}

impl From<u8> for FlashMode {
    fn from(val: u8) -> Self {
        match val {
            0 => FlashMode::Qio,
            1 => FlashMode::Qout,
            2 => FlashMode::Dio,
            3 => FlashMode::Dout,
            4 => FlashMode::FastRead,
            5 => FlashMode::SlowRead,
            other => FlashMode::Unknown(other),
        }
    }
}

impl fmt::Display for FlashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashMode::Qio => write!(f, "QIO"),
            FlashMode::Qout => write!(f, "QOUT"),
            FlashMode::Dio => write!(f, "DIO"),
            FlashMode::Dout => write!(f, "DOUT"),
            FlashMode::FastRead => write!(f, "FAST_READ"),
            FlashMode::SlowRead => write!(f, "SLOW_READ"),
            FlashMode::Unknown(v) => write!(f, "UNKNOWN({:#04x})", v),
        }
    }
}

/// Decoded image header. Field order matches the on-disk layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageHeader {
    pub magic: u8,
    pub segment_count: u8,
    pub spi_mode: u8,
    /// Low nibble: flash speed, high nibble: flash size
    pub spi_speed_size: u8,
    pub entry_addr: u32,
    pub wp_pin: u8,
    pub spi_pin_drv: [u8; 3],
    pub chip_id: u16,
    pub min_chip_rev: u8,
    pub min_chip_rev_full: u16,
    pub max_chip_rev_full: u16,
    pub reserved: [u8; 4],
    pub hash_appended: u8,
}

impl ImageHeader {
    /// Read the header field-by-field from the reader's current position.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            magic: reader.read_u8()?,
            segment_count: reader.read_u8()?,
            spi_mode: reader.read_u8()?,
            spi_speed_size: reader.read_u8()?,
            entry_addr: reader.read_u32()?,
            wp_pin: reader.read_u8()?,
            spi_pin_drv: reader.read_array::<3>()?,
            chip_id: reader.read_u16()?,
            min_chip_rev: reader.read_u8()?,
            min_chip_rev_full: reader.read_u16()?,
            max_chip_rev_full: reader.read_u16()?,
            reserved: reader.read_array::<4>()?,
            hash_appended: reader.read_u8()?,
        })
    }

    /// Serialize back to the 24-byte on-disk form.
    pub fn to_bytes(&self) -> [u8; IMAGE_HEADER_SIZE] {
        let mut out = [0u8; IMAGE_HEADER_SIZE];
        out[0] = self.magic;
        out[1] = self.segment_count;
        out[2] = self.spi_mode;
        out[3] = self.spi_speed_size;
        out[4..8].copy_from_slice(&self.entry_addr.to_le_bytes());
        out[8] = self.wp_pin;
        out[9..12].copy_from_slice(&self.spi_pin_drv);
        out[12..14].copy_from_slice(&self.chip_id.to_le_bytes());
        out[14] = self.min_chip_rev;
        out[15..17].copy_from_slice(&self.min_chip_rev_full.to_le_bytes());
        out[17..19].copy_from_slice(&self.max_chip_rev_full.to_le_bytes());
        out[19..23].copy_from_slice(&self.reserved);
        out[23] = self.hash_appended;
        out
    }

    pub fn chip(&self) -> ChipId {
        ChipId::from(self.chip_id)
    }

    pub fn flash_mode(&self) -> FlashMode {
        FlashMode::from(self.spi_mode)
    }

    /// Raw flash speed code (low nibble).
    pub fn flash_speed(&self) -> u8 {
        self.spi_speed_size & 0x0F
    }

    /// Raw flash size code (high nibble).
    pub fn flash_size(&self) -> u8 {
        self.spi_speed_size >> 4
    }

    /// Whether a SHA-256 digest follows the segment data.
    pub fn hash_appended(&self) -> bool {
        self.hash_appended != 0
    }

    /// Segments that will actually be read: the declared count capped at 16.
    pub fn effective_segment_count(&self) -> usize {
        self.segment_count.min(MAX_SEGMENTS) as usize
    }
}
