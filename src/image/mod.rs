//! Application image format: header, segments, decoder and sniffer.
//!
//! Layout (little-endian):
//!
//! ```text
//! offset 0   u8     magic (0xE9)
//! offset 1   u8     segment_count
//! offset 2   u8     spi_mode
//! offset 3   u8     spi_speed_size
//! offset 4   u32    entry_addr
//! offset 8   u8     wp_pin
//! offset 9   u8[3]  spi_pin_drv
//! offset 12  u16    chip_id
//! offset 14  u8     min_chip_rev
//! offset 15  u16    min_chip_rev_full
//! offset 17  u16    max_chip_rev_full
//! offset 19  u8[4]  reserved
//! offset 23  u8     hash_appended
//! then segment_count times: u32 load_addr, u32 data_len, data_len bytes
//! ```

pub mod decode;
pub mod header;
pub mod reader;
pub mod segment;
pub mod sniff;

pub use decode::{decode, DecodeError, DecodedImage, Truncation};
pub use header::{FlashMode, ImageHeader, IMAGE_HEADER_SIZE, IMAGE_MAGIC, MAX_SEGMENTS};
pub use segment::{SegmentHeader, SegmentInfo, SEGMENT_HEADER_SIZE};
pub use sniff::looks_like_image;
