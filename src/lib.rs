//! ESP application image loader.
//!
//! Decodes ESP32 application images (a 24-byte header followed by
//! load-address/length segments) and reconciles the segments with the chip's
//! hardware address map, producing a gapless partition of every region into
//! file-backed and synthetic blocks for a disassembler's memory map.
//!
//! The library is host-agnostic: `sniff`, `decode`, `reconcile` and
//! `resolve_entry` are plain functions, and [`view::EspAppView`] drives a
//! full load against the traits in [`host`].

pub mod chip;
pub mod config;
pub mod error;
pub mod host;
pub mod image;
pub mod io;
pub mod logging;
pub mod reconcile;
pub mod resolve;
pub mod view;

use std::path::Path;
use tracing::debug;

pub use chip::{find_region, ChipAttr, ChipId, ChipKind, ChipRegistry, MemoryRegion};
pub use config::LoaderConfig;
pub use error::{EspAppError, Result};
pub use image::{decode, looks_like_image, DecodedImage, ImageHeader, SegmentInfo};
pub use reconcile::{reconcile, Block, MemoryMap};
pub use resolve::{resolve_arch, resolve_entry, ArchOverride, EntryInfo};
pub use view::{EspAppView, LoadedImage, MemoryLayout};

/// Sniff, decode and load `data` into `host`.
///
/// Returns `Ok(None)` when the bytes are not an application image, so a
/// host can move on to the next candidate format.
pub fn load_bytes<H>(
    data: &[u8],
    registry: &ChipRegistry,
    config: LoaderConfig,
    host: &mut H,
) -> Result<Option<LoadedImage<H::Architecture, H::Platform>>>
where
    H: host::MemorySink + host::AnalysisScheduler,
{
    if !looks_like_image(data) {
        return Ok(None);
    }
    let view = EspAppView::new(data, registry, config)?;
    view.init(host).map(Some)
}

/// Read `path` under the configured I/O limits and load it into `host`.
///
/// Only the header window is read from a file that is not an image.
pub fn load_file<P, H>(
    path: P,
    registry: &ChipRegistry,
    config: LoaderConfig,
    host: &mut H,
) -> Result<Option<LoadedImage<H::Architecture, H::Platform>>>
where
    P: AsRef<Path>,
    H: host::MemorySink + host::AnalysisScheduler,
{
    let mut file = io::ImageFile::open(path, config.io.clone())?;
    if !looks_like_image(&file.header()?) {
        debug!("Not an ESP application image, skipped");
        return Ok(None);
    }
    let data = file.contents()?;
    load_bytes(&data, registry, config, host)
}
