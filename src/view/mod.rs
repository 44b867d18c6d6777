//! EspAppView: one application image, from raw bytes to a host memory map.
//!
//! Construction decodes the image. [`EspAppView::init`] then validates the
//! segments against the chip, emits the memory map, sets up the
//! architecture and entry point, and runs the chip's post-processing.

pub mod layout;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::chip::{ChipAttr, ChipRegistry};
use crate::config::LoaderConfig;
use crate::error::{EspAppError, Result};
use crate::host::{AnalysisScheduler, MemorySink, SymbolBinding, SymbolKind};
use crate::image::{self, DecodedImage, ImageHeader, SegmentInfo, Truncation};
use crate::reconcile::{MemoryMap, Reconciler};
use crate::resolve::{resolve_entry, EntryInfo};

pub use layout::{MappedSegment, MemoryLayout, NamedSection};

/// Byte order of the image and its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Endianness {
    Little,
    Big,
}

/// Outcome of a successful [`EspAppView::init`].
#[derive(Debug)]
pub struct LoadedImage<A, P> {
    pub map: MemoryMap,
    pub entry: EntryInfo,
    /// `None` when the host does not know `entry.arch_name`
    pub architecture: Option<A>,
    pub platform: Option<P>,
    /// Why architecture setup was skipped, if it was
    pub arch_error: Option<EspAppError>,
    pub truncation: Option<Truncation>,
}

impl<A, P> LoadedImage<A, P> {
    /// Memory map built but no instructions can be decoded.
    pub fn is_structure_only(&self) -> bool {
        self.architecture.is_none()
    }
}

/// A decoded application image bound to a chip registry.
#[derive(Debug)]
pub struct EspAppView<'a> {
    data: &'a [u8],
    registry: &'a ChipRegistry,
    config: LoaderConfig,
    image: DecodedImage,
    chip: Option<&'static ChipAttr>,
}

impl<'a> EspAppView<'a> {
    pub const NAME: &'static str = "ESP-APP";
    pub const LONG_NAME: &'static str = "ESP32 Application Image";

    /// Format check for host auto-detection.
    pub fn is_valid_for_data(data: &[u8]) -> bool {
        image::looks_like_image(data)
    }

    /// Decode `data`. Only an unreadable header fails here.
    pub fn new(data: &'a [u8], registry: &'a ChipRegistry, config: LoaderConfig) -> Result<Self> {
        let image = image::decode(data)?;
        let chip = registry.lookup_chip(image.header.chip_id);

        info!(
            magic = format_args!("{:#04x}", image.header.magic),
            segments = image.segments.len(),
            entry = format_args!("{:#010x}", image.header.entry_addr),
            chip_id = format_args!("{:#06x}", image.header.chip_id),
            chip = chip.map(|c| c.name).unwrap_or("unknown"),
            "ESP app image"
        );

        Ok(Self {
            data,
            registry,
            config,
            image,
            chip,
        })
    }

    pub fn header(&self) -> &ImageHeader {
        &self.image.header
    }

    pub fn segments(&self) -> &[SegmentInfo] {
        &self.image.segments
    }

    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    pub fn chip(&self) -> Option<&'static ChipAttr> {
        self.chip
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn entry_point(&self) -> u64 {
        self.image.entry_point()
    }

    pub fn is_executable(&self) -> bool {
        true
    }

    pub fn endianness(&self) -> Endianness {
        Endianness::Little
    }

    pub fn address_size(&self) -> usize {
        4
    }

    /// The recoverable truncation, as an error value for reporting.
    pub fn truncation_error(&self) -> Option<EspAppError> {
        self.image.truncation.map(|t| EspAppError::DecodeTruncated {
            offset: t.offset,
            read: t.read,
            declared: t.declared,
        })
    }

    /// Validate segments and build the block partition.
    pub fn memory_map(&self) -> Result<MemoryMap> {
        if let Some(err) = self.truncation_error() {
            warn!(error = %err, "Continuing with the segments read so far");
        }
        if self.image.segments.is_empty() {
            return Err(crate::log_error!(EspAppError::NoSegments, "memory map"));
        }
        let chip = self.chip.ok_or_else(|| {
            crate::log_error!(
                EspAppError::UnknownChip {
                    chip_id: self.image.header.chip_id,
                },
                "No attribute available for chip"
            )
        })?;

        Reconciler::new(chip)
            .with_file_len(self.data.len() as u64)
            .reconcile(&self.image.segments)
    }

    /// Full load into `host`.
    ///
    /// The memory map is emitted only once every segment has been validated.
    /// An architecture the host cannot resolve is reported in the result,
    /// not as an error; the memory map stays usable.
    pub fn init<H>(&self, host: &mut H) -> Result<LoadedImage<H::Architecture, H::Platform>>
    where
        H: MemorySink + AnalysisScheduler,
    {
        let span = crate::span_trace!(
            "esp_app_load",
            chip_id = self.image.header.chip_id,
            segments = self.image.segments.len()
        );
        let _guard = span.enter();

        let map = self.memory_map()?;
        map.emit(host);

        let entry = resolve_entry(self.registry, &self.image.header, self.config.architecture)?;

        let mut arch_error = None;
        let architecture = host.resolve_architecture(entry.arch_name);
        let platform = match &architecture {
            Some(arch) => {
                info!(arch = entry.arch_name, "Using architecture");
                Some(
                    host.resolve_platform(entry.arch_name)
                        .unwrap_or_else(|| host.standalone_platform(arch)),
                )
            }
            None => {
                let err = EspAppError::UnknownArchitecture(entry.arch_name.to_string());
                error!(error = %err, "Architecture setup skipped");
                arch_error = Some(err);
                None
            }
        };

        if !self.config.parse_only {
            if let Some(platform) = &platform {
                host.queue_entry_point(platform, entry.entry_addr);
                host.define_symbol(
                    SymbolKind::Function,
                    &self.config.entry_symbol,
                    entry.entry_addr,
                    SymbolBinding::Global,
                );
            }
            if let Some(chip) = self.chip {
                chip.kind.post_init(host);
            }
        }

        Ok(LoadedImage {
            map,
            entry,
            architecture,
            platform,
            arch_error,
            truncation: self.image.truncation,
        })
    }
}
