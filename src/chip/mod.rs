//! Chip registry: per-chip address maps and architecture names.
//!
//! Supported chips form a closed set ([`ChipKind`]). Each carries a static
//! region table plus two optional behaviours: a global setup step run once
//! when the registry is initialized, and a post-processing step run once per
//! loaded image after its memory map has been built. Both are dispatched by
//! `match` on the chip kind.

pub mod esp32;
pub mod region;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::host::MemorySink;
pub use region::{MemoryRegion, RegionFlags, SectionSemantics};

/// Chip identifier as stored in the image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChipId {
    Esp32,
    Esp32S2,
    Esp32C3,
    Esp32S3,
    Esp32C2,
    Esp32C6,
    Esp32H2,
    Esp32P4,
    Other(u16),
}

impl From<u16> for ChipId {
    fn from(val: u16) -> Self {
        match val {
            0x0000 => ChipId::Esp32,
            0x0002 => ChipId::Esp32S2,
            0x0005 => ChipId::Esp32C3,
            0x0009 => ChipId::Esp32S3,
            0x000C => ChipId::Esp32C2,
            0x000D => ChipId::Esp32C6,
            0x0010 => ChipId::Esp32H2,
            0x0012 => ChipId::Esp32P4,
            other => ChipId::Other(other),
        }
    }
}

impl ChipId {
    pub fn raw(self) -> u16 {
        match self {
            ChipId::Esp32 => 0x0000,
            ChipId::Esp32S2 => 0x0002,
            ChipId::Esp32C3 => 0x0005,
            ChipId::Esp32S3 => 0x0009,
            ChipId::Esp32C2 => 0x000C,
            ChipId::Esp32C6 => 0x000D,
            ChipId::Esp32H2 => 0x0010,
            ChipId::Esp32P4 => 0x0012,
            ChipId::Other(v) => v,
        }
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipId::Esp32 => write!(f, "ESP32"),
            ChipId::Esp32S2 => write!(f, "ESP32-S2"),
            ChipId::Esp32C3 => write!(f, "ESP32-C3"),
            ChipId::Esp32S3 => write!(f, "ESP32-S3"),
            ChipId::Esp32C2 => write!(f, "ESP32-C2"),
            ChipId::Esp32C6 => write!(f, "ESP32-C6"),
            ChipId::Esp32H2 => write!(f, "ESP32-H2"),
            ChipId::Esp32P4 => write!(f, "ESP32-P4"),
            ChipId::Other(v) => write!(f, "unknown({:#06x})", v),
        }
    }
}

/// Chips with a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipKind {
    Esp32,
}

impl ChipKind {
    pub const ALL: [ChipKind; 1] = [ChipKind::Esp32];

    pub fn attr(self) -> &'static ChipAttr {
        match self {
            ChipKind::Esp32 => &esp32::ESP32_ATTR,
        }
    }

    /// Global, chip-independent setup.
    fn on_registry_init(self) {
        match self {
            ChipKind::Esp32 => esp32::on_registry_init(),
        }
    }

    /// Per-image post-processing once the memory map is in place.
    pub fn post_init<S: MemorySink + ?Sized>(self, sink: &mut S) {
        match self {
            ChipKind::Esp32 => esp32::post_init(sink),
        }
    }
}

/// Static description of one supported chip.
#[derive(Debug)]
pub struct ChipAttr {
    pub chip_id: ChipId,
    pub kind: ChipKind,
    pub name: &'static str,
    pub arch_name: &'static str,
    /// Disjoint regions in ascending address order
    pub regions: &'static [MemoryRegion],
}

impl ChipAttr {
    /// First region whose `[start, end)` contains `addr`.
    pub fn find_region(&self, addr: u64) -> Option<&'static MemoryRegion> {
        self.regions.iter().find(|r| r.contains(addr))
    }

    /// Position of `region` in this chip's table, compared by identity.
    pub fn region_index(&self, region: &MemoryRegion) -> Option<usize> {
        self.regions.iter().position(|r| std::ptr::eq(r, region))
    }
}

/// Lookup table from chip id to chip description.
#[derive(Debug)]
pub struct ChipRegistry {
    chips: Vec<&'static ChipAttr>,
}

static REGISTRY: OnceLock<ChipRegistry> = OnceLock::new();

impl ChipRegistry {
    /// Registry of every built-in chip, without running setup hooks.
    pub fn builtin() -> Self {
        Self {
            chips: ChipKind::ALL.iter().map(|k| k.attr()).collect(),
        }
    }

    /// Process-wide registry. The first call runs every chip's global setup
    /// hook; later calls return the same instance and run nothing.
    pub fn initialize() -> &'static ChipRegistry {
        REGISTRY.get_or_init(|| {
            let registry = Self::builtin();
            for chip in &registry.chips {
                chip.kind.on_registry_init();
            }
            info!(chips = registry.chips.len(), "Chip registry initialized");
            registry
        })
    }

    pub fn chips(&self) -> &[&'static ChipAttr] {
        &self.chips
    }

    /// First chip registered under `chip_id`.
    pub fn lookup_chip(&self, chip_id: u16) -> Option<&'static ChipAttr> {
        let id = ChipId::from(chip_id);
        let found = self.chips.iter().copied().find(|c| c.chip_id == id);
        if found.is_none() {
            debug!(chip_id = format_args!("{:#06x}", chip_id), "No registry entry for chip");
        }
        found
    }
}

impl Default for ChipRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Region of `chip` containing `addr`, if any.
pub fn find_region(chip: &ChipAttr, addr: u64) -> Option<&'static MemoryRegion> {
    chip.find_region(addr)
}
