//! Architecture and entry point resolution.
//!
//! Picks the architecture name for a decoded image, either from the chip's
//! registry entry or from an explicit user override, and pairs it with the
//! header's entry address. Instantiating the architecture is the host's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chip::{ChipAttr, ChipRegistry};
use crate::error::{EspAppError, Result};
use crate::image::ImageHeader;

/// User choice of architecture for disassembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArchOverride {
    /// Use the chip's registry entry
    #[default]
    #[serde(rename = "auto")]
    Auto,
    /// ESP32/S2/S3: Xtensa LX6/LX7 with windowed calls
    #[serde(rename = "xtensa-esp32")]
    XtensaEsp32,
    /// ESP8266: Xtensa LX106, CALL0 only
    #[serde(rename = "xtensa-esp8266")]
    XtensaEsp8266,
    /// Generic Xtensa without optional features
    #[serde(rename = "xtensa")]
    Xtensa,
    /// Generic RISC-V
    #[serde(rename = "rv32gc")]
    Rv32gc,
}

impl ArchOverride {
    pub const ALL: [ArchOverride; 5] = [
        ArchOverride::Auto,
        ArchOverride::XtensaEsp32,
        ArchOverride::XtensaEsp8266,
        ArchOverride::Xtensa,
        ArchOverride::Rv32gc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArchOverride::Auto => "auto",
            ArchOverride::XtensaEsp32 => "xtensa-esp32",
            ArchOverride::XtensaEsp8266 => "xtensa-esp8266",
            ArchOverride::Xtensa => "xtensa",
            ArchOverride::Rv32gc => "rv32gc",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ArchOverride::Auto => "Auto-detect from chip_id (recommended)",
            ArchOverride::XtensaEsp32 => "ESP32/S2/S3 - Xtensa LX6/LX7 with windowed calls",
            ArchOverride::XtensaEsp8266 => "ESP8266 - Xtensa LX106 (CALL0 only)",
            ArchOverride::Xtensa => "Generic Xtensa (no optional features)",
            ArchOverride::Rv32gc => "Generic RISC-V",
        }
    }

    /// Explicit architecture name, `None` for `auto`.
    pub fn name(self) -> Option<&'static str> {
        match self {
            ArchOverride::Auto => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for ArchOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchOverride {
    type Err = EspAppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| EspAppError::Config(format!("unknown architecture override '{}'", s)))
    }
}

/// Architecture and entry point handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub chip: &'static str,
    pub arch_name: &'static str,
    pub entry_addr: u64,
}

/// Architecture name for `chip_id`, honouring a non-`auto` override.
///
/// Fails with `UnknownChip` when the chip has no registry entry, even if an
/// override is given.
pub fn resolve_arch(
    registry: &ChipRegistry,
    chip_id: u16,
    arch_override: ArchOverride,
) -> Result<&'static str> {
    chip_and_arch(registry, chip_id, arch_override).map(|(_, arch)| arch)
}

fn chip_and_arch(
    registry: &ChipRegistry,
    chip_id: u16,
    arch_override: ArchOverride,
) -> Result<(&'static ChipAttr, &'static str)> {
    let chip = registry
        .lookup_chip(chip_id)
        .ok_or(EspAppError::UnknownChip { chip_id })?;
    Ok((chip, arch_override.name().unwrap_or(chip.arch_name)))
}

/// Architecture name and entry address for a decoded header.
pub fn resolve_entry(
    registry: &ChipRegistry,
    header: &ImageHeader,
    arch_override: ArchOverride,
) -> Result<EntryInfo> {
    let (chip, arch_name) = chip_and_arch(registry, header.chip_id, arch_override)?;
    Ok(EntryInfo {
        chip: chip.name,
        arch_name,
        entry_addr: header.entry_addr as u64,
    })
}
