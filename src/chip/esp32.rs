//! ESP32 (Xtensa LX6) address map.

use tracing::debug;

use crate::chip::region::{MemoryRegion, RegionFlags, SectionSemantics};
use crate::chip::{ChipAttr, ChipId, ChipKind};
use crate::host::MemorySink;

const RO: RegionFlags = RegionFlags::RO;
const RW: RegionFlags = RegionFlags::RW;
const RX: RegionFlags = RegionFlags::RX;
const RWX: RegionFlags = RegionFlags::RWX;
const CODE: RegionFlags = RegionFlags::CONTAINS_CODE;
const DATA: RegionFlags = RegionFlags::CONTAINS_DATA;

pub static ESP32_REGIONS: [MemoryRegion; 17] = [
    MemoryRegion::new("external.data.1", 0x3F40_0000, 0x3F80_0000, RW.union(DATA)),
    MemoryRegion::new("external.data.2", 0x3F80_0000, 0x3FC0_0000, RW.union(DATA)),
    MemoryRegion::new("peripheral", 0x3FF0_0000, 0x3FF8_0000, RW),
    MemoryRegion::new("embedded.data.rtc_fast", 0x3FF8_0000, 0x3FF8_2000, RW),
    MemoryRegion::new("embedded.data.rom.1", 0x3FF9_0000, 0x3FFA_0000, RO.union(DATA)),
    MemoryRegion::new("embedded.data.ram.2", 0x3FFA_E000, 0x3FFE_0000, RW),
    MemoryRegion::new("embedded.data.ram.1", 0x3FFE_0000, 0x4000_0000, RW),
    MemoryRegion::new("embedded.code.rom.0.1", 0x4000_0000, 0x4000_8000, RX.union(CODE)),
    MemoryRegion::new("embedded.code.rom.0.2", 0x4000_8000, 0x4006_0000, RX.union(CODE)),
    MemoryRegion::new("embedded.code.ram.0.1", 0x4007_0000, 0x4008_0000, RX.union(CODE)),
    MemoryRegion::new("embedded.code.ram.0.2", 0x4008_0000, 0x400A_0000, RX.union(CODE)),
    MemoryRegion::new("embedded.code.ram.1.1", 0x400A_0000, 0x400B_0000, RX.union(CODE)),
    MemoryRegion::new("embedded.code.ram.1.2", 0x400B_0000, 0x400B_8000, RX.union(CODE)),
    MemoryRegion::new("embedded.code.ram.1.3", 0x400B_8000, 0x400C_0000, RX.union(CODE)),
    MemoryRegion::new("embedded.code.rtc_fast", 0x400C_0000, 0x400C_2000, RX.union(CODE)),
    MemoryRegion::new("external.code.0", 0x400C_2000, 0x40C0_0000, RX.union(CODE)),
    MemoryRegion::new("embedded.rtc_slow", 0x5000_0000, 0x5000_2000, RWX),
];

/// Mask ROM ranges the image never carries; exposed as external sections.
pub static ESP32_ROM_SECTIONS: [(&str, u64, u64); 3] = [
    ("rom.data", 0x3FF9_0000, 0x3FFA_0000),
    ("rom.code.1", 0x4000_0000, 0x4000_8000),
    ("rom.code.2", 0x4000_8000, 0x4006_0000),
];

pub static ESP32_ATTR: ChipAttr = ChipAttr {
    chip_id: ChipId::Esp32,
    kind: ChipKind::Esp32,
    name: "ESP32",
    arch_name: "xtensa-esp32",
    regions: &ESP32_REGIONS,
};

pub(crate) fn on_registry_init() {
    debug!(chip = "ESP32", "No global setup required");
}

pub(crate) fn post_init<S: MemorySink + ?Sized>(sink: &mut S) {
    for (name, start, end) in ESP32_ROM_SECTIONS.iter() {
        sink.add_section(name, *start, end - start, SectionSemantics::External);
    }
}
