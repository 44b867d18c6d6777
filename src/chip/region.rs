//! Named hardware address ranges and their capabilities.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Access and content flags of a memory region.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RegionFlags: u32 {
        const READABLE = 1 << 0;
        const WRITABLE = 1 << 1;
        const EXECUTABLE = 1 << 2;
        const CONTAINS_CODE = 1 << 3;
        const CONTAINS_DATA = 1 << 4;

        const RO = Self::READABLE.bits();
        const RW = Self::READABLE.bits() | Self::WRITABLE.bits();
        const RX = Self::READABLE.bits() | Self::EXECUTABLE.bits();
        const RWX = Self::RW.bits() | Self::EXECUTABLE.bits();
    }
}

impl fmt::Display for RegionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut perms = String::new();
        perms.push(if self.contains(Self::READABLE) { 'r' } else { '-' });
        perms.push(if self.contains(Self::WRITABLE) { 'w' } else { '-' });
        perms.push(if self.contains(Self::EXECUTABLE) { 'x' } else { '-' });
        if self.contains(Self::CONTAINS_CODE) {
            perms.push_str(" code");
        }
        if self.contains(Self::CONTAINS_DATA) {
            perms.push_str(" data");
        }
        write!(f, "{}", perms)
    }
}

/// How a host should treat a named address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionSemantics {
    Default,
    /// Contents come from outside the image (e.g. mask ROM)
    External,
    ReadOnlyCode,
}

impl SectionSemantics {
    /// Code regions are read-only code, everything else default.
    pub const fn for_flags(flags: RegionFlags) -> Self {
        if flags.contains(RegionFlags::CONTAINS_CODE) {
            SectionSemantics::ReadOnlyCode
        } else {
            SectionSemantics::Default
        }
    }
}

/// A fixed address range `[start, end)` of a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub name: &'static str,
    pub start: u64,
    pub end: u64,
    pub flags: RegionFlags,
    pub semantics: SectionSemantics,
}

impl MemoryRegion {
    pub const fn new(name: &'static str, start: u64, end: u64, flags: RegionFlags) -> Self {
        Self {
            name,
            start,
            end,
            flags,
            semantics: SectionSemantics::for_flags(flags),
        }
    }

    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:#010x}, {:#010x}) {}",
            self.name, self.start, self.end, self.flags
        )
    }
}
