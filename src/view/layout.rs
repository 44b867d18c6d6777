//! In-memory `MemorySink` that records what a load produced.
//!
//! Useful for hosts without their own segment model, for dumping a memory
//! map as JSON, and for tests. Also offers the address/file-offset
//! translation a host would normally provide.

use serde::Serialize;

use crate::chip::{RegionFlags, SectionSemantics};
use crate::host::MemorySink;

/// A mapped address range, optionally backed by file bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedSegment {
    pub addr: u64,
    pub size: u64,
    pub file_offset: u64,
    pub file_size: u64,
    pub flags: RegionFlags,
}

impl MappedSegment {
    pub fn end(&self) -> u64 {
        self.addr + self.size
    }
}

/// A named address range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedSection {
    pub name: String,
    pub addr: u64,
    pub size: u64,
    pub semantics: SectionSemantics,
}

/// Segments and sections in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryLayout {
    pub segments: Vec<MappedSegment>,
    pub sections: Vec<NamedSection>,
}

impl MemoryLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, name: &str) -> Option<&NamedSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn segment_at(&self, addr: u64) -> Option<&MappedSegment> {
        self.segments
            .iter()
            .find(|s| addr >= s.addr && addr < s.end())
    }

    /// Convert an address to a file offset using file-backed segments.
    pub fn addr_to_file_offset(&self, addr: u64) -> Option<u64> {
        let seg = self.segment_at(addr)?;
        let delta = addr - seg.addr;
        (delta < seg.file_size).then(|| seg.file_offset + delta)
    }

    /// Convert a file offset to an address using file-backed segments.
    pub fn file_offset_to_addr(&self, offset: u64) -> Option<u64> {
        self.segments
            .iter()
            .filter(|s| s.file_size > 0)
            .find(|s| offset >= s.file_offset && offset < s.file_offset.saturating_add(s.file_size))
            .map(|s| s.addr + (offset - s.file_offset))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl MemorySink for MemoryLayout {
    fn add_segment(
        &mut self,
        addr: u64,
        size: u64,
        file_offset: u64,
        file_size: u64,
        flags: RegionFlags,
    ) {
        self.segments.push(MappedSegment {
            addr,
            size,
            file_offset,
            file_size,
            flags,
        });
    }

    fn add_section(&mut self, name: &str, addr: u64, size: u64, semantics: SectionSemantics) {
        self.sections.push(NamedSection {
            name: name.to_string(),
            addr,
            size,
            semantics,
        });
    }
}
