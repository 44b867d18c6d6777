//! Interfaces the loader needs from the hosting analysis framework.
//!
//! The loader never talks to a disassembler directly. It pushes its memory
//! map into a [`MemorySink`], looks architectures up through an
//! [`ArchitectureRegistry`] and schedules analysis through an
//! [`AnalysisScheduler`]. Hosts implement whichever of these they support.

use serde::{Deserialize, Serialize};

use crate::chip::region::{RegionFlags, SectionSemantics};

/// Receives the memory map, one segment and one section per block.
pub trait MemorySink {
    /// Map `size` bytes at `addr`; the first `file_size` bytes come from the
    /// image at `file_offset`, the rest is zero-filled.
    fn add_segment(
        &mut self,
        addr: u64,
        size: u64,
        file_offset: u64,
        file_size: u64,
        flags: RegionFlags,
    );

    /// Name an address range.
    fn add_section(&mut self, name: &str, addr: u64, size: u64, semantics: SectionSemantics);
}

/// Architecture and platform lookup by name.
pub trait ArchitectureRegistry {
    type Architecture;
    type Platform;

    fn resolve_architecture(&self, name: &str) -> Option<Self::Architecture>;
    fn resolve_platform(&self, name: &str) -> Option<Self::Platform>;
    fn standalone_platform(&self, arch: &Self::Architecture) -> Self::Platform;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolBinding {
    Local,
    Global,
    Weak,
}

/// Follow-up analysis requests.
pub trait AnalysisScheduler: ArchitectureRegistry {
    fn queue_entry_point(&mut self, platform: &Self::Platform, address: u64);
    fn define_symbol(&mut self, kind: SymbolKind, name: &str, address: u64, binding: SymbolBinding);
}

/// Source of user-selected load options.
pub trait SettingsSource {
    fn get_string(&self, key: &str) -> Option<String>;
}

impl SettingsSource for std::collections::HashMap<String, String> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
