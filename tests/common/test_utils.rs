//! Shared test utilities for building images and capturing loader output.

#![allow(dead_code)]

use espapp::chip::{RegionFlags, SectionSemantics};
use espapp::host::{
    AnalysisScheduler, ArchitectureRegistry, MemorySink, SymbolBinding, SymbolKind,
};
use espapp::image::{ImageHeader, SegmentHeader, IMAGE_MAGIC};
use espapp::MemoryLayout;
use std::io::Write;
use tempfile::NamedTempFile;

/// Builds image bytes from a header template and a list of segments.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    header: ImageHeader,
    segments: Vec<(u32, Vec<u8>)>,
    declared: Option<u8>,
}

impl ImageBuilder {
    pub fn new(chip_id: u16, entry_addr: u32) -> Self {
        Self {
            header: ImageHeader {
                magic: IMAGE_MAGIC,
                entry_addr,
                chip_id,
                ..Default::default()
            },
            segments: Vec::new(),
            declared: None,
        }
    }

    /// Segment of `len` bytes filled with a per-segment byte.
    pub fn segment(mut self, load_addr: u32, len: usize) -> Self {
        let fill = self.segments.len() as u8 + 1;
        self.segments.push((load_addr, vec![fill; len]));
        self
    }

    pub fn segment_data(mut self, load_addr: u32, data: &[u8]) -> Self {
        self.segments.push((load_addr, data.to_vec()));
        self
    }

    /// Override the declared segment count.
    pub fn declared_count(mut self, count: u8) -> Self {
        self.declared = Some(count);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut header = self.header;
        header.segment_count = self.declared.unwrap_or(self.segments.len() as u8);
        let mut out = header.to_bytes().to_vec();
        for (addr, data) in &self.segments {
            let sh = SegmentHeader {
                load_addr: *addr,
                data_len: data.len() as u32,
            };
            out.extend_from_slice(&sh.to_bytes());
            out.extend_from_slice(data);
        }
        out
    }
}

/// Creates a temporary file with the given content.
///
/// The file is removed when the returned `NamedTempFile` is dropped.
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file
}

/// Host that records everything and knows a fixed set of architectures.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub layout: MemoryLayout,
    pub architectures: Vec<String>,
    pub platforms: Vec<String>,
    pub entry_points: Vec<(String, u64)>,
    pub symbols: Vec<(SymbolKind, String, u64, SymbolBinding)>,
}

impl RecordingHost {
    pub fn with_architectures(names: &[&str]) -> Self {
        Self {
            architectures: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl MemorySink for RecordingHost {
    fn add_segment(
        &mut self,
        addr: u64,
        size: u64,
        file_offset: u64,
        file_size: u64,
        flags: RegionFlags,
    ) {
        self.layout.add_segment(addr, size, file_offset, file_size, flags);
    }

    fn add_section(&mut self, name: &str, addr: u64, size: u64, semantics: SectionSemantics) {
        self.layout.add_section(name, addr, size, semantics);
    }
}

impl ArchitectureRegistry for RecordingHost {
    type Architecture = String;
    type Platform = String;

    fn resolve_architecture(&self, name: &str) -> Option<String> {
        self.architectures.iter().find(|a| a.as_str() == name).cloned()
    }

    fn resolve_platform(&self, name: &str) -> Option<String> {
        self.platforms.iter().find(|p| p.as_str() == name).cloned()
    }

    fn standalone_platform(&self, arch: &String) -> String {
        format!("{}-standalone", arch)
    }
}

impl AnalysisScheduler for RecordingHost {
    fn queue_entry_point(&mut self, platform: &String, address: u64) {
        self.entry_points.push((platform.clone(), address));
    }

    fn define_symbol(
        &mut self,
        kind: SymbolKind,
        name: &str,
        address: u64,
        binding: SymbolBinding,
    ) {
        self.symbols.push((kind, name.to_string(), address, binding));
    }
}
