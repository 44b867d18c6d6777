//! Blocks and the memory map they form.

use serde::Serialize;
use std::fmt;

use crate::chip::{ChipAttr, MemoryRegion, RegionFlags, SectionSemantics};
use crate::host::MemorySink;
use crate::image::SegmentInfo;

/// Slice of the image file backing a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileExtent {
    pub offset: u64,
    pub len: u64,
}

/// Where a block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    /// Data of image segment `segment_index`
    App { segment_index: usize },
    /// Gap between segments, numbered per region
    Fragment { fragment_index: usize },
    /// A region no segment touches
    Region,
}

/// One contiguous address range of the memory map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub name: String,
    pub region: &'static str,
    pub addr: u64,
    pub size: u64,
    pub file: Option<FileExtent>,
    pub flags: RegionFlags,
    pub semantics: SectionSemantics,
    pub kind: BlockKind,
}

impl Block {
    pub(crate) fn whole_region(region: &'static MemoryRegion) -> Self {
        Self {
            name: region.name.to_string(),
            region: region.name,
            addr: region.start,
            size: region.size(),
            file: None,
            flags: region.flags,
            semantics: region.semantics,
            kind: BlockKind::Region,
        }
    }

    pub(crate) fn fragment(
        region: &'static MemoryRegion,
        fragment_index: usize,
        start: u64,
        end: u64,
    ) -> Self {
        Self {
            name: format!("{}.frag.{}", region.name, fragment_index),
            region: region.name,
            addr: start,
            size: end - start,
            file: None,
            flags: region.flags,
            semantics: region.semantics,
            kind: BlockKind::Fragment { fragment_index },
        }
    }

    pub(crate) fn file_backed(
        region: &'static MemoryRegion,
        segment_index: usize,
        segment: &SegmentInfo,
        file: FileExtent,
    ) -> Self {
        Self {
            name: format!("{}.app.{}", region.name, segment_index),
            region: region.name,
            addr: segment.start(),
            size: segment.data_len as u64,
            file: Some(file),
            flags: region.flags,
            semantics: region.semantics,
            kind: BlockKind::App { segment_index },
        }
    }

    pub fn end(&self) -> u64 {
        self.addr + self.size
    }

    pub fn is_file_backed(&self) -> bool {
        self.file.is_some()
    }

    /// Push this block to a host as one segment plus one section.
    pub fn emit<S: MemorySink + ?Sized>(&self, sink: &mut S) {
        let (file_offset, file_size) = self.file.map(|f| (f.offset, f.len)).unwrap_or((0, 0));
        sink.add_segment(self.addr, self.size, file_offset, file_size, self.flags);
        sink.add_section(&self.name, self.addr, self.size, self.semantics);
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:#010x}-{:#010x}", self.name, self.addr, self.end())?;
        match self.file {
            Some(file) => write!(f, " (file {:#x}+{:#x})", file.offset, file.len),
            None => write!(f, " (non-file-backed)"),
        }
    }
}

/// Complete block list for one chip, grouped by region in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryMap {
    blocks: Vec<Block>,
}

impl MemoryMap {
    pub(crate) fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks_in_region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks.iter().filter(move |b| b.region == region)
    }

    pub fn file_backed(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter().filter(|b| b.is_file_backed())
    }

    /// Block containing `addr`.
    pub fn block_at(&self, addr: u64) -> Option<&Block> {
        self.blocks.iter().find(|b| addr >= b.addr && addr < b.end())
    }

    /// Translate an address to a file offset through file-backed blocks.
    pub fn addr_to_file_offset(&self, addr: u64) -> Option<u64> {
        let block = self.block_at(addr)?;
        let file = block.file?;
        let delta = addr - block.addr;
        (delta < file.len).then(|| file.offset + delta)
    }

    /// True if, for every region of `chip`, the region's blocks run from its
    /// start to its end with no gap and no overlap.
    pub fn covers_exactly(&self, chip: &ChipAttr) -> bool {
        chip.regions.iter().all(|region| {
            let mut cursor = region.start;
            for block in self.blocks_in_region(region.name) {
                if block.addr != cursor {
                    return false;
                }
                cursor = block.end();
            }
            cursor == region.end
        })
    }

    /// Emit every block to `sink`, in order.
    pub fn emit<S: MemorySink + ?Sized>(&self, sink: &mut S) {
        for block in &self.blocks {
            block.emit(sink);
        }
    }
}

impl<'a> IntoIterator for &'a MemoryMap {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
