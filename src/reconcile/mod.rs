//! Segment-to-region reconciliation and region fragmentation.
//!
//! Two passes over a decoded image:
//!
//! 1. **Classify**: every segment must lie entirely inside one region of the
//!    chip. Any violation rejects the whole image.
//! 2. **Fragment**: each region, in table order, is cut into blocks. Segments
//!    become file-backed blocks; the address space between them becomes
//!    synthetic gap blocks. A region without segments is one synthetic block.
//!
//! The resulting [`MemoryMap`] tiles every region exactly: blocks within a
//! region are contiguous, never overlap, and their sizes sum to the region
//! size.

pub mod block;

use tracing::{debug, error, warn};

use crate::chip::{ChipAttr, MemoryRegion};
use crate::error::{EspAppError, Result};
use crate::image::SegmentInfo;

pub use block::{Block, BlockKind, FileExtent, MemoryMap};

/// A segment together with the region that contains it.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    /// Position of the segment in the image
    pub index: usize,
    pub segment: SegmentInfo,
    pub region: &'static MemoryRegion,
}

/// Reconciles decoded segments against one chip's region table.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'c> {
    chip: &'c ChipAttr,
    file_len: Option<u64>,
}

impl<'c> Reconciler<'c> {
    pub fn new(chip: &'c ChipAttr) -> Self {
        Self {
            chip,
            file_len: None,
        }
    }

    /// Clamp file backing to an image of `len` bytes.
    ///
    /// A segment whose data runs past the end of the file keeps its address
    /// span but only the bytes actually present are file-backed.
    pub fn with_file_len(mut self, len: u64) -> Self {
        self.file_len = Some(len);
        self
    }

    /// Step A: place every segment in exactly one region.
    pub fn classify(&self, segments: &[SegmentInfo]) -> Result<Vec<Placement>> {
        let mut placements = Vec::with_capacity(segments.len());

        for (index, seg) in segments.iter().enumerate() {
            let start = seg.start();
            let end = seg.end();

            let region = match self.chip.find_region(start) {
                Some(r) => r,
                None => {
                    error!(
                        index,
                        load_addr = format_args!("{:#010x}", seg.load_addr),
                        "Segment is not in any known memory region"
                    );
                    return Err(EspAppError::SegmentOutOfRegion {
                        index,
                        load_addr: seg.load_addr,
                    });
                }
            };

            if end > region.end {
                // end > region.end > start, so end - 1 cannot underflow
                return match self.chip.find_region(end - 1) {
                    Some(other) if !std::ptr::eq(other, region) => {
                        error!(
                            index,
                            start = format_args!("{:#010x}", start),
                            end = format_args!("{:#010x}", end),
                            first = region.name,
                            second = other.name,
                            "Segment spans multiple regions"
                        );
                        Err(EspAppError::SegmentSpansRegions {
                            index,
                            start,
                            end,
                            first: region.name,
                            second: other.name,
                        })
                    }
                    _ => {
                        error!(
                            index,
                            start = format_args!("{:#010x}", start),
                            end = format_args!("{:#010x}", end),
                            region = region.name,
                            "Segment exceeds region boundary"
                        );
                        Err(EspAppError::SegmentExceedsRegion {
                            index,
                            start,
                            end,
                            region: region.name,
                            region_start: region.start,
                            region_end: region.end,
                        })
                    }
                };
            }

            debug!(
                index,
                region = region.name,
                load_addr = format_args!("{:#010x}", seg.load_addr),
                data_len = format_args!("{:#x}", seg.data_len),
                file_offset = format_args!("{:#x}", seg.file_offset),
                "Segment placed"
            );
            placements.push(Placement {
                index,
                segment: *seg,
                region,
            });
        }

        Ok(placements)
    }

    /// Step B for a single region: the placements must all belong to it.
    pub fn fragment_region(
        &self,
        region: &'static MemoryRegion,
        placements: &[Placement],
    ) -> Result<Vec<Block>> {
        let mut in_region: Vec<&Placement> = placements
            .iter()
            .filter(|p| std::ptr::eq(p.region, region))
            .collect();

        // Stable: equal load addresses keep image order for the error report
        in_region.sort_by_key(|p| p.segment.load_addr);

        // Empty segments still claim their load address
        for pair in in_region.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if prev.segment.load_addr == next.segment.load_addr {
                error!(
                    first = prev.index,
                    second = next.index,
                    load_addr = format_args!("{:#010x}", next.segment.load_addr),
                    "Duplicate segment load address"
                );
                return Err(EspAppError::DuplicateLoadAddress {
                    first: prev.index,
                    second: next.index,
                    load_addr: next.segment.load_addr,
                });
            }
        }
        in_region.retain(|p| !p.segment.is_empty());

        if in_region.is_empty() {
            debug!(
                region = region.name,
                start = format_args!("{:#010x}", region.start),
                end = format_args!("{:#010x}", region.end),
                "Region added as non-file-backed"
            );
            return Ok(vec![Block::whole_region(region)]);
        }

        let mut blocks = Vec::with_capacity(in_region.len() * 2 + 1);
        let mut cursor = region.start;
        let mut fragment_index = 0usize;
        let mut previous: Option<&Placement> = None;

        for placement in in_region {
            let seg = &placement.segment;
            if let Some(prev) = previous {
                if seg.start() < cursor {
                    error!(
                        first = prev.index,
                        second = placement.index,
                        region = region.name,
                        "Overlapping segments"
                    );
                    return Err(EspAppError::OverlappingSegments {
                        first: prev.index,
                        second: placement.index,
                        first_end: cursor,
                        second_start: seg.start(),
                        region: region.name,
                    });
                }
            }

            if cursor < seg.start() {
                let gap = Block::fragment(region, fragment_index, cursor, seg.start());
                debug!(region = region.name, block = %gap, "Added fragment");
                blocks.push(gap);
                fragment_index += 1;
            }

            let file = self.file_extent(placement);
            let app = Block::file_backed(region, placement.index, seg, file);
            debug!(region = region.name, block = %app, "Added app segment");
            blocks.push(app);

            cursor = seg.end();
            previous = Some(placement);
        }

        if cursor < region.end {
            let tail = Block::fragment(region, fragment_index, cursor, region.end);
            debug!(region = region.name, block = %tail, "Added fragment");
            blocks.push(tail);
        }

        Ok(blocks)
    }

    /// Classify then fragment every region in table order.
    pub fn reconcile(&self, segments: &[SegmentInfo]) -> Result<MemoryMap> {
        let placements = self.classify(segments)?;

        let mut blocks = Vec::new();
        for region in self.chip.regions {
            blocks.extend(self.fragment_region(region, &placements)?);
        }

        debug!(
            chip = self.chip.name,
            segments = segments.len(),
            blocks = blocks.len(),
            "Memory map built"
        );
        Ok(MemoryMap::new(blocks))
    }

    fn file_extent(&self, placement: &Placement) -> FileExtent {
        let seg = &placement.segment;
        let wanted = seg.data_len as u64;
        let len = match self.file_len {
            Some(file_len) => {
                let available = file_len.saturating_sub(seg.file_offset);
                if available < wanted {
                    warn!(
                        index = placement.index,
                        wanted,
                        available,
                        "Segment data runs past end of file, file backing clamped"
                    );
                }
                wanted.min(available)
            }
            None => wanted,
        };
        FileExtent {
            offset: seg.file_offset,
            len,
        }
    }
}

/// Reconcile `segments` against `chip` without file-length clamping.
pub fn reconcile(segments: &[SegmentInfo], chip: &ChipAttr) -> Result<MemoryMap> {
    Reconciler::new(chip).reconcile(segments)
}
