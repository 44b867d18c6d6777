//! Worked examples through the full load path.

use crate::common::test_data::{ENTRY, UNKNOWN_CHIP};
use crate::common::{ImageBuilder, RecordingHost};
use espapp::chip::{ChipRegistry, SectionSemantics};
use espapp::host::{SymbolBinding, SymbolKind};
use espapp::{load_bytes, ArchOverride, EspAppError, EspAppView, LoaderConfig};

fn two_segment_image() -> Vec<u8> {
    ImageBuilder::new(0x0000, ENTRY)
        .segment(0x3FFE_0000, 0x100)
        .segment(0x4008_0000, 0x200)
        .build()
}

#[test]
fn test_two_segment_image() {
    let data = two_segment_image();
    let registry = ChipRegistry::initialize();
    let mut host = RecordingHost::with_architectures(&["xtensa-esp32"]);

    let loaded = load_bytes(&data, registry, LoaderConfig::default(), &mut host)
        .unwrap()
        .expect("image should be recognised");

    let view = EspAppView::new(&data, registry, LoaderConfig::default()).unwrap();
    let offsets: Vec<u64> = view.segments().iter().map(|s| s.file_offset).collect();
    assert_eq!(offsets, vec![32, 40 + 0x100]);

    let names = |region: &str| -> Vec<String> {
        loaded
            .map
            .blocks_in_region(region)
            .map(|b| b.name.clone())
            .collect()
    };
    assert_eq!(
        names("embedded.data.ram.1"),
        vec!["embedded.data.ram.1.app.0", "embedded.data.ram.1.frag.0"]
    );
    // Segment starts exactly at the region base, so no leading gap
    assert_eq!(
        names("embedded.code.ram.0.2"),
        vec!["embedded.code.ram.0.2.app.1", "embedded.code.ram.0.2.frag.0"]
    );
    assert_eq!(names("peripheral"), vec!["peripheral"]);

    let code = host.layout.section("embedded.code.ram.0.2.app.1").unwrap();
    assert_eq!(code.semantics, SectionSemantics::ReadOnlyCode);
    assert_eq!((code.addr, code.size), (0x4008_0000, 0x200));
    let data_sec = host.layout.section("embedded.data.ram.1.app.0").unwrap();
    assert_eq!(data_sec.semantics, SectionSemantics::Default);

    // 15 untouched regions + 2 regions of two blocks each
    assert_eq!(loaded.map.len(), 19);

    assert_eq!(loaded.entry.arch_name, "xtensa-esp32");
    assert_eq!(loaded.entry.entry_addr, ENTRY as u64);
    assert_eq!(
        host.entry_points,
        vec![("xtensa-esp32-standalone".to_string(), ENTRY as u64)]
    );
    assert_eq!(
        host.symbols,
        vec![(
            SymbolKind::Function,
            "_entry".to_string(),
            ENTRY as u64,
            SymbolBinding::Global
        )]
    );
    for rom in ["rom.data", "rom.code.1", "rom.code.2"] {
        assert_eq!(
            host.layout.section(rom).map(|s| s.semantics),
            Some(SectionSemantics::External),
            "{}",
            rom
        );
    }
}

#[test]
fn test_segment_crossing_regions_rejected() {
    let data = ImageBuilder::new(0x0000, ENTRY)
        .segment(0x3FFD_0000, 0x20000)
        .build();
    let mut host = RecordingHost::with_architectures(&["xtensa-esp32"]);

    let err = load_bytes(&data, ChipRegistry::initialize(), LoaderConfig::default(), &mut host)
        .unwrap_err();
    match err {
        EspAppError::SegmentSpansRegions {
            index,
            start,
            end,
            first,
            second,
        } => {
            assert_eq!(index, 0);
            assert_eq!((start, end), (0x3FFD_0000, 0x3FFF_0000));
            assert_eq!(first, "embedded.data.ram.2");
            assert_eq!(second, "embedded.data.ram.1");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(host.layout.segments.is_empty());
    assert!(host.entry_points.is_empty());
}

#[test]
fn test_segment_outside_every_region_rejected() {
    let data = ImageBuilder::new(0x0000, ENTRY)
        .segment(0x3FFE_0000, 0x10)
        .segment(0x6000_0000, 0x10)
        .build();
    let mut host = RecordingHost::default();
    let err = load_bytes(&data, ChipRegistry::initialize(), LoaderConfig::default(), &mut host)
        .unwrap_err();
    assert!(matches!(
        err,
        EspAppError::SegmentOutOfRegion {
            index: 1,
            load_addr: 0x6000_0000
        }
    ));
    assert!(host.layout.sections.is_empty());
}

#[test]
fn test_segment_running_into_hole_rejected() {
    // embedded.data.rtc_fast ends at 0x3FF82000; nothing is mapped after it
    let data = ImageBuilder::new(0x0000, ENTRY)
        .segment(0x3FF8_1F00, 0x200)
        .build();
    let mut host = RecordingHost::default();
    let err = load_bytes(&data, ChipRegistry::initialize(), LoaderConfig::default(), &mut host)
        .unwrap_err();
    assert!(matches!(
        err,
        EspAppError::SegmentExceedsRegion {
            region: "embedded.data.rtc_fast",
            ..
        }
    ));
    assert!(err.is_region_violation());
}

#[test]
fn test_unknown_chip_fails_whole_load() {
    let data = ImageBuilder::new(UNKNOWN_CHIP, ENTRY)
        .segment(0x3FFE_0000, 0x10)
        .build();
    let registry = ChipRegistry::initialize();
    let mut host = RecordingHost::with_architectures(&["xtensa-esp32"]);

    let err = load_bytes(&data, registry, LoaderConfig::default(), &mut host).unwrap_err();
    assert!(matches!(err, EspAppError::UnknownChip { chip_id: 0x1234 }));
    assert!(host.layout.segments.is_empty());

    let err = espapp::resolve_arch(registry, UNKNOWN_CHIP, ArchOverride::Auto).unwrap_err();
    assert!(matches!(err, EspAppError::UnknownChip { .. }));
}

#[test]
fn test_architecture_override_and_missing_arch() {
    let data = two_segment_image();
    let registry = ChipRegistry::initialize();
    let config = LoaderConfig::default().with_architecture(ArchOverride::Xtensa);

    let mut host = RecordingHost::with_architectures(&["xtensa"]);
    host.platforms.push("xtensa".to_string());
    let loaded = load_bytes(&data, registry, config.clone(), &mut host)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.architecture.as_deref(), Some("xtensa"));
    assert_eq!(loaded.platform.as_deref(), Some("xtensa"));
    assert_eq!(host.entry_points, vec![("xtensa".to_string(), ENTRY as u64)]);

    // Host without the architecture still receives the memory map
    let mut bare = RecordingHost::default();
    let loaded = load_bytes(&data, registry, config, &mut bare).unwrap().unwrap();
    assert!(loaded.is_structure_only());
    assert!(matches!(
        loaded.arch_error,
        Some(EspAppError::UnknownArchitecture(ref name)) if name == "xtensa"
    ));
    assert_eq!(bare.layout.segments.len(), loaded.map.len());
    assert!(bare.entry_points.is_empty());
    assert!(bare.symbols.is_empty());
}

#[test]
fn test_non_image_is_skipped() {
    let mut host = RecordingHost::default();
    let mut elf = b"\x7fELF\x01\x01\x01\x00".to_vec();
    elf.extend_from_slice(&[0u8; 16]);
    let result =
        load_bytes(&elf, ChipRegistry::initialize(), LoaderConfig::default(), &mut host).unwrap();
    assert!(result.is_none());
    assert!(host.layout.segments.is_empty());
}

#[test]
fn test_truncated_image_loads_prefix() {
    let data = ImageBuilder::new(0x0000, ENTRY)
        .segment(0x3FFE_0000, 0x10)
        .declared_count(3)
        .build();
    let mut host = RecordingHost::with_architectures(&["xtensa-esp32"]);
    let loaded = load_bytes(&data, ChipRegistry::initialize(), LoaderConfig::default(), &mut host)
        .unwrap()
        .unwrap();
    let truncation = loaded.truncation.unwrap();
    assert_eq!((truncation.read, truncation.declared), (1, 3));
    assert_eq!(loaded.map.file_backed().count(), 1);
}
