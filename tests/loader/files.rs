//! Loading images from disk through the bounded reader.

use crate::common::test_data::ENTRY;
use crate::common::{create_temp_file, ImageBuilder, RecordingHost};
use espapp::chip::ChipRegistry;
use espapp::io::{IOLimits, ImageFile, SNIFF_SIZE};
use espapp::{load_file, EspAppError, LoaderConfig};

#[test]
fn test_load_file_end_to_end() {
    let data = ImageBuilder::new(0x0000, ENTRY)
        .segment(0x3FFE_0000, 0x40)
        .segment(0x4008_0000, 0x80)
        .build();
    let file = create_temp_file(&data);
    let mut host = RecordingHost::with_architectures(&["xtensa-esp32"]);

    let loaded = load_file(
        file.path(),
        ChipRegistry::initialize(),
        LoaderConfig::default(),
        &mut host,
    )
    .unwrap()
    .unwrap();
    assert_eq!(loaded.map.file_backed().count(), 2);
    assert_eq!(host.layout.addr_to_file_offset(0x4008_0000), Some(32 + 0x40 + 8));
}

#[test]
fn test_load_file_respects_limits() {
    let data = ImageBuilder::new(0x0000, ENTRY)
        .segment(0x3FFE_0000, 0x400)
        .build();
    let file = create_temp_file(&data);
    let mut config = LoaderConfig::default();
    config.io = IOLimits {
        max_file_size: 64,
        max_read_bytes: 1024 * 1024,
    };
    let mut host = RecordingHost::default();
    let err = load_file(file.path(), ChipRegistry::initialize(), config, &mut host).unwrap_err();
    assert!(matches!(err, EspAppError::Io(_)));
    assert!(host.layout.segments.is_empty());
}

#[test]
fn test_header_window() {
    let data = ImageBuilder::new(0x0000, ENTRY)
        .segment(0x3FFE_0000, 0x100)
        .build();
    let file = create_temp_file(&data);
    let mut image = ImageFile::open(file.path(), IOLimits::default()).unwrap();
    let head = image.header().unwrap();
    assert_eq!(head.len() as u64, SNIFF_SIZE);
    assert!(espapp::looks_like_image(&head));
    assert_eq!(image.len(), data.len() as u64);
    assert_eq!(&image.contents().unwrap()[..], &data[..]);
}

#[test]
fn test_non_image_reads_header_only() {
    // A budget below the file size only allows the header window
    let file = create_temp_file(&[0x7F; 4096]);
    let mut config = LoaderConfig::default();
    config.io = IOLimits {
        max_file_size: 1024 * 1024,
        max_read_bytes: SNIFF_SIZE,
    };
    let mut host = RecordingHost::default();
    let result = load_file(file.path(), ChipRegistry::initialize(), config, &mut host).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_read_budget_applies_to_images() {
    let data = ImageBuilder::new(0x0000, ENTRY)
        .segment(0x3FFE_0000, 0x400)
        .build();
    let file = create_temp_file(&data);
    let mut config = LoaderConfig::default();
    config.io = IOLimits {
        max_file_size: 1024 * 1024,
        max_read_bytes: 256,
    };
    let mut host = RecordingHost::default();
    let err = load_file(file.path(), ChipRegistry::initialize(), config, &mut host).unwrap_err();
    assert!(matches!(err, EspAppError::Io(_)));
    assert!(host.layout.segments.is_empty());
}

#[test]
fn test_missing_file() {
    let mut host = RecordingHost::default();
    let err = load_file(
        "/nonexistent/app.bin",
        ChipRegistry::initialize(),
        LoaderConfig::default(),
        &mut host,
    )
    .unwrap_err();
    assert!(matches!(err, EspAppError::Io(_)));
}
