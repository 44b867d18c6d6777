//! Sniffing and decoding over synthetic buffers.

use crate::common::test_data::{ENTRY, SPREAD_ADDRS};
use crate::common::ImageBuilder;
use espapp::image::{decode, looks_like_image, IMAGE_HEADER_SIZE, SEGMENT_HEADER_SIZE};
use espapp::EspAppView;

#[test]
fn test_short_buffers_never_sniff() {
    let full = ImageBuilder::new(0, ENTRY).segment(0x3FFE_0000, 4).build();
    for len in 0..IMAGE_HEADER_SIZE {
        assert!(!looks_like_image(&full[..len]), "len {}", len);
    }
    assert!(looks_like_image(&full[..IMAGE_HEADER_SIZE]));
}

#[test]
fn test_bad_magic_never_sniffs() {
    let mut data = ImageBuilder::new(0, ENTRY).segment(0x3FFE_0000, 4).build();
    for magic in (0u8..=255).filter(|m| *m != 0xE9) {
        data[0] = magic;
        assert!(!looks_like_image(&data), "magic {:#04x}", magic);
    }
}

#[test]
fn test_segment_count_bounds() {
    let mut data = ImageBuilder::new(0, ENTRY).segment(0x3FFE_0000, 4).build();
    for count in 0u8..=255 {
        data[1] = count;
        let expected = (1..=16).contains(&count);
        assert_eq!(looks_like_image(&data), expected, "count {}", count);
        assert_eq!(EspAppView::is_valid_for_data(&data), expected);
    }
}

#[test]
fn test_file_offsets_are_cumulative() {
    let lens = [0x10usize, 0x1, 0x333, 0x80, 0x7];
    let mut builder = ImageBuilder::new(0, ENTRY);
    for (addr, len) in SPREAD_ADDRS.iter().zip(lens) {
        builder = builder.segment(*addr, len);
    }
    let data = builder.build();

    let image = decode(&data).unwrap();
    assert_eq!(image.segments.len(), lens.len());
    assert!(!image.is_truncated());

    let mut expected = IMAGE_HEADER_SIZE as u64;
    for (seg, len) in image.segments.iter().zip(lens) {
        expected += SEGMENT_HEADER_SIZE as u64;
        assert_eq!(seg.file_offset, expected);
        expected += len as u64;
    }
    assert_eq!(expected, data.len() as u64);
}

#[test]
fn test_decode_reproduces_builder_input() {
    let segments = [
        (0x3FFE_0000u32, vec![0xAAu8; 3]),
        (0x4008_0000, b"\x36\x41\x00\x1d\xf0".to_vec()),
        (0x5000_0000, vec![]),
    ];
    let mut builder = ImageBuilder::new(0, 0x4008_0000);
    for (addr, data) in &segments {
        builder = builder.segment_data(*addr, data);
    }
    let data = builder.build();
    let image = decode(&data).unwrap();

    assert_eq!(image.header.entry_addr, 0x4008_0000);
    assert_eq!(image.header.segment_count, 3);
    for (seg, (addr, payload)) in image.segments.iter().zip(&segments) {
        assert_eq!(seg.load_addr, *addr);
        assert_eq!(seg.data_len as usize, payload.len());
        let start = seg.file_offset as usize;
        assert_eq!(&data[start..start + payload.len()], payload.as_slice());
    }
}

#[test]
fn test_truncated_table_keeps_prefix() {
    let data = ImageBuilder::new(0, ENTRY)
        .segment(0x3FFE_0000, 0x10)
        .segment(0x4008_0000, 0x10)
        .declared_count(4)
        .build();
    let image = decode(&data).unwrap();
    assert_eq!(image.segments.len(), 2);
    let truncation = image.truncation.unwrap();
    assert_eq!(truncation.read, 2);
    assert_eq!(truncation.declared, 4);
    assert_eq!(truncation.offset, data.len() as u64);
}

#[test]
fn test_segment_count_capped_at_sixteen() {
    let mut builder = ImageBuilder::new(0, ENTRY);
    for i in 0..20u32 {
        builder = builder.segment(0x3FFE_0000 + i * 0x100, 0x10);
    }
    let data = builder.build();
    assert!(!looks_like_image(&data));

    let image = decode(&data).unwrap();
    assert_eq!(image.segments.len(), 16);
    assert!(!image.is_truncated());
}
