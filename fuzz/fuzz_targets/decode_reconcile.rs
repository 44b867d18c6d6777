#![no_main]
use libfuzzer_sys::fuzz_target;

use espapp::chip::ChipRegistry;
use espapp::reconcile::Reconciler;

fuzz_target!(|data: &[u8]| {
    let Ok(image) = espapp::decode(data) else {
        return;
    };
    let registry = ChipRegistry::initialize();
    if let Some(chip) = registry.lookup_chip(image.header.chip_id) {
        if let Ok(map) = Reconciler::new(chip)
            .with_file_len(data.len() as u64)
            .reconcile(&image.segments)
        {
            assert!(map.covers_exactly(chip));
        }
    }
});
