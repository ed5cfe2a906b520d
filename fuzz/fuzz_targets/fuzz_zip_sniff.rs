#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use media_asset_rs::{
    ArchiveAllowList, ArchiveConfig, ArchiveContentSniffer, DefaultMimetypeResolver, SniffOutcome,
};

const MAX_INPUT: usize = 256 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT {
        return;
    }

    // Tight limits so budget and truncation paths are reachable.
    let cfg = ArchiveConfig {
        max_entries_per_archive: 64,
        max_archive_metadata_bytes: 128 * 1024,
        max_entry_name_len: 256,
        ..ArchiveConfig::default()
    };
    let sniffer = ArchiveContentSniffer::new(&DefaultMimetypeResolver, &cfg);
    let list = ArchiveAllowList::new()
        .mimetype("image/jpeg")
        .extension("mp4");

    let first = sniffer.sniff_reader(Cursor::new(data), Some(&list));
    let second = sniffer.sniff_reader(Cursor::new(data), Some(&list));
    assert_eq!(first, second);

    if let SniffOutcome::Hit { entry, .. } = &first {
        assert!(!entry.is_empty());
        assert!(!entry.starts_with('.'));
        assert!(!entry.contains('/'));
    }
});
