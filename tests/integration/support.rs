use std::io::{Cursor, Write};

use media_asset_rs::{MediaAssetService, MediaConfig, MediaTypeRule};

/// Picture/Video plus an extension-only rule.
pub fn scenario_config() -> MediaConfig {
    MediaConfig {
        mediatypes: vec![
            MediaTypeRule::new("Picture", 10)
                .mimetype("image/.*")
                .facet("Picture"),
            MediaTypeRule::new("Video", 20)
                .mimetype("video/.*")
                .facet("Video")
                .facet("HasStoryboard")
                .facet("HasVideoPreview"),
            MediaTypeRule::new("Custom", 30)
                .extension("abc")
                .facet("Custom"),
        ],
        ..MediaConfig::default()
    }
}

pub fn scenario_service() -> MediaAssetService {
    MediaAssetService::from_config(scenario_config())
}

/// Deflated archive with the given entries in order; directories end with `/`.
///
/// File payloads are the entry name itself; nothing here reads them.
pub fn zip_bytes(entries: &[&str]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut zw = zip::ZipWriter::new(&mut buf);
        let opts = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for name in entries {
            if name.ends_with('/') {
                zw.add_directory(*name, opts).expect("add directory");
            } else {
                zw.start_file(*name, opts).expect("start file");
                zw.write_all(name.as_bytes()).expect("write payload");
            }
        }
        zw.finish().expect("finish zip");
    }
    buf.into_inner()
}
