use std::fs;

use media_asset_rs::{
    ArchiveAllowList, ArchiveConfig, ArchiveContentSniffer, DefaultMimetypeResolver, FileBlob,
    MediaAssetService, MediaConfig, MemoryBlob, SniffOutcome,
};

use crate::support::{scenario_config, zip_bytes};

fn service_with(list: ArchiveAllowList) -> MediaAssetService {
    MediaAssetService::from_config(MediaConfig {
        supported_zip_content: Some(list),
        ..scenario_config()
    })
}

fn jpeg_service() -> MediaAssetService {
    service_with(ArchiveAllowList::new().mimetype("image/jpeg"))
}

#[test]
fn zip_with_allow_listed_photo_is_a_picture() {
    let svc = jpeg_service();
    let bytes = zip_bytes(&[
        "__MACOSX/",
        "__MACOSX/._photo.jpg",
        "photo.jpg",
    ]);
    let blob = MemoryBlob::new(bytes).with_filename("upload.zip");
    assert!(svc.is_blob_supported(Some(&blob)));
    assert_eq!(svc.blob_facets(Some(&blob)), vec!["Picture"]);
}

#[test]
fn empty_or_unlisted_zip_is_unsupported() {
    let svc = jpeg_service();

    let empty = MemoryBlob::new(zip_bytes(&[])).with_filename("empty.zip");
    assert!(!svc.is_blob_supported(Some(&empty)));
    assert!(svc.blob_facets(Some(&empty)).is_empty());

    let unlisted = MemoryBlob::new(zip_bytes(&["readme.txt", "clip.mp4"]))
        .with_filename("bundle.zip");
    assert!(!svc.is_blob_supported(Some(&unlisted)));
    assert!(svc.blob_facets(Some(&unlisted)).is_empty());
}

#[test]
fn zip_detected_from_content_without_a_name() {
    let svc = service_with(ArchiveAllowList::new().extension("MP4"));
    let blob = MemoryBlob::new(zip_bytes(&["take/clip.mp4"]));
    assert!(svc.is_blob_supported(Some(&blob)));
    assert_eq!(
        svc.blob_facets(Some(&blob)),
        vec!["Video", "HasStoryboard", "HasVideoPreview"]
    );
}

#[test]
fn corrupt_zip_yields_no_facets() {
    let svc = jpeg_service();
    let mut bytes = zip_bytes(&["photo.jpg"]);
    let keep = bytes.len() - 10;
    bytes.truncate(keep);
    let blob = MemoryBlob::new(bytes).with_filename("broken.zip");
    assert!(!svc.is_blob_supported(Some(&blob)));
    assert!(svc.blob_facets(Some(&blob)).is_empty());

    let garbage = MemoryBlob::new(b"PK\x03\x04 definitely not an archive".to_vec());
    assert!(!svc.is_blob_supported(Some(&garbage)));
    assert!(svc.blob_facets(Some(&garbage)).is_empty());
}

#[test]
fn zip_on_disk() {
    let svc = jpeg_service();
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("album.zip");
    fs::write(&path, zip_bytes(&["a/b/c.jpeg"])).expect("write zip");
    let blob = FileBlob::new(&path);
    assert!(svc.is_blob_supported(Some(&blob)));
    assert_eq!(svc.blob_facets(Some(&blob)), vec!["Picture"]);
}

#[test]
fn sniffer_reports_the_winning_entry() {
    let cfg = ArchiveConfig::default();
    let sniffer = ArchiveContentSniffer::new(&DefaultMimetypeResolver, &cfg);
    let list = ArchiveAllowList::new().mimetype("image/png").mimetype("image/jpeg");
    let blob = MemoryBlob::new(zip_bytes(&[
        "docs/",
        ".DS_Store",
        "docs/cover.png",
        "photo.jpg",
    ]));
    assert_eq!(
        sniffer.sniff_blob(&blob, Some(&list)),
        SniffOutcome::Hit {
            entry: "cover.png".to_string(),
            mimetype: Some("image/png".to_string()),
        }
    );
}

#[test]
fn archive_limits_apply_to_blobs() {
    let cfg = MediaConfig {
        supported_zip_content: Some(ArchiveAllowList::new().mimetype("image/jpeg")),
        archive: Some(ArchiveConfig {
            max_entries_per_archive: 1,
            ..ArchiveConfig::default()
        }),
        ..scenario_config()
    };
    let svc = MediaAssetService::from_config(cfg);
    let blob = MemoryBlob::new(zip_bytes(&["a.txt", "b.jpg"]))
        .with_filename("two.zip");
    assert!(!svc.is_blob_supported(Some(&blob)));
    assert!(svc.blob_facets(Some(&blob)).is_empty());
}
