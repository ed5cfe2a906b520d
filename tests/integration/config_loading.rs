use std::fs;

use media_asset_rs::{ConfigError, MatchPolicy, MediaAssetService, MediaConfig, MemoryBlob};

use crate::support::zip_bytes;

const SITE_CONFIG: &str = r#"{
    "mediatypes": [
        {"name": "Picture", "mimetypes": ["image/.*"], "facets": ["Picture"], "order": 10},
        {"name": "Video", "mimetypes": ["video/.*"],
         "facets": ["Video", "HasStoryboard", "HasVideoPreview"], "order": 20},
        {"name": "Legacy", "mimetypes": ["image/x-legacy"], "facets": ["Legacy"],
         "order": 1, "enabled": false}
    ],
    "supported_zip_content": {"mimetypes": ["image/jpeg"], "extensions": ["mov"]},
    "archive": {"max_entries_per_archive": 100}
}"#;

#[test]
fn service_from_json_file() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("media.json");
    fs::write(&path, SITE_CONFIG).expect("write config");

    let cfg = MediaConfig::from_path(&path).expect("load config");
    let limits = cfg.archive.clone().expect("archive block present");
    assert_eq!(limits.max_entries_per_archive, 100);
    assert!(limits.enabled);
    assert_eq!(cfg.match_policy, None);

    let svc = MediaAssetService::from_config(cfg);
    assert_eq!(svc.engine().match_policy(), MatchPolicy::FirstMatch);
    assert_eq!(svc.engine().archive_config().max_entries_per_archive, 100);
    assert!(svc.media_facets(Some("image/x-legacy")).contains(&"Picture".to_string()));
    assert_eq!(
        svc.all_media_facets(),
        vec!["Picture", "Video", "HasStoryboard", "HasVideoPreview", "Legacy"]
    );

    let zip = MemoryBlob::new(zip_bytes(&["raw/take.mov"])).with_filename("takes.zip");
    assert_eq!(
        svc.blob_facets(Some(&zip)),
        vec!["Video", "HasStoryboard", "HasVideoPreview"]
    );
}

#[test]
fn later_config_overrides_earlier() {
    let base = MediaConfig::from_json_str(SITE_CONFIG).expect("parse config");
    let overlay = MediaConfig::from_json_slice(
        br#"{"mediatypes": [{"name": "Picture", "mimetypes": ["image/png"], "facets": ["Png"], "order": 10}]}"#,
    )
    .expect("parse overlay");

    let svc = MediaAssetService::from_config(base.merge(overlay));
    assert_eq!(svc.media_facets(Some("image/png")), vec!["Png"]);
    assert!(svc.media_facets(Some("image/jpeg")).is_empty());
    assert!(svc.registry().allow_list().is_some());
    // The overlay has no archive block, so the base limits survive.
    assert_eq!(svc.engine().archive_config().max_entries_per_archive, 100);
}

#[test]
fn invalid_files_are_rejected() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("bad.json");
    fs::write(&path, r#"{"mediatypes": [{"name": "Bad", "mimetypes": ["image/("]}]}"#)
        .expect("write config");
    let err = MediaConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Rule(_)), "unexpected error: {err}");

    let err = MediaConfig::from_json_str(r#"{"archive": {"max_entry_name_len": 0}}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Archive(_)), "unexpected error: {err}");
}

#[test]
fn runtime_registration_is_lenient() {
    let svc = MediaAssetService::new();
    svc.registry().register_rule(
        serde_json::from_str(r#"{"name": "Bad", "mimetypes": ["("], "extensions": ["bad"], "facets": ["Bad"]}"#)
            .expect("parse rule"),
    );
    assert!(svc.media_facets_for(None, Some("bad")).is_empty());
    assert_eq!(svc.all_media_facets(), vec!["Bad"]);
}
