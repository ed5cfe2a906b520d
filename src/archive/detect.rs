//! Container kind detection.
//!
//! # Invariants
//! - Mimetype detection is exact: only `application/zip` selects introspection.
//!
//! # Algorithm
//! - The engine decides by resolved mimetype.
//! - Resolvers may sniff magic bytes when the filename says nothing.

use super::formats::is_zip_magic;

/// Mimetype of the only container format that is introspected.
pub const MIMETYPE_ZIP: &str = "application/zip";

/// Archive container kind.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Zip = 0,
}

impl ArchiveKind {
    pub const fn mimetype(self) -> &'static str {
        match self {
            ArchiveKind::Zip => MIMETYPE_ZIP,
        }
    }
}

/// Detect by resolved mimetype.
pub fn detect_kind_from_mimetype(mimetype: Option<&str>) -> Option<ArchiveKind> {
    match mimetype {
        Some(MIMETYPE_ZIP) => Some(ArchiveKind::Zip),
        _ => None,
    }
}

/// Sniff by magic bytes in a header buffer.
pub fn sniff_kind_from_header(header: &[u8]) -> Option<ArchiveKind> {
    if is_zip_magic(header) {
        return Some(ArchiveKind::Zip);
    }
    None
}
