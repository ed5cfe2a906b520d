//! Mimetype resolution for blobs and archive entry names.
//!
//! # Algorithm
//! - Filename first: extension lookup via `mime_guess`.
//! - Content second: magic-byte sniffing over a bounded header.
//!
//! Both steps are pure functions of their input, so resolution is
//! deterministic.

use crate::archive::detect::sniff_kind_from_header;

/// Bytes of content handed to [`MimetypeResolver::resolve`].
pub const HEADER_SNIFF_LEN: usize = 512;

/// Maps filenames and content to mimetypes.
///
/// Implementations must be deterministic and return `None` when the input is
/// not recognized.
pub trait MimetypeResolver: Send + Sync {
    fn resolve(&self, filename: Option<&str>, head: &[u8]) -> Option<String>;

    fn resolve_filename(&self, name: &str) -> Option<String> {
        self.resolve(Some(name), &[])
    }
}

/// Resolver backed by `mime_guess` plus a small magic-number table.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultMimetypeResolver;

impl MimetypeResolver for DefaultMimetypeResolver {
    fn resolve(&self, filename: Option<&str>, head: &[u8]) -> Option<String> {
        filename
            .and_then(guess_from_name)
            .or_else(|| sniff_content(head).map(str::to_owned))
    }

    fn resolve_filename(&self, name: &str) -> Option<String> {
        guess_from_name(name)
    }
}

fn guess_from_name(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return None;
    }
    mime_guess::from_path(name)
        .first()
        .map(|mime| mime.essence_str().to_owned())
}

/// Fixed-offset signatures, checked in order.
const MAGIC: &[(usize, &[u8], &str)] = &[
    (0, b"\x89PNG\r\n\x1a\n", "image/png"),
    (0, b"\xff\xd8\xff", "image/jpeg"),
    (0, b"GIF87a", "image/gif"),
    (0, b"GIF89a", "image/gif"),
    (0, b"II*\x00", "image/tiff"),
    (0, b"MM\x00*", "image/tiff"),
    (0, b"8BPS", "image/vnd.adobe.photoshop"),
    (0, b"%PDF-", "application/pdf"),
    (0, b"ID3", "audio/mpeg"),
    (0, b"OggS", "audio/ogg"),
    (0, b"fLaC", "audio/flac"),
    (0, b"\x1a\x45\xdf\xa3", "video/x-matroska"),
];

/// Identify content by magic bytes. Returns `None` for unknown content.
pub fn sniff_content(head: &[u8]) -> Option<&'static str> {
    if let Some(kind) = sniff_kind_from_header(head) {
        return Some(kind.mimetype());
    }
    for &(offset, magic, mimetype) in MAGIC {
        if head.len() >= offset + magic.len() && &head[offset..offset + magic.len()] == magic {
            return Some(mimetype);
        }
    }
    if head.len() >= 12 && &head[0..4] == b"RIFF" {
        return match &head[8..12] {
            b"WAVE" => Some("audio/wav"),
            b"AVI " => Some("video/x-msvideo"),
            b"WEBP" => Some("image/webp"),
            _ => None,
        };
    }
    if head.len() >= 12 && &head[4..8] == b"ftyp" {
        return ftyp_brand(&head[8..12]);
    }
    // MPEG audio frame sync without an ID3 tag.
    if head.len() >= 2 && head[0] == 0xff && (head[1] & 0xe0) == 0xe0 {
        return Some("audio/mpeg");
    }
    None
}

/// ISO base media major brand. Still-image brands (HEIF, AVIF) share the
/// container with video, so unknown brands are left unresolved.
fn ftyp_brand(brand: &[u8]) -> Option<&'static str> {
    match brand {
        b"heic" | b"heix" | b"mif1" | b"msf1" => Some("image/heic"),
        b"avif" | b"avis" => Some("image/avif"),
        b"qt  " => Some("video/quicktime"),
        b"M4A " => Some("audio/mp4"),
        b"isom" | b"iso2" | b"mp41" | b"mp42" | b"avc1" | b"M4V " => Some("video/mp4"),
        [b'3', b'g', b'p', _] => Some("video/3gpp"),
        _ => None,
    }
}
