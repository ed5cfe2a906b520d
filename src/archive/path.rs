//! Display names and extensions for archive entries and blob filenames.
//!
//! # Invariants
//! - Both `/` and `\` are treated as directory separators.
//! - Names are decoded lossily; invalid UTF-8 never fails a lookup.
//! - Extensions never include the dot and are never empty.

use std::borrow::Cow;

use memchr::memrchr2;

/// Strip directory components from a raw entry name.
///
/// A trailing separator yields an empty name (directory entries).
pub fn entry_display_name(raw: &[u8]) -> Cow<'_, str> {
    let start = memrchr2(b'/', b'\\', raw).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&raw[start..])
}

/// Hidden by convention: the base name starts with `.` (e.g. `._photo.jpg`).
#[inline]
pub fn is_hidden_name(display_name: &str) -> bool {
    display_name.starts_with('.')
}

/// Extension of a base name or path: the text after the last `.` of the
/// final component.
///
/// Returns `None` with no dot, a trailing dot, or a dotfile with no other
/// dot (`.bashrc`).
pub fn file_extension(name: &str) -> Option<&str> {
    let base = match memrchr2(b'/', b'\\', name.as_bytes()) {
        Some(i) => &name[i + 1..],
        None => name,
    };
    let dot = base.rfind('.')?;
    if dot == 0 {
        return None;
    }
    let ext = &base[dot + 1..];
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}
