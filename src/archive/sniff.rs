//! Representative-mimetype sniffing for ZIP containers.
//!
//! # Invariants
//! - First hit wins: central-directory order fully determines the result.
//! - Only entry metadata is read; payloads are never decompressed.
//! - Every failure (I/O, malformed archive, exhausted limits, no allow-list)
//!   collapses to "no match".
//!
//! # Algorithm
//! For each entry in stored order:
//! 1. Skip directories and truncated names.
//! 2. Skip hidden entries (base name starts with `.`).
//! 3. Resolve the base name's mimetype and extension.
//! 4. Hit if the mimetype is allow-listed or the extension is; return the
//!    resolved mimetype (which may itself be unknown).

use std::io::{Read, Seek};

use tracing::{debug, trace};

use super::formats::{ZipCursor, ZipNext, ZipOpen};
use super::path::{entry_display_name, file_extension, is_hidden_name};
use super::ArchiveConfig;
use crate::api::{ArchiveAllowList, Blob};
use crate::mime::MimetypeResolver;

/// Result of walking an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SniffOutcome {
    /// An allow-listed entry was found.
    Hit {
        entry: String,
        mimetype: Option<String>,
    },
    /// The archive was walked completely without a hit.
    NoHit,
    /// No allow-list is active, or introspection is disabled.
    Inactive,
    /// The archive could not be read or parsed.
    Unreadable,
}

impl SniffOutcome {
    /// The representative mimetype, if any.
    pub fn into_mimetype(self) -> Option<String> {
        match self {
            SniffOutcome::Hit { mimetype, .. } => mimetype,
            _ => None,
        }
    }
}

/// Finds the first allow-listed member of a ZIP archive.
pub struct ArchiveContentSniffer<'a> {
    resolver: &'a dyn MimetypeResolver,
    config: &'a ArchiveConfig,
}

impl<'a> ArchiveContentSniffer<'a> {
    pub fn new(resolver: &'a dyn MimetypeResolver, config: &'a ArchiveConfig) -> Self {
        Self { resolver, config }
    }

    /// Sniff a blob already known to be a ZIP container.
    pub fn sniff(&self, blob: &dyn Blob, allow_list: Option<&ArchiveAllowList>) -> Option<String> {
        self.sniff_blob(blob, allow_list).into_mimetype()
    }

    pub fn sniff_blob(&self, blob: &dyn Blob, allow_list: Option<&ArchiveAllowList>) -> SniffOutcome {
        if allow_list.is_none() || !self.config.enabled {
            return SniffOutcome::Inactive;
        }
        match blob.open() {
            Ok(reader) => self.sniff_reader(reader, allow_list),
            Err(err) => {
                debug!(filename = ?blob.filename(), error = %err, "cannot open archive blob");
                SniffOutcome::Unreadable
            }
        }
    }

    pub fn sniff_reader<R: Read + Seek>(
        &self,
        reader: R,
        allow_list: Option<&ArchiveAllowList>,
    ) -> SniffOutcome {
        let allow_list = match allow_list {
            Some(list) if self.config.enabled => list,
            _ => return SniffOutcome::Inactive,
        };

        let mut cursor = ZipCursor::with_capacity(self.config);
        match cursor.open(reader, self.config) {
            Ok(ZipOpen::Ready) => {}
            Ok(ZipOpen::Fault(fault)) => {
                debug!(?fault, "archive rejected");
                return SniffOutcome::Unreadable;
            }
            Err(err) => {
                debug!(error = %err, "archive unreadable");
                return SniffOutcome::Unreadable;
            }
        }

        loop {
            let meta = match cursor.next_entry() {
                Ok(ZipNext::Entry(meta)) => meta,
                Ok(ZipNext::End) => return SniffOutcome::NoHit,
                Ok(ZipNext::Fault(fault)) => {
                    debug!(?fault, "archive entry table rejected");
                    return SniffOutcome::Unreadable;
                }
                Err(err) => {
                    debug!(error = %err, "archive entry table unreadable");
                    return SniffOutcome::Unreadable;
                }
            };
            if meta.is_dir || meta.name_truncated {
                continue;
            }

            let name = entry_display_name(meta.name);
            if name.is_empty() || is_hidden_name(&name) {
                continue;
            }
            let extension = file_extension(&name);
            let mimetype = self.resolver.resolve_filename(&name);

            if allow_list.contains_mimetype(mimetype.as_deref())
                || allow_list.contains_extension(extension)
            {
                trace!(entry = %name, mimetype = ?mimetype, "archive entry selected");
                return SniffOutcome::Hit {
                    entry: name.into_owned(),
                    mimetype,
                };
            }
        }
    }
}
