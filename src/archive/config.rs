//! Archive introspection limits.
//!
//! # Invariants
//! - All limits are hard bounds and must be non-zero.
//! - Archives are treated as hostile input: counts, sizes and names are untrusted.
//!
//! # Design Notes
//! - Only metadata is ever read, so there are no decompression caps.
//! - Defaults admit any well-formed Zip32 archive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard limits applied while walking an archive's entry table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Master enable switch.
    ///
    /// When disabled, ZIP blobs are never opened and always sniff to "no match".
    pub enabled: bool,
    /// Maximum number of entries an archive may declare.
    pub max_entries_per_archive: u32,
    /// Maximum bytes of archive metadata parsed per archive.
    pub max_archive_metadata_bytes: u64,
    /// Maximum stored entry-name length in bytes. Longer names are truncated.
    pub max_entry_name_len: usize,
}

/// Validation error returned by [`ArchiveConfig::validate`].
///
/// Callers should treat this as a configuration bug, not hostile input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArchiveConfigError {
    #[error("max_entries_per_archive must be > 0")]
    MaxEntriesPerArchiveZero,
    #[error("max_archive_metadata_bytes must be > 0")]
    MaxArchiveMetadataBytesZero,
    #[error("max_entry_name_len must be > 0")]
    MaxEntryNameLenZero,
    #[error("max_archive_metadata_bytes ({metadata}) cannot hold one entry name ({name_len})")]
    MetadataBudgetTooSmall { metadata: u64, name_len: usize },
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries_per_archive: u16::MAX as u32,
            max_archive_metadata_bytes: 16 * 1024 * 1024, // 16 MiB
            max_entry_name_len: 4096,
        }
    }
}

impl ArchiveConfig {
    /// Validate cross-field invariants. Cheap; call once at startup.
    pub fn validate(&self) -> Result<(), ArchiveConfigError> {
        if self.max_entries_per_archive == 0 {
            return Err(ArchiveConfigError::MaxEntriesPerArchiveZero);
        }
        if self.max_archive_metadata_bytes == 0 {
            return Err(ArchiveConfigError::MaxArchiveMetadataBytesZero);
        }
        if self.max_entry_name_len == 0 {
            return Err(ArchiveConfigError::MaxEntryNameLenZero);
        }
        if self.max_archive_metadata_bytes < self.max_entry_name_len as u64 {
            return Err(ArchiveConfigError::MetadataBudgetTooSmall {
                metadata: self.max_archive_metadata_bytes,
                name_len: self.max_entry_name_len,
            });
        }
        Ok(())
    }
}
