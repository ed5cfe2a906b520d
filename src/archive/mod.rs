//! Archive introspection support modules.
//!
//! # Scope
//! This module defines the contract for looking inside container blobs:
//! limits, container detection, entry-name handling, the ZIP entry-table
//! reader, and the allow-list sniffer built on top of them.
//!
//! # Design Notes
//! - Introspection is metadata-only and bounded by `ArchiveConfig` caps.
//! - Structural problems are outcome values, never panics.

pub mod config;
pub mod detect;
pub mod formats;
pub mod path;
pub mod sniff;

pub use config::{ArchiveConfig, ArchiveConfigError};
pub use detect::{detect_kind_from_mimetype, sniff_kind_from_header, ArchiveKind, MIMETYPE_ZIP};
pub use formats::ZipFault;
pub use path::{entry_display_name, file_extension, is_hidden_name};
pub use sniff::{ArchiveContentSniffer, SniffOutcome};
