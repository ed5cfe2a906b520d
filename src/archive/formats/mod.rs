//! Format-specific helpers used by detection and sniffing.
//!
//! # Design Notes
//! - This module re-exports small, bounded parsers tailored for metadata walks.

pub mod zip;

pub use self::zip::{is_zip_magic, ZipCursor, ZipEntryMeta, ZipFault, ZipNext, ZipOpen};
