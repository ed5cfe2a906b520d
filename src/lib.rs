//! Facet classification for media assets.
//!
//! ## Scope
//! This crate decides which capability facets ("Picture", "Video", "Audio",
//! ...) a stored asset should carry, based on its content type, its filename
//! extension and, for ZIP containers, the first allow-listed member inside.
//!
//! ## Key invariants
//! - Rules are evaluated in ascending `order`; the first enabled match wins
//!   and its facets are returned verbatim.
//! - Rule patterns are full-string regular expressions; extensions compare
//!   case-insensitively.
//! - Reconciliation only touches facets some registered rule can assign.
//! - Classification never fails: unreadable or malformed input degrades to
//!   "no facets".
//!
//! ## Engine flow (blob)
//! 1) Resolve the outer mimetype (filename, then header bytes, then the
//!    declared mimetype) and the filename extension.
//! 2) ZIP containers: substitute the mimetype of the first allow-listed entry.
//! 3) Ordered first-match scan over the registry snapshot.
//! 4) Optionally reconcile an entity's facet set against the result.
//!
//! ## Notable entry points
//! - `MediaAssetService` / `MediaConfig`: configured facade for hosts.
//! - `ClassificationEngine`: classification over a shared `RuleRegistry`.
//! - `ArchiveContentSniffer`: representative mimetype of a ZIP blob.
//! - `reconcile` / `FacetTarget`: facet set updates.

pub mod archive;
pub mod config;
pub mod matcher;
pub mod mime;
pub mod reconcile;
pub mod registry;
pub mod service;
#[cfg(test)]
pub mod test_utils;

mod api;
mod engine;

pub use api::{ArchiveAllowList, Blob, FileBlob, MediaTypeRule, MemoryBlob, ReadSeek};
pub use archive::{ArchiveConfig, ArchiveConfigError, ArchiveContentSniffer, SniffOutcome};
pub use config::{ConfigError, MediaConfig};
pub use engine::{ClassificationEngine, MatchPolicy, ResolvedBlob};
pub use matcher::{CompiledRule, RuleError};
pub use mime::{DefaultMimetypeResolver, MimetypeResolver, HEADER_SNIFF_LEN};
pub use reconcile::{reconcile, FacetDelta, FacetSet, FacetTarget};
pub use registry::{RegistrySnapshot, RuleRegistry};
pub use service::{MediaAssetService, MediaEntity};
