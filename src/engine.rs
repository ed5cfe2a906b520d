//! Classification engine: blob or (mimetype, extension) in, facet list out.
//!
//! # Engine flow (blob)
//! 1) Resolve the outer mimetype (resolver over filename + header bytes,
//!    falling back to the declared mimetype) and the filename extension.
//! 2) If the outer mimetype is `application/zip`, substitute the archive's
//!    representative mimetype. The extension is carried forward unchanged.
//! 3) Nothing to match on: empty facet list, no registry lookup.
//! 4) Otherwise run the ordered first-match scan.
//!
//! ## Key invariants
//! - One call observes exactly one registry snapshot.
//! - Facets are returned verbatim from the winning rule, never merged.
//! - No input makes these entry points fail; they degrade to "no facets" or
//!   "unsupported".

use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::api::Blob;
use crate::archive::path::file_extension;
use crate::archive::{detect_kind_from_mimetype, ArchiveConfig, ArchiveContentSniffer, ArchiveKind};
use crate::matcher;
use crate::mime::{DefaultMimetypeResolver, MimetypeResolver, HEADER_SNIFF_LEN};
use crate::registry::{RegistrySnapshot, RuleRegistry};

/// How the ordered scan treats a matching rule with no facets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Stop at the first matching rule, even if its facet list is empty.
    #[default]
    FirstMatch,
    /// Skip matching rules whose facet list is empty and keep scanning.
    FirstNonEmpty,
}

/// Outer mimetype and extension of a blob before archive substitution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedBlob {
    pub mimetype: Option<String>,
    pub extension: Option<String>,
}

/// Turns blobs into facet lists using the rules of a shared [`RuleRegistry`].
#[derive(Clone)]
pub struct ClassificationEngine {
    registry: Arc<RuleRegistry>,
    resolver: Arc<dyn MimetypeResolver>,
    archive: ArchiveConfig,
    policy: MatchPolicy,
}

impl ClassificationEngine {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self {
            registry,
            resolver: Arc::new(DefaultMimetypeResolver),
            archive: ArchiveConfig::default(),
            policy: MatchPolicy::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn MimetypeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_archive_config(mut self, archive: ArchiveConfig) -> Self {
        self.archive = archive;
        self
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub(crate) fn set_archive_config(&mut self, archive: ArchiveConfig) {
        self.archive = archive;
    }

    pub(crate) fn set_match_policy(&mut self, policy: MatchPolicy) {
        self.policy = policy;
    }

    #[inline]
    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    #[inline]
    pub fn archive_config(&self) -> &ArchiveConfig {
        &self.archive
    }

    #[inline]
    pub fn match_policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Facets of the first enabled rule (ascending `order`) that matches.
    pub fn classify(&self, mimetype: Option<&str>, extension: Option<&str>) -> Vec<String> {
        let snapshot = self.registry.snapshot();
        self.classify_in(&snapshot, non_blank(mimetype), non_blank(extension))
    }

    /// Facets for a blob. An absent blob has no facets.
    pub fn classify_blob(&self, blob: Option<&dyn Blob>) -> Vec<String> {
        self.classify_blob_in(&self.registry.snapshot(), blob)
    }

    /// [`classify_blob`](Self::classify_blob) against a snapshot the caller
    /// already holds.
    pub(crate) fn classify_blob_in(
        &self,
        snapshot: &RegistrySnapshot,
        blob: Option<&dyn Blob>,
    ) -> Vec<String> {
        let blob = match blob {
            Some(b) => b,
            None => return Vec::new(),
        };
        let resolved = self.resolve_blob(blob);

        let mimetype = match detect_kind_from_mimetype(resolved.mimetype.as_deref()) {
            Some(ArchiveKind::Zip) => self.sniffer().sniff(blob, snapshot.allow_list()),
            None => resolved.mimetype,
        };
        let mimetype = non_blank(mimetype.as_deref());
        let extension = non_blank(resolved.extension.as_deref());

        if mimetype.is_none() && extension.is_none() {
            trace!(filename = ?blob.filename(), "nothing to classify");
            return Vec::new();
        }
        self.classify_in(snapshot, mimetype, extension)
    }

    /// Gate for accepting a blob at all.
    ///
    /// ZIP blobs are supported only when sniffing finds an allow-listed member.
    /// Every other present blob is supported, even if no rule would match it.
    pub fn is_blob_supported(&self, blob: Option<&dyn Blob>) -> bool {
        let blob = match blob {
            Some(b) => b,
            None => return false,
        };
        let resolved = self.resolve_blob(blob);
        match detect_kind_from_mimetype(resolved.mimetype.as_deref()) {
            Some(ArchiveKind::Zip) => {
                let snapshot = self.registry.snapshot();
                self.sniffer().sniff(blob, snapshot.allow_list()).is_some()
            }
            None => true,
        }
    }

    /// Resolve a blob's outer mimetype and extension.
    pub fn resolve_blob(&self, blob: &dyn Blob) -> ResolvedBlob {
        let filename = blob.filename();
        let head = read_head(blob);
        let mimetype = self
            .resolver
            .resolve(filename, &head)
            .or_else(|| non_blank(blob.mimetype()).map(str::to_owned));
        let extension = filename.and_then(file_extension).map(str::to_owned);
        ResolvedBlob {
            mimetype,
            extension,
        }
    }

    fn sniffer(&self) -> ArchiveContentSniffer<'_> {
        ArchiveContentSniffer::new(self.resolver.as_ref(), &self.archive)
    }

    fn classify_in(
        &self,
        snapshot: &RegistrySnapshot,
        mimetype: Option<&str>,
        extension: Option<&str>,
    ) -> Vec<String> {
        for rule in snapshot.ordered_rules() {
            if !matcher::matches(rule, mimetype, extension) {
                continue;
            }
            if self.policy == MatchPolicy::FirstNonEmpty && rule.facets().is_empty() {
                continue;
            }
            trace!(rule = rule.name(), ?mimetype, ?extension, "media type rule matched");
            return rule.facets().to_vec();
        }
        trace!(?mimetype, ?extension, "no media type rule matched");
        Vec::new()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Read up to `HEADER_SNIFF_LEN` bytes; unreadable blobs yield an empty header.
fn read_head(blob: &dyn Blob) -> Vec<u8> {
    let mut head = Vec::with_capacity(HEADER_SNIFF_LEN);
    match blob.open() {
        Ok(reader) => {
            if let Err(err) = reader.take(HEADER_SNIFF_LEN as u64).read_to_end(&mut head) {
                debug!(filename = ?blob.filename(), error = %err, "blob header unreadable");
            }
        }
        Err(err) => {
            debug!(filename = ?blob.filename(), error = %err, "blob open failed");
        }
    }
    head
}
