//! Entity-facing facade: configuration in, facets on entities out.
//!
//! `MediaAssetService` owns the wiring between a [`RuleRegistry`], a
//! [`ClassificationEngine`] and the reconciler. Hosts hand it entities through
//! the [`MediaEntity`] trait and keep persistence on their side.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::Blob;
use crate::config::MediaConfig;
use crate::engine::ClassificationEngine;
use crate::mime::MimetypeResolver;
use crate::reconcile::{reconcile, FacetDelta, FacetTarget};
use crate::registry::RuleRegistry;

/// An entity carrying a primary content blob and a facet set.
pub trait MediaEntity {
    fn content(&self) -> Option<&dyn Blob>;
    fn facets_mut(&mut self) -> &mut dyn FacetTarget;
}

#[derive(Clone)]
pub struct MediaAssetService {
    engine: ClassificationEngine,
}

impl MediaAssetService {
    pub fn new() -> Self {
        Self {
            engine: ClassificationEngine::new(Arc::new(RuleRegistry::new())),
        }
    }

    pub fn from_config(config: MediaConfig) -> Self {
        let mut service = Self::new();
        service.apply_config(config);
        service
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn MimetypeResolver>) -> Self {
        self.engine = self.engine.with_resolver(resolver);
        self
    }

    /// Deliver rule records, the allow-list and limits at runtime.
    ///
    /// Rules are registered in list order; a name seen again replaces the
    /// earlier rule. An absent allow-list, limit block or policy leaves the
    /// active one in place.
    pub fn apply_config(&mut self, config: MediaConfig) {
        let MediaConfig {
            mediatypes,
            supported_zip_content,
            archive,
            match_policy,
        } = config;

        let registry = self.engine.registry();
        let count = mediatypes.len();
        for rule in mediatypes {
            registry.register_rule(rule);
        }
        if let Some(list) = supported_zip_content {
            registry.register_allow_list(list);
        }
        if let Some(archive) = archive {
            match archive.validate() {
                Ok(()) => self.engine.set_archive_config(archive),
                Err(err) => warn!(error = %err, "keeping previous archive limits"),
            }
        }
        if let Some(policy) = match_policy {
            self.engine.set_match_policy(policy);
        }
        debug!(
            rules = count,
            generation = self.engine.registry().snapshot().generation(),
            "media configuration applied"
        );
    }

    #[inline]
    pub fn engine(&self) -> &ClassificationEngine {
        &self.engine
    }

    #[inline]
    pub fn registry(&self) -> &Arc<RuleRegistry> {
        self.engine.registry()
    }

    pub fn media_facets(&self, mimetype: Option<&str>) -> Vec<String> {
        self.engine.classify(mimetype, None)
    }

    pub fn media_facets_for(&self, mimetype: Option<&str>, extension: Option<&str>) -> Vec<String> {
        self.engine.classify(mimetype, extension)
    }

    pub fn blob_facets(&self, blob: Option<&dyn Blob>) -> Vec<String> {
        self.engine.classify_blob(blob)
    }

    pub fn is_blob_supported(&self, blob: Option<&dyn Blob>) -> bool {
        self.engine.is_blob_supported(blob)
    }

    /// Every facet any registered rule can assign.
    pub fn all_media_facets(&self) -> Vec<String> {
        self.registry().facet_universe()
    }

    /// Classify the entity's content and bring its facets in line.
    ///
    /// Absent content clears every facet of the universe.
    pub fn update_entity_facets<E: MediaEntity + ?Sized>(&self, entity: &mut E) -> FacetDelta {
        let snapshot = self.registry().snapshot();
        let desired = self.engine.classify_blob_in(&snapshot, entity.content());
        let delta = reconcile(entity.facets_mut(), &desired, snapshot.facet_universe());
        if !delta.is_empty() {
            debug!(added = ?delta.added, removed = ?delta.removed, "entity facets updated");
        }
        delta
    }
}

impl Default for MediaAssetService {
    fn default() -> Self {
        Self::new()
    }
}
