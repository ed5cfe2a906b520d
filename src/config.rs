//! Declarative configuration: rule records, the archive allow-list, limits.
//!
//! # Design Notes
//! - Loading is strict (`from_json_*` validate before returning); registration
//!   is lenient. Callers that want to reject a bad file do so here.
//! - `merge` mirrors how later contributions override earlier ones: rules are
//!   appended (same name = later wins once registered); the allow-list, the
//!   archive limits and the match policy are replaced only when the newer
//!   config carries them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{ArchiveAllowList, MediaTypeRule};
use crate::archive::{ArchiveConfig, ArchiveConfigError};
use crate::engine::MatchPolicy;
use crate::matcher::RuleError;

/// Configuration load or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read media configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse media configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid archive limits: {0}")]
    Archive(#[from] ArchiveConfigError),
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Everything the engine needs from the outside world.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub mediatypes: Vec<MediaTypeRule>,
    pub supported_zip_content: Option<ArchiveAllowList>,
    /// Absent: keep whatever limits are already active.
    pub archive: Option<ArchiveConfig>,
    /// Absent: keep the active policy.
    pub match_policy: Option<MatchPolicy>,
}

impl MediaConfig {
    /// The standard picture/video/audio rules.
    pub fn builtin() -> Self {
        Self {
            mediatypes: vec![
                MediaTypeRule::new("Picture", 10)
                    .mimetype("image/.*")
                    .mimetype("application/photoshop")
                    .mimetype("application/illustrator")
                    .mimetype("application/postscript")
                    .facet("Picture"),
                MediaTypeRule::new("Video", 20)
                    .mimetype("video/.*")
                    .mimetype("application/mxf")
                    .facet("Video")
                    .facet("HasStoryboard")
                    .facet("HasVideoPreview"),
                MediaTypeRule::new("Audio", 30)
                    .mimetype("audio/.*")
                    .facet("Audio"),
            ],
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_slice(bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Check archive limits and compile every rule pattern.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(archive) = &self.archive {
            archive.validate()?;
        }
        for rule in &self.mediatypes {
            rule.validate()?;
        }
        Ok(())
    }

    /// Layer `other` on top of `self`.
    pub fn merge(mut self, other: MediaConfig) -> Self {
        self.mediatypes.extend(other.mediatypes);
        if other.supported_zip_content.is_some() {
            self.supported_zip_content = other.supported_zip_content;
        }
        if other.archive.is_some() {
            self.archive = other.archive;
        }
        if other.match_policy.is_some() {
            self.match_policy = other.match_policy;
        }
        self
    }
}
