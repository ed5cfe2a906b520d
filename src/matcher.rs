//! Precompiled rule representation and the single-rule match predicate.
//!
//! # Invariants
//! - Mimetype patterns are anchored at compile time (`^(?:p)$`), so a match is
//!   always a full-string match, never a substring search.
//! - A rule with any malformed pattern is poisoned: it never matches on either
//!   axis. Poisoning is decided once, at compile time.
//! - Extension comparison is ASCII case-insensitive exact equality.

use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::api::MediaTypeRule;

/// Rule rejected by strict validation.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("media type rule has an empty name")]
    EmptyName,
    #[error("rule `{rule}`: invalid mimetype pattern `{pattern}`: {source}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A rule plus its compiled mimetype patterns.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    rule: MediaTypeRule,
    patterns: Vec<Regex>,
    poisoned: bool,
}

impl CompiledRule {
    /// Compile strictly; the first malformed pattern is returned as an error.
    pub fn try_compile(rule: MediaTypeRule) -> Result<Self, RuleError> {
        if rule.name.trim().is_empty() {
            return Err(RuleError::EmptyName);
        }
        let mut patterns = Vec::with_capacity(rule.mimetype_patterns.len());
        for pattern in &rule.mimetype_patterns {
            match compile_full_match(pattern) {
                Ok(re) => patterns.push(re),
                Err(source) => {
                    return Err(RuleError::InvalidPattern {
                        rule: rule.name.clone(),
                        pattern: pattern.clone(),
                        source,
                    })
                }
            }
        }
        Ok(Self {
            rule,
            patterns,
            poisoned: false,
        })
    }

    /// Compile leniently: malformed patterns poison the rule instead of failing.
    pub fn compile(rule: MediaTypeRule) -> Self {
        let mut patterns = Vec::with_capacity(rule.mimetype_patterns.len());
        let mut poisoned = false;
        for pattern in &rule.mimetype_patterns {
            match compile_full_match(pattern) {
                Ok(re) => patterns.push(re),
                Err(err) => {
                    warn!(
                        rule = %rule.name,
                        pattern = %pattern,
                        error = %err,
                        "invalid mimetype pattern; rule will never match"
                    );
                    poisoned = true;
                }
            }
        }
        Self {
            rule,
            patterns,
            poisoned,
        }
    }

    #[inline]
    pub fn rule(&self) -> &MediaTypeRule {
        &self.rule
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.rule.name
    }

    #[inline]
    pub fn facets(&self) -> &[String] {
        &self.rule.facets
    }

    #[inline]
    pub fn order(&self) -> i32 {
        self.rule.order
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.rule.enabled
    }

    /// True if a configuration error disabled this rule.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Returns true if the mimetype matches any pattern.
    pub fn matches_mimetype(&self, mimetype: Option<&str>) -> bool {
        match mimetype {
            Some(m) => self.patterns.iter().any(|re| re.is_match(m)),
            None => false,
        }
    }

    /// Returns true if the extension equals any configured extension.
    pub fn matches_extension(&self, extension: Option<&str>) -> bool {
        extension_matches(extension, &self.rule.extensions)
    }
}

/// Decide whether a single rule matches by content type OR by extension.
///
/// `enabled` is not consulted here; the registry snapshot only hands out
/// enabled rules.
pub fn matches(rule: &CompiledRule, mimetype: Option<&str>, extension: Option<&str>) -> bool {
    if rule.poisoned {
        return false;
    }
    rule.matches_mimetype(mimetype) || rule.matches_extension(extension)
}

/// Case-insensitive exact extension membership. Blank extensions never match.
pub fn extension_matches(extension: Option<&str>, extensions: &[String]) -> bool {
    let ext = match extension {
        Some(e) if !e.trim().is_empty() => e,
        _ => return false,
    };
    extensions
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(ext))
}

fn compile_full_match(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}
