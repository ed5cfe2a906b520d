use std::fs::File;
use std::io::{self, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::matcher::{extension_matches, CompiledRule, RuleError};

// --------------------------
// Rule records
// --------------------------

/// A named classification rule.
///
/// Rules are keyed by `name` in the registry; re-registering a name replaces
/// the prior rule. A rule with neither patterns nor extensions never matches.
/// A rule with an empty `facets` list can still be the winning match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTypeRule {
    pub name: String,

    /// Regular expressions matched against the full mimetype string.
    #[serde(default, rename = "mimetypes", alias = "mimetype_patterns")]
    pub mimetype_patterns: Vec<String>,

    /// File extensions without a leading dot, compared ASCII case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Facets granted when this rule wins.
    #[serde(default)]
    pub facets: Vec<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Lower values are evaluated first.
    #[serde(default)]
    pub order: i32,
}

fn default_enabled() -> bool {
    true
}

impl MediaTypeRule {
    /// Enabled rule with no criteria and no facets.
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            mimetype_patterns: Vec::new(),
            extensions: Vec::new(),
            facets: Vec::new(),
            enabled: true,
            order,
        }
    }

    pub fn mimetype(mut self, pattern: impl Into<String>) -> Self {
        self.mimetype_patterns.push(pattern.into());
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    pub fn facet(mut self, facet: impl Into<String>) -> Self {
        self.facets.push(facet.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// True if the rule has at least one mimetype pattern or extension.
    #[inline]
    pub fn has_criteria(&self) -> bool {
        !self.mimetype_patterns.is_empty() || !self.extensions.is_empty()
    }

    /// Strict check: the name is non-blank and every pattern compiles.
    pub fn validate(&self) -> Result<(), RuleError> {
        CompiledRule::try_compile(self.clone()).map(drop)
    }
}

/// Mimetypes and extensions considered meaningful payload inside an archive.
///
/// At most one allow-list is active per registry; registering a new one
/// replaces the previous list wholesale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveAllowList {
    #[serde(default)]
    pub mimetypes: Vec<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl ArchiveAllowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetypes.push(mimetype.into());
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mimetypes.is_empty() && self.extensions.is_empty()
    }

    /// Exact (case-sensitive) mimetype membership.
    pub fn contains_mimetype(&self, mimetype: Option<&str>) -> bool {
        match mimetype {
            Some(m) => self.mimetypes.iter().any(|candidate| candidate == m),
            None => false,
        }
    }

    /// Case-insensitive extension membership.
    pub fn contains_extension(&self, extension: Option<&str>) -> bool {
        extension_matches(extension, &self.extensions)
    }
}

// --------------------------
// Blob handles
// --------------------------

/// Object-safe `Read + Seek`.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// Read-only handle to an opaque binary asset owned by the caller.
///
/// `open` may be called more than once; each call returns a fresh reader
/// positioned at the start of the content.
pub trait Blob {
    fn filename(&self) -> Option<&str>;

    /// Mimetype declared by whoever produced the blob, if any.
    fn mimetype(&self) -> Option<&str> {
        None
    }

    fn open(&self) -> io::Result<Box<dyn ReadSeek + '_>>;
}

/// Blob backed by an in-memory byte buffer.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlob {
    bytes: Vec<u8>,
    filename: Option<String>,
    mimetype: Option<String>,
}

impl MemoryBlob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: None,
            mimetype: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Blob for MemoryBlob {
    fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    fn mimetype(&self) -> Option<&str> {
        self.mimetype.as_deref()
    }

    fn open(&self) -> io::Result<Box<dyn ReadSeek + '_>> {
        Ok(Box::new(Cursor::new(self.bytes.as_slice())))
    }
}

/// Blob backed by a file on disk. The filename defaults to the path's final
/// component.
#[derive(Clone, Debug)]
pub struct FileBlob {
    path: PathBuf,
    filename: Option<String>,
    mimetype: Option<String>,
}

impl FileBlob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned);
        Self {
            path,
            filename,
            mimetype: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Blob for FileBlob {
    fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    fn mimetype(&self) -> Option<&str> {
        self.mimetype.as_deref()
    }

    fn open(&self) -> io::Result<Box<dyn ReadSeek + '_>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}
