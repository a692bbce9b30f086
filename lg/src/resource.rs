//! Resource names and sources
//!
//! A resource name has the form `<prefix>[.<language>].<ext>`, e.g.
//! `Greet.lg`, `Greet.fr.lg`, `dialogs/Greet.fr-fr.lg`. Only the final path
//! component takes part in parsing.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{LgError, Result};

/// Default resource extension
pub const DEFAULT_EXTENSION: &str = ".lg";

/// A parsed resource name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Locale-independent logical name
    pub prefix: String,
    /// Locale suffix, `""` when absent (case preserved)
    pub language: String,
}

/// Splits resource names into prefix and language for a given extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParser {
    extension: String,
}

impl Default for NameParser {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl NameParser {
    /// Create a parser for `extension` (leading dot optional)
    pub fn new(extension: &str) -> Self {
        let extension = extension.trim();
        let extension = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{}", extension)
        };
        Self { extension }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether `name` ends with this parser's extension (case-insensitive)
    pub fn matches(&self, name: &str) -> bool {
        self.strip_extension(file_name(name)).is_some()
    }

    /// Parse `name` into prefix and language
    ///
    /// Total: names that are empty or lack the extension come back unchanged
    /// with an empty language.
    pub fn parse(&self, name: &str) -> ParsedName {
        let Some(stem) = self.strip_extension(file_name(name)) else {
            return ParsedName {
                prefix: name.to_string(),
                language: String::new(),
            };
        };

        match stem.rfind('.') {
            Some(idx) if idx > 0 => ParsedName {
                prefix: stem[..idx].to_string(),
                language: stem[idx + 1..].to_string(),
            },
            _ => ParsedName {
                prefix: stem.to_string(),
                language: String::new(),
            },
        }
    }

    /// Identifier of the `locale` variant of `base`
    ///
    /// `Greet.lg` + `fr` gives `Greet.fr.lg`; the neutral locale gives `base`
    /// back. Any directory part of `base` is kept.
    pub fn localize(&self, base: &str, locale: &str) -> String {
        if locale.is_empty() {
            return base.to_string();
        }
        match self.strip_extension(base) {
            Some(stem) => format!("{}.{}{}", stem, locale, &base[stem.len()..]),
            None => format!("{}.{}{}", base, locale, self.extension),
        }
    }

    fn strip_extension<'a>(&self, name: &'a str) -> Option<&'a str> {
        let split = name.len().checked_sub(self.extension.len())?;
        if !name.is_char_boundary(split) {
            return None;
        }
        let (stem, ext) = name.split_at(split);
        ext.eq_ignore_ascii_case(&self.extension).then_some(stem)
    }
}

/// Parse `name` with the default `.lg` extension
pub fn parse_resource_name(name: &str) -> ParsedName {
    NameParser::default().parse(name)
}

/// Final path component of `id`, accepting both `/` and `\` separators
pub fn file_name(id: &str) -> &str {
    match id.rfind(['/', '\\']) {
        Some(idx) => &id[idx + 1..],
        None => id,
    }
}

/// Join `reference` onto the directory of `source_id` and collapse `.`/`..`
///
/// Identifiers use `/` separators; `\` in either input is mapped to `/`.
/// Rooted references are returned normalized but otherwise unchanged.
pub fn join_relative(source_id: &str, reference: &str) -> String {
    let reference = reference.replace('\\', "/");
    let source_id = source_id.replace('\\', "/");

    let joined = if reference.starts_with('/') {
        reference
    } else {
        match source_id.rfind('/') {
            Some(idx) => format!("{}/{}", &source_id[..idx], reference),
            None => reference,
        }
    };

    let rooted = joined.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if rooted { format!("/{}", body) } else { body }
}

/// Read access to resource content by identifier
pub trait ResourceSource: Send + Sync {
    /// Whether a resource with this identifier exists
    fn exists(&self, id: &str) -> bool;

    /// Read the full content of a resource
    fn read(&self, id: &str) -> Result<String>;
}

/// Resources under a directory, addressed by `/`-separated relative paths
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every resource under the root matching `parser`'s extension
    ///
    /// Identifiers are relative to the root, use `/` separators, and are sorted.
    pub fn discover(&self, parser: &NameParser) -> Result<Vec<String>> {
        debug!(root = ?self.root, extension = parser.extension(), "FsSource::discover: called");
        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry.map_err(|e| LgError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let id = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if parser.matches(&id) {
                ids.push(id);
            }
        }
        ids.sort();
        debug!(count = ids.len(), "FsSource::discover: found resources");
        Ok(ids)
    }

    fn path_for(&self, id: &str) -> PathBuf {
        let id = id.replace('\\', "/");
        if id.starts_with('/') {
            PathBuf::from(id)
        } else {
            self.root.join(id)
        }
    }
}

impl ResourceSource for FsSource {
    fn exists(&self, id: &str) -> bool {
        self.path_for(id).is_file()
    }

    fn read(&self, id: &str) -> Result<String> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(LgError::ResourceNotFound(id.to_string()));
        }
        Ok(fs::read_to_string(path)?)
    }
}

/// In-memory resources, keyed case-insensitively by identifier
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    resources: IndexMap<String, (String, String)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource
    pub fn insert(&mut self, id: impl Into<String>, content: impl Into<String>) {
        let id = id.into();
        self.resources.insert(id.to_lowercase(), (id, content.into()));
    }

    pub fn with(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(id, content);
        self
    }

    /// Resource identifiers in insertion order, as originally spelled
    pub fn ids(&self) -> Vec<String> {
        self.resources.values().map(|(id, _)| id.clone()).collect()
    }
}

impl ResourceSource for MemorySource {
    fn exists(&self, id: &str) -> bool {
        self.resources.contains_key(&id.replace('\\', "/").to_lowercase())
    }

    fn read(&self, id: &str) -> Result<String> {
        self.resources
            .get(&id.replace('\\', "/").to_lowercase())
            .map(|(_, content)| content.clone())
            .ok_or_else(|| LgError::ResourceNotFound(id.to_string()))
    }
}
