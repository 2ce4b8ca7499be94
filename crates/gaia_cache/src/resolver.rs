//! The archive resolution boundary and the symbol table it produces.
//!
//! Parsing an archive into a symbol table is expensive and entirely
//! outside this crate: the cache only decides *when* to resolve, creates
//! the unpack directory, and retains the result. Implementations of
//! [`ArchiveResolver`] do the actual work.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A read-only symbol table built once per archive version.
///
/// Maps short symbolic keys (as referenced by rules) to fully resolved
/// locations, typically URIs into the unpack directory. The table is
/// immutable after construction; the cache hands out shared handles and
/// never mutates it.
#[derive(Debug, Clone, Default)]
pub struct ResolveMap {
    entries: HashMap<String, String>,
}

impl ResolveMap {
    /// Returns the resolved location for a symbolic key, if present.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns the number of symbols in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table contains no symbols.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the symbolic keys in the table.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for ResolveMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A resolve map shared between the cache and every caller holding a
/// handle.
///
/// Eviction of a cache entry never invalidates handles already issued:
/// the map lives as long as its longest holder.
pub type SharedResolveMap = Arc<ResolveMap>;

/// The resolver could not parse an archive.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ResolverError {
    message: String,
}

impl ResolverError {
    /// Creates a resolver error with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ResolverError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Parses archives into resolve maps.
///
/// Invoked by the archive cache only on a miss. `unpack_dir` is a fresh,
/// empty directory owned by the cache; the resolver extracts whatever
/// file content the symbol table points into it. Implementations must be
/// callable from any engine thread.
pub trait ArchiveResolver: Send + Sync {
    /// Parses `archive`, extracting into `unpack_dir`, and returns the
    /// symbol table.
    fn resolve(&self, archive: &Path, unpack_dir: &Path) -> Result<ResolveMap, ResolverError>;
}
