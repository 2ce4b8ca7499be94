//! Materialization of generated asset buffers to stable file paths.
//!
//! Encoders hand the engine in-memory buffers (textures, meshes) keyed by
//! a symbolic URI; downstream consumers need files. Each distinct URI is
//! written at most once per distinct content: an unchanged buffer is a
//! pure lookup, a changed buffer replaces the file under a fresh unique
//! name. File names are token-prefixed, so same-named assets from
//! different sources never collide.

use crate::cleanup;
use crate::error::CacheError;
use gaia_common::{ContentHash, Token};
use gaia_diagnostics::DiagnosticsSink;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A materialized asset: where it lives and what content it holds.
struct AssetEntry {
    path: PathBuf,
    content_hash: ContentHash,
}

/// Cache of materialized asset files, keyed by symbolic URI.
///
/// The entire lookup/compare/write/update sequence of [`put`](Self::put)
/// runs under one exclusive lock: at most one thread materializes a given
/// URI's content at a time, and no thread ever observes a half-written
/// entry. This serializes asset writes across worker threads.
pub struct AssetCache {
    entries: Mutex<HashMap<String, AssetEntry>>,
    asset_root: PathBuf,
    sink: Arc<dyn DiagnosticsSink>,
}

impl AssetCache {
    /// Creates an empty cache that materializes files into `asset_root`.
    ///
    /// The directory itself is created on the first write.
    pub fn new(asset_root: PathBuf, sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            asset_root,
            sink,
        }
    }

    /// Materializes `buffer` for `uri`, returning the file path.
    ///
    /// An unchanged buffer for a known URI returns the existing path with
    /// zero I/O. A changed buffer is written to a fresh unique path and
    /// the previous file is removed (best-effort). On failure (an empty
    /// `suggested_name`, a token generation failure, or a write error)
    /// the error is reported through the diagnostics sink, the cache is
    /// left unmutated, and the returned path is empty; callers are
    /// expected to substitute a placeholder asset rather than abort.
    pub fn put(&self, uri: &str, suggested_name: &str, buffer: &[u8]) -> PathBuf {
        match self.try_put(uri, suggested_name, buffer) {
            Ok(path) => path,
            Err(err) => {
                self.sink.error(&err.to_string());
                PathBuf::new()
            }
        }
    }

    fn try_put(
        &self,
        uri: &str,
        suggested_name: &str,
        buffer: &[u8],
    ) -> Result<PathBuf, CacheError> {
        if suggested_name.is_empty() {
            return Err(CacheError::InvalidAssetName {
                uri: uri.to_string(),
            });
        }

        let content_hash = ContentHash::of(buffer);
        let mut entries = self.entries.lock().unwrap();

        if let Some(entry) = entries.get_mut(uri) {
            if entry.content_hash == content_hash {
                return Ok(entry.path.clone());
            }
            // Content drifted since the last generation run: write the
            // new revision first, only then retire the old file.
            let new_path = self.write_unique(suggested_name, buffer)?;
            let old_path = std::mem::replace(&mut entry.path, new_path.clone());
            entry.content_hash = content_hash;
            cleanup::remove_file_best_effort(&old_path, "outdated asset file", self.sink.as_ref());
            return Ok(new_path);
        }

        let path = self.write_unique(suggested_name, buffer)?;
        entries.insert(
            uri.to_string(),
            AssetEntry {
                path: path.clone(),
                content_hash,
            },
        );
        Ok(path)
    }

    /// Writes `buffer` to a fresh token-prefixed path under the asset
    /// root.
    fn write_unique(&self, suggested_name: &str, buffer: &[u8]) -> Result<PathBuf, CacheError> {
        let token = Token::generate()?;
        std::fs::create_dir_all(&self.asset_root).map_err(|source| CacheError::AssetWriteFailed {
            path: self.asset_root.clone(),
            source,
        })?;
        let path = self.asset_root.join(format!("{token}_{suggested_name}"));
        if let Err(source) = std::fs::write(&path, buffer) {
            // A partial write must not survive looking like an asset.
            let _ = std::fs::remove_file(&path);
            return Err(CacheError::AssetWriteFailed { path, source });
        }
        Ok(path)
    }

    /// Returns the directory assets are materialized into.
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Returns the number of materialized assets.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Returns `true` if no assets have been materialized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
