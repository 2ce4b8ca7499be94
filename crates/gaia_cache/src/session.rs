//! Session lifecycle: temp root ownership and cache construction.
//!
//! A [`Session`] spans one generation run. It creates a unique temporary
//! directory tree, wires both caches to it with a shared diagnostics
//! sink, and removes the whole tree when dropped. Sessions are plain
//! owned values: any number of them can coexist (parallel tests,
//! multiple open documents), each with its own directories.

use crate::archive::ArchiveCache;
use crate::asset::AssetCache;
use crate::cleanup;
use crate::error::CacheError;
use crate::resolver::ArchiveResolver;
use gaia_common::Token;
use gaia_config::SessionConfig;
use gaia_diagnostics::{ConsoleSink, DiagnosticsSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Owner of the cache subsystem for one generation run.
pub struct Session {
    temp_root: PathBuf,
    archives: ArchiveCache,
    assets: AssetCache,
    sink: Arc<dyn DiagnosticsSink>,
}

impl Session {
    /// Creates a session with the default configuration.
    pub fn new(
        resolver: Arc<dyn ArchiveResolver>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Result<Self, CacheError> {
        Self::with_config(SessionConfig::default(), resolver, sink)
    }

    /// Creates a session with an explicit configuration.
    ///
    /// The temp root is `<base>/<session-token>`, where `<base>` is the
    /// configured root or the system temporary directory joined with the
    /// configured directory name. The per-session token keeps concurrent
    /// sessions out of each other's directories. Creating the root is the
    /// one hard filesystem requirement at startup; failure is
    /// [`CacheError::Io`].
    pub fn with_config(
        config: SessionConfig,
        resolver: Arc<dyn ArchiveResolver>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Result<Self, CacheError> {
        let base = config
            .temp_root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(&config.dir_name));
        let session_token = Token::generate()?;
        let temp_root = base.join(session_token.to_string());
        std::fs::create_dir_all(&temp_root).map_err(|source| CacheError::Io {
            path: temp_root.clone(),
            source,
        })?;

        let archives = ArchiveCache::new(temp_root.clone(), resolver, Arc::clone(&sink));
        let assets = AssetCache::new(temp_root.join(&config.asset_subdir), Arc::clone(&sink));

        Ok(Self {
            temp_root,
            archives,
            assets,
            sink,
        })
    }

    /// Creates a session whose diagnostics go to stderr, filtered at the
    /// configured minimum severity.
    pub fn with_console_sink(
        config: SessionConfig,
        resolver: Arc<dyn ArchiveResolver>,
    ) -> Result<Self, CacheError> {
        let sink: Arc<dyn DiagnosticsSink> = Arc::new(ConsoleSink::new(config.min_log_level));
        Self::with_config(config, resolver, sink)
    }

    /// The archive cache for this session.
    pub fn archives(&self) -> &ArchiveCache {
        &self.archives
    }

    /// The asset cache for this session.
    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    /// The directory tree this session writes under.
    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        cleanup::remove_dir_best_effort(&self.temp_root, "session temp root", self.sink.as_ref());
    }
}
