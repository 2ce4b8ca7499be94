//! Error types for cache operations.

use gaia_common::TokenError;
use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Archive lookups report failures as `Err`; asset puts degrade to a
/// sentinel empty path and report the error through the diagnostics sink
/// instead. Cleanup failures are never fatal: they are emitted as
/// warnings and the operation proceeds, since a fresh entry never reuses
/// a stale entry's path.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The path does not name an existing regular file, so no
    /// modification time is obtainable.
    #[error("not a readable archive: {path}")]
    InvalidArchive {
        /// The offending archive path.
        path: PathBuf,
    },

    /// The resolver could not parse the archive. Never cached: the next
    /// lookup on the same path retries resolution from scratch.
    #[error("failed to resolve archive {path}: {reason}")]
    ArchiveResolutionFailed {
        /// The archive that failed to resolve.
        path: PathBuf,
        /// Description of the resolver failure.
        reason: String,
    },

    /// The caller supplied an empty file name for an asset buffer.
    #[error("asset {uri} has an empty file name")]
    InvalidAssetName {
        /// The symbolic URI of the rejected asset.
        uri: String,
    },

    /// An asset buffer could not be written to its materialized path.
    #[error("failed to write asset to {path}: {source}")]
    AssetWriteFailed {
        /// The destination path of the failed write.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// No unique token could be generated, aborting the operation that
    /// needed it before any cache state changed.
    #[error("failed to generate identifier: {reason}")]
    IdentifierGenerationFailed {
        /// Description of the token generation failure.
        reason: String,
    },

    /// A stale file or directory could not be removed.
    #[error("failed to remove stale cache entry at {path}: {source}")]
    FilesystemCleanupFailed {
        /// The path that could not be removed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O error occurred while setting up cache directories.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl From<TokenError> for CacheError {
    fn from(err: TokenError) -> Self {
        CacheError::IdentifierGenerationFailed {
            reason: err.to_string(),
        }
    }
}
