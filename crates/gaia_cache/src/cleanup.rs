//! Best-effort removal of stale cache artifacts.
//!
//! Removal failures are never fatal: a fresh entry never reuses a stale
//! entry's token-derived path, so a leftover file or directory wastes
//! disk space but cannot corrupt the cache. Failures are reported as
//! warnings through the sink; successes as info.

use crate::error::CacheError;
use gaia_diagnostics::{Diagnostic, DiagnosticsSink};
use std::path::Path;

/// Removes a directory tree, reporting the outcome through the sink.
///
/// A directory that is already gone counts as success and is not
/// reported.
pub(crate) fn remove_dir_best_effort(path: &Path, description: &str, sink: &dyn DiagnosticsSink) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            sink.emit(Diagnostic::info(format!("removed {description}")).with_path(path));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            let err = CacheError::FilesystemCleanupFailed {
                path: path.to_path_buf(),
                source,
            };
            sink.emit(Diagnostic::warning(err.to_string()).with_path(path));
        }
    }
}

/// Removes a single file, reporting the outcome through the sink.
pub(crate) fn remove_file_best_effort(path: &Path, description: &str, sink: &dyn DiagnosticsSink) {
    match std::fs::remove_file(path) {
        Ok(()) => {
            sink.emit(Diagnostic::info(format!("removed {description}")).with_path(path));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            let err = CacheError::FilesystemCleanupFailed {
                path: path.to_path_buf(),
                source,
            };
            sink.emit(Diagnostic::warning(err.to_string()).with_path(path));
        }
    }
}
