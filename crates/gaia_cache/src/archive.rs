//! Caching of parsed rule-package archives.
//!
//! Resolving an archive (parsing its index and extracting its contents
//! into an unpack directory) is the most expensive step before
//! generation, so the result is cached per archive path. An entry stays
//! valid while the archive's on-disk modification time matches the one
//! stored at resolution; any change evicts the entry, removes its unpack
//! directory, and rebuilds from scratch. Resolution failures are never
//! cached.

use crate::cleanup;
use crate::error::CacheError;
use crate::resolver::{ArchiveResolver, SharedResolveMap};
use gaia_common::Token;
use gaia_diagnostics::{Diagnostic, DiagnosticsSink};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Whether a lookup was served from the cache or freshly resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// The archive was unchanged and the stored symbol table was reused.
    Hit,
    /// The archive was resolved anew. Symbol keys may now point to
    /// different content, so callers must drop anything they derived
    /// from this archive's previous symbol table.
    Miss,
}

/// A cached resolution of one archive version.
struct ArchiveEntry {
    resolve_map: SharedResolveMap,
    mtime: SystemTime,
    unpack_dir: PathBuf,
}

/// Cache of parsed archives, keyed by canonicalized path.
///
/// All lookups run under one exclusive lock covering timestamp
/// validation, eviction, resolution, and the map update, so concurrent
/// engine threads loading the same archive resolve it exactly once.
pub struct ArchiveCache {
    entries: Mutex<HashMap<PathBuf, ArchiveEntry>>,
    unpack_root: PathBuf,
    resolver: Arc<dyn ArchiveResolver>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl ArchiveCache {
    /// Creates an empty cache that unpacks archives into fresh
    /// subdirectories of `unpack_root`.
    pub fn new(
        unpack_root: PathBuf,
        resolver: Arc<dyn ArchiveResolver>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            unpack_root,
            resolver,
            sink,
        }
    }

    /// Looks up the symbol table for `archive`, resolving it if needed.
    ///
    /// Returns the shared symbol table handle and whether it was reused
    /// or rebuilt. On [`CacheStatus::Miss`] the caller must discard any
    /// state derived from the archive's previous symbol table.
    ///
    /// Fails with [`CacheError::InvalidArchive`] if `archive` is not an
    /// existing regular file, and with
    /// [`CacheError::ArchiveResolutionFailed`] if the resolver rejects
    /// it. A failed resolution is not remembered: the next call retries
    /// from scratch.
    pub fn get(&self, archive: &Path) -> Result<(SharedResolveMap, CacheStatus), CacheError> {
        let key = archive
            .canonicalize()
            .map_err(|_| CacheError::InvalidArchive {
                path: archive.to_path_buf(),
            })?;
        // The lock spans timestamp validation through the map update, so
        // concurrent loads of the same archive observe one consistent
        // mtime and resolve at most once.
        let mut entries = self.entries.lock().unwrap();

        let metadata = std::fs::metadata(&key).map_err(|_| CacheError::InvalidArchive {
            path: key.clone(),
        })?;
        if !metadata.is_file() {
            return Err(CacheError::InvalidArchive { path: key });
        }
        let mtime = metadata.modified().map_err(|_| CacheError::InvalidArchive {
            path: key.clone(),
        })?;

        if let Some(entry) = entries.get(&key) {
            if entry.mtime == mtime {
                self.sink.emit(
                    Diagnostic::debug("archive unchanged, reusing symbol table").with_path(&key),
                );
                return Ok((Arc::clone(&entry.resolve_map), CacheStatus::Hit));
            }
            self.sink.emit(
                Diagnostic::debug(format!(
                    "archive timestamp changed ({:?} -> {mtime:?})",
                    entry.mtime
                ))
                .with_path(&key),
            );
        }

        // Stale or absent: the previous unpack directory, if any, belongs
        // to an archive version that no longer exists on disk.
        if let Some(stale) = entries.remove(&key) {
            cleanup::remove_dir_best_effort(
                &stale.unpack_dir,
                "stale unpack directory",
                self.sink.as_ref(),
            );
        }

        let token = Token::generate()?;
        let unpack_dir = self.unpack_root.join(token.to_string());
        if let Err(source) = std::fs::create_dir_all(&unpack_dir) {
            let err = CacheError::ArchiveResolutionFailed {
                path: key.clone(),
                reason: format!(
                    "could not create unpack directory {}: {source}",
                    unpack_dir.display()
                ),
            };
            self.sink
                .emit(Diagnostic::error(err.to_string()).with_path(&key));
            return Err(err);
        }

        let resolve_map = match self.resolver.resolve(&key, &unpack_dir) {
            Ok(map) => map,
            Err(e) => {
                cleanup::remove_dir_best_effort(
                    &unpack_dir,
                    "unpack directory of failed resolution",
                    self.sink.as_ref(),
                );
                let err = CacheError::ArchiveResolutionFailed {
                    path: key.clone(),
                    reason: e.to_string(),
                };
                self.sink
                    .emit(Diagnostic::error(err.to_string()).with_path(&key));
                return Err(err);
            }
        };

        self.sink.emit(
            Diagnostic::debug(format!("unpacked archive to {}", unpack_dir.display()))
                .with_path(&key),
        );

        let shared = Arc::new(resolve_map);
        entries.insert(
            key,
            ArchiveEntry {
                resolve_map: Arc::clone(&shared),
                mtime,
                unpack_dir,
            },
        );
        Ok((shared, CacheStatus::Miss))
    }

    /// Evicts every entry, removing all unpack directories (best-effort).
    ///
    /// Symbol table handles already held by callers stay usable; only the
    /// on-disk unpack content goes away.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap();
        for (_, entry) in entries.drain() {
            cleanup::remove_dir_best_effort(
                &entry.unpack_dir,
                "unpack directory",
                self.sink.as_ref(),
            );
        }
    }

    /// Returns the number of cached archives.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Returns `true` if no archives are cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{ResolveMap, ResolverError};
    use gaia_diagnostics::MemorySink;
    use std::fs::File;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::{Duration, SystemTime};

    /// Resolver that records invocations and extracts a marker file.
    struct RecordingResolver {
        calls: AtomicUsize,
        fail_next: AtomicBool,
    }

    impl RecordingResolver {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_next: AtomicBool::new(false),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ArchiveResolver for RecordingResolver {
        fn resolve(
            &self,
            _archive: &Path,
            unpack_dir: &Path,
        ) -> Result<ResolveMap, ResolverError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(ResolverError::new("corrupt archive index"));
            }
            std::fs::write(unpack_dir.join("rules.txt"), b"rule data")?;
            Ok([("revision".to_string(), call.to_string())]
                .into_iter()
                .collect())
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        archive: PathBuf,
        unpack_root: PathBuf,
        resolver: Arc<RecordingResolver>,
        sink: Arc<MemorySink>,
        cache: ArchiveCache,
    }

    fn make_fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("building_rules.pkg");
        std::fs::write(&archive, b"packaged rules v1").unwrap();
        let unpack_root = dir.path().join("unpack");
        let resolver = Arc::new(RecordingResolver::new());
        let sink = Arc::new(MemorySink::new());
        let cache = ArchiveCache::new(
            unpack_root.clone(),
            Arc::clone(&resolver) as Arc<dyn ArchiveResolver>,
            Arc::clone(&sink) as Arc<dyn DiagnosticsSink>,
        );
        Fixture {
            _dir: dir,
            archive,
            unpack_root,
            resolver,
            sink,
            cache,
        }
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = File::options().append(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    fn unpack_dirs(root: &Path) -> Vec<PathBuf> {
        if !root.exists() {
            return Vec::new();
        }
        std::fs::read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    #[test]
    fn first_lookup_is_miss() {
        let fx = make_fixture();
        let (map, status) = fx.cache.get(&fx.archive).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(map.lookup("revision"), Some("1"));
        assert_eq!(fx.resolver.calls(), 1);
        assert_eq!(fx.cache.len(), 1);
    }

    #[test]
    fn unchanged_archive_is_hit_with_identical_handle() {
        let fx = make_fixture();
        let (first, _) = fx.cache.get(&fx.archive).unwrap();
        let (second, status) = fx.cache.get(&fx.archive).unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fx.resolver.calls(), 1);
    }

    #[test]
    fn mtime_change_rebuilds_and_removes_old_unpack_dir() {
        let fx = make_fixture();
        let (first, _) = fx.cache.get(&fx.archive).unwrap();
        let old_dirs = unpack_dirs(&fx.unpack_root);
        assert_eq!(old_dirs.len(), 1);
        assert!(old_dirs[0].join("rules.txt").exists());

        set_mtime(
            &fx.archive,
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000),
        );

        let (second, status) = fx.cache.get(&fx.archive).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.lookup("revision"), Some("2"));
        assert_eq!(fx.resolver.calls(), 2);

        // Old directory removed, exactly one fresh one in its place.
        assert!(!old_dirs[0].exists());
        assert_eq!(unpack_dirs(&fx.unpack_root).len(), 1);
    }

    #[test]
    fn backwards_mtime_change_also_invalidates() {
        let fx = make_fixture();
        fx.cache.get(&fx.archive).unwrap();
        set_mtime(
            &fx.archive,
            SystemTime::UNIX_EPOCH + Duration::from_secs(42),
        );
        let (_, status) = fx.cache.get(&fx.archive).unwrap();
        assert_eq!(status, CacheStatus::Miss);
    }

    #[test]
    fn evicted_entry_keeps_issued_handles_alive() {
        let fx = make_fixture();
        let (first, _) = fx.cache.get(&fx.archive).unwrap();
        set_mtime(
            &fx.archive,
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000),
        );
        fx.cache.get(&fx.archive).unwrap();

        // The evicted map is still fully usable through the old handle.
        assert_eq!(first.lookup("revision"), Some("1"));
    }

    #[test]
    fn missing_archive_is_invalid_and_not_cached() {
        let fx = make_fixture();
        let missing = fx.archive.with_file_name("not_there.pkg");
        let err = fx.cache.get(&missing).unwrap_err();
        assert!(matches!(err, CacheError::InvalidArchive { .. }));
        assert_eq!(fx.cache.len(), 0);
        assert_eq!(fx.resolver.calls(), 0);

        // Once the file exists the same path resolves in full.
        std::fs::write(&missing, b"now packaged").unwrap();
        let (_, status) = fx.cache.get(&missing).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(fx.resolver.calls(), 1);
    }

    #[test]
    fn directory_is_not_an_archive() {
        let fx = make_fixture();
        let dir_path = fx.archive.parent().unwrap().join("subdir");
        std::fs::create_dir(&dir_path).unwrap();
        let err = fx.cache.get(&dir_path).unwrap_err();
        assert!(matches!(err, CacheError::InvalidArchive { .. }));
    }

    #[test]
    fn resolution_failure_leaves_no_entry_and_no_residue() {
        let fx = make_fixture();
        fx.resolver.fail_next.store(true, Ordering::SeqCst);

        let err = fx.cache.get(&fx.archive).unwrap_err();
        assert!(matches!(err, CacheError::ArchiveResolutionFailed { .. }));
        assert_eq!(fx.cache.len(), 0);
        assert!(unpack_dirs(&fx.unpack_root).is_empty());
        assert!(fx.sink.has_errors());

        // No negative caching: the next lookup resolves successfully.
        let (_, status) = fx.cache.get(&fx.archive).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(fx.resolver.calls(), 2);
    }

    #[test]
    fn distinct_archives_get_distinct_entries() {
        let fx = make_fixture();
        let other = fx.archive.with_file_name("street_rules.pkg");
        std::fs::write(&other, b"other packaged rules").unwrap();

        fx.cache.get(&fx.archive).unwrap();
        fx.cache.get(&other).unwrap();
        assert_eq!(fx.cache.len(), 2);
        assert_eq!(unpack_dirs(&fx.unpack_root).len(), 2);
    }

    #[test]
    fn clear_removes_all_unpack_dirs() {
        let fx = make_fixture();
        fx.cache.get(&fx.archive).unwrap();
        assert_eq!(unpack_dirs(&fx.unpack_root).len(), 1);

        fx.cache.clear();
        assert!(fx.cache.is_empty());
        assert!(unpack_dirs(&fx.unpack_root).is_empty());
    }

    #[test]
    fn concurrent_lookups_resolve_once() {
        use std::thread;

        let fx = make_fixture();
        let cache = Arc::new(fx.cache);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let archive = fx.archive.clone();
            handles.push(thread::spawn(move || cache.get(&archive).unwrap().0));
        }
        let maps: Vec<SharedResolveMap> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(fx.resolver.calls(), 1);
        for map in &maps[1..] {
            assert!(Arc::ptr_eq(&maps[0], map));
        }
    }
}
