//! Two-tier caching for a rule-driven generation engine.
//!
//! The expensive inputs and outputs of generation are cached here:
//!
//! - [`ArchiveCache`] parses a versioned rule-package archive into a shared
//!   read-only symbol table ([`ResolveMap`]) at most once per on-disk
//!   version, invalidating when the archive's modification time changes.
//! - [`AssetCache`] materializes generated byte buffers to unique
//!   filesystem paths exactly once per distinct content, replacing files
//!   whose content drifted between generation runs.
//!
//! Both caches are called synchronously from the engine's worker threads
//! and guard their entire read-modify-write sequences with one exclusive
//! lock each. A [`Session`] owns both caches plus the temporary directory
//! tree they write under, and removes that tree on drop.
//!
//! Archive parsing itself lives behind the [`ArchiveResolver`] trait;
//! diagnostics go to an injected
//! [`DiagnosticsSink`](gaia_diagnostics::DiagnosticsSink).

#![warn(missing_docs)]

pub mod archive;
pub mod asset;
mod cleanup;
pub mod error;
pub mod resolver;
pub mod session;

pub use archive::{ArchiveCache, CacheStatus};
pub use asset::AssetCache;
pub use error::CacheError;
pub use resolver::{ArchiveResolver, ResolveMap, ResolverError, SharedResolveMap};
pub use session::Session;
