//! Parsing and validation of `gaia.toml` session configuration files.
//!
//! The configuration controls where a cache session places its temporary
//! directories and how chatty its diagnostics are. Every field has a
//! default, so a missing file is not an error.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::SessionConfig;
