//! Unique, filesystem-safe tokens for naming cache directories and files.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// A globally unique token backed by 128 bits of OS randomness.
///
/// Tokens name unpack directories and materialized asset files, so paths
/// never collide across sessions or archives that share basenames. The
/// rendered form is 32 lowercase hex characters with no separators, safe
/// on every filesystem.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Token([u8; 16]);

impl Token {
    /// Generates a fresh token from the operating system RNG.
    ///
    /// Fails only if the OS entropy source does. Callers must treat a
    /// failure as fatal to the operation that needed the token and leave
    /// no partial state behind.
    pub fn generate() -> Result<Self, TokenError> {
        let mut bytes = [0u8; 16];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// The operating system RNG could not produce token bytes.
#[derive(Debug, thiserror::Error)]
#[error("failed to generate a unique token: {source}")]
pub struct TokenError {
    /// The underlying RNG error.
    #[from]
    source: rand::Error,
}
