//! Diagnostic severity levels ordered from least to most severe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic message.
///
/// Ordered from least severe (`Debug`) to most severe (`Error`), matching
/// the derived `PartialOrd`/`Ord` implementation based on declaration
/// order. Sinks may filter below a minimum level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Tracing detail, such as observed archive timestamps.
    Debug,
    /// Routine lifecycle events, such as a removed unpack directory.
    Info,
    /// A non-fatal problem, such as a failed cleanup of a stale file.
    Warning,
    /// A fatal problem for the current operation, such as a failed
    /// archive resolution.
    Error,
}

impl Severity {
    /// Returns `true` if this severity is [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}
