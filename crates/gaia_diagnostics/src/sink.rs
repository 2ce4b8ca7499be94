//! Injectable sinks that receive diagnostics from the caches.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// The reporting boundary between the caches and the host application.
///
/// Implementations must be callable from any engine thread. The provided
/// helpers cover the common case of emitting a bare message at a fixed
/// severity; callers that want path context construct a [`Diagnostic`]
/// themselves and pass it to [`emit`](Self::emit).
pub trait DiagnosticsSink: Send + Sync {
    /// Emits a diagnostic into the sink.
    fn emit(&self, diag: Diagnostic);

    /// Emits a debug-level message.
    fn debug(&self, message: &str) {
        self.emit(Diagnostic::debug(message));
    }

    /// Emits an info-level message.
    fn info(&self, message: &str) {
        self.emit(Diagnostic::info(message));
    }

    /// Emits a warning-level message.
    fn warn(&self, message: &str) {
        self.emit(Diagnostic::warning(message));
    }

    /// Emits an error-level message.
    fn error(&self, message: &str) {
        self.emit(Diagnostic::error(message));
    }
}

/// A thread-safe accumulator that retains every emitted diagnostic.
///
/// Multiple threads can emit concurrently. The error count is tracked
/// atomically for fast `has_errors` checks without locking the vector.
/// Primarily used by tests to assert on cleanup warnings and resolution
/// errors.
pub struct MemorySink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
}

impl MemorySink {
    /// Creates a new empty sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Returns `true` if any error-severity diagnostics have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all accumulated diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let diagnostics = self.diagnostics.lock().unwrap();
        diagnostics.clone()
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.lock().unwrap();
        std::mem::take(&mut *diagnostics)
    }
}

impl DiagnosticsSink for MemorySink {
    fn emit(&self, diag: Diagnostic) {
        if diag.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        let mut diagnostics = self.diagnostics.lock().unwrap();
        diagnostics.push(diag);
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

/// A sink that writes diagnostics to stderr.
///
/// Messages below the configured minimum severity are dropped.
pub struct ConsoleSink {
    min_severity: Severity,
}

impl ConsoleSink {
    /// Creates a console sink that drops diagnostics below `min_severity`.
    pub fn new(min_severity: Severity) -> Self {
        Self { min_severity }
    }
}

impl DiagnosticsSink for ConsoleSink {
    fn emit(&self, diag: Diagnostic) {
        if diag.severity < self.min_severity {
            return;
        }
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        let result = match &diag.path {
            Some(path) => writeln!(
                handle,
                "[{}] {} ({})",
                diag.severity,
                diag.message,
                path.display()
            ),
            None => writeln!(handle, "[{}] {}", diag.severity, diag.message),
        };
        // Nothing sensible to do if stderr itself is gone.
        let _ = result;
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sink() {
        let sink = MemorySink::new();
        assert!(!sink.has_errors());
        assert_eq!(sink.error_count(), 0);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn emit_error_counts() {
        let sink = MemorySink::new();
        sink.error("resolution failed");
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn warning_is_not_error() {
        let sink = MemorySink::new();
        sink.warn("cleanup failed");
        assert!(!sink.has_errors());
        assert_eq!(sink.diagnostics().len(), 1);
        assert_eq!(sink.diagnostics()[0].severity, Severity::Warning);
    }

    #[test]
    fn helpers_set_severity() {
        let sink = MemorySink::new();
        sink.debug("d");
        sink.info("i");
        sink.warn("w");
        sink.error("e");
        let severities: Vec<Severity> = sink.diagnostics().iter().map(|d| d.severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Debug,
                Severity::Info,
                Severity::Warning,
                Severity::Error
            ]
        );
    }

    #[test]
    fn take_all_drains() {
        let sink = MemorySink::new();
        sink.info("first");
        sink.warn("second");
        assert_eq!(sink.take_all().len(), 2);
        assert!(sink.take_all().is_empty());
        // The error count is an atomic counter, not reset by take_all.
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let sink = Arc::new(MemorySink::new());
        let mut handles = Vec::new();

        for _ in 0..10 {
            let sink = Arc::clone(&sink);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    sink.error("concurrent failure");
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(sink.error_count(), 1000);
        assert_eq!(sink.diagnostics().len(), 1000);
    }

    #[test]
    fn console_sink_filters_below_minimum() {
        // Only checks the filter logic is exercised without panicking;
        // stderr content is not captured here.
        let sink = ConsoleSink::new(Severity::Error);
        sink.debug("dropped");
        sink.error("kept");
    }
}
