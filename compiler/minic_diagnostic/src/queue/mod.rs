//! Diagnostic queue: the single sink every phase reports into.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication of identical same-line diagnostics
//! - Mirroring of every accepted diagnostic to `tracing`
//! - `ErrorGuaranteed` proof that errors were emitted

use tracing::{error, warn};

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed, Severity};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic identical to one already queued for the same line.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 10,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting diagnostics.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// let guar = queue.emit(Diagnostic::error(ErrorCode::E2007).at_line(3));
/// // ... later
/// for diag in queue.flush() { eprintln!("{diag}"); }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    /// Errors emitted, including ones dropped by the limit.
    error_count: usize,
    warning_count: usize,
    config: DiagnosticConfig,
}

impl Default for DiagnosticQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
            config,
        }
    }

    /// Add a diagnostic of any severity.
    ///
    /// Returns `true` if it was queued, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        match diag.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }

        if diag.is_error() && self.limit_exceeded() {
            return false;
        }
        if self.config.deduplicate && self.is_duplicate(&diag) {
            return false;
        }

        Self::trace(&diag);
        self.diagnostics.push(diag);
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// This is the only way to obtain an `ErrorGuaranteed` for a new error.
    pub fn emit(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit() called with a non-error");
        self.add(diag);
        ErrorGuaranteed::new()
    }

    /// Shorthand for `emit(Diagnostic::error(code).with_message(..).at_line(..))`.
    pub fn error(
        &mut self,
        code: ErrorCode,
        line: u32,
        message: impl Into<String>,
    ) -> ErrorGuaranteed {
        self.emit(Diagnostic::error(code).with_message(message).at_line(line))
    }

    /// Queue a warning.
    pub fn warning(&mut self, code: ErrorCode, line: u32, message: impl Into<String>) {
        self.add(Diagnostic::warning(code).with_message(message).at_line(line));
    }

    fn trace(diag: &Diagnostic) {
        let code = diag.code.as_str();
        let line = diag.line.unwrap_or(0);
        match diag.severity {
            Severity::Error => error!(code, line, "{}", diag.message),
            Severity::Warning => warn!(code, line, "{}", diag.message),
        }
    }

    fn limit_exceeded(&self) -> bool {
        self.config.error_limit > 0 && self.error_count > self.config.error_limit
    }

    fn is_duplicate(&self, diag: &Diagnostic) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.code == diag.code && d.line == diag.line && d.message == diag.message)
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Get the number of errors emitted.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Check if any errors were emitted and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Return the queued diagnostics ordered by line and clear the queue.
    ///
    /// Diagnostics without a line come first; emission order is kept within
    /// a line.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by_key(|d| d.line.unwrap_or(0));
        self.error_count = 0;
        self.warning_count = 0;
        result
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Codes of the queued diagnostics, in emission order.
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }
}
