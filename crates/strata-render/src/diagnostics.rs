//! Diagnostics raised while rendering.
//!
//! Helpers and loaders never print. They report through a [`DiagnosticSink`]
//! handed to each render, and the caller decides where the reports go.

use std::sync::Mutex;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A `markdown_file` helper could not read its file
    MarkdownFileUnreadable,

    /// A metadata record was unreadable and replaced by an empty one
    MetadataIgnored,
}

/// A non-fatal problem found while rendering one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Content path of the page being rendered
    pub content_path: String,

    /// Category
    pub kind: DiagnosticKind,

    /// Human readable detail
    pub message: String,
}

/// Destination for diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Record a diagnostic.
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`, tagged with the driver mode.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    mode: &'static str,
}

impl TracingSink {
    /// Create a sink for the given mode name ("build", "serve").
    pub fn new(mode: &'static str) -> Self {
        Self { mode }
    }
}

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(
            mode = self.mode,
            kind = ?diagnostic.kind,
            "{}: {}",
            diagnostic.content_path,
            diagnostic.message
        );
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        let mut guard = self
            .diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *guard)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}
