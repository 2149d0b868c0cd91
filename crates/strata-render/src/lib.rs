//! Page resolution and rendering for strata.
//!
//! Given a content path this crate finds the page template, loads its
//! metadata record, resolves the chain of layouts wrapping it and renders the
//! composed document into any [`std::io::Write`] sink. Both the build driver
//! and the HTTP server call into the same [`PageRenderer`], so a page renders
//! identically in either mode.

pub mod chain;
pub mod content;
pub mod diagnostics;
pub mod helpers;
pub mod metadata;
pub mod renderer;

pub use chain::LayoutChain;
pub use content::{
    ContentPath, INDEX_FILE, LAYOUT_FILE, METADATA_EXTENSION, PRIVATE_PREFIX, TEMPLATE_EXTENSION,
};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
pub use helpers::Helpers;
pub use metadata::{load_metadata, Metadata, MetadataError, MetadataPolicy};
pub use renderer::{PageRenderer, RenderError, ENTRY_BLOCK};
