//! Markdown to HTML transform used by strata's template helpers.
//!
//! The transform is CommonMark (via pulldown-cmark) with tables and
//! strikethrough enabled. Top-level blocks are separated by a blank line so
//! the output reads naturally when dropped into a template.

pub mod render;

pub use render::{markdown_options, to_html, BlockSpacing};
