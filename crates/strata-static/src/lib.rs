//! Static build for strata sites.
//!
//! Walks a content tree and renders every page into a mirrored output tree.

pub mod builder;

pub use builder::{clean, BuildConfig, BuildError, BuildResult, StaticBuilder};
