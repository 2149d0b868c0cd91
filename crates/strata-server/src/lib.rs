//! HTTP server that renders strata pages on request.
//!
//! Requests naming an existing page are rendered live; everything else is
//! served as a static file from the same content root.

pub mod preload;
pub mod server;

pub use preload::{preload_kind, preload_links};
pub use server::{router, PageServer, ServeConfig, ServerError};
