//! Conversion pipeline.
//!
//! Ties the parser, validator, MEC builder and XML checks together for the
//! CLI and the HTTP server.

pub mod pipeline;

pub use pipeline::*;
