//! HTTP API module.
//!
//! This module provides the HTTP server, its wire types, and the log
//! broadcaster the pipeline reports progress through.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::start_server;
pub use types::*;
