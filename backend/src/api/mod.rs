//! HTTP API module.
//!
//! This module provides the HTTP server, its response types, and the log
//! broadcaster shared by the pipeline and the SSE endpoint.

pub mod server;
pub mod types;
pub mod logs;

pub use server::{router, start_server};
pub use types::*;
pub use logs::*;
