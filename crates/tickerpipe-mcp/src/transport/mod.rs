//! Transports carrying JSON-RPC messages to an [`McpServer`](crate::McpServer).

pub mod http;
pub mod stdio;

pub use http::{router, serve_http};
pub use stdio::{serve_lines, serve_stdio};
