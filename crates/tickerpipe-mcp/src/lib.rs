//! # Tickerpipe MCP
//!
//! Model Context Protocol adapter for [`tickerpipe_core`]. Exposes the
//! `download_stock_data` and `get_server_status` tools over JSON-RPC 2.0,
//! carried by stdio or HTTP.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cli`] | Command-line and environment configuration |
//! | [`error`] | Server errors and exit codes |
//! | [`protocol`] | JSON-RPC message types |
//! | [`server`] | Method dispatch |
//! | [`tools`] | Tool catalog and call results |
//! | [`transport`] | stdio and HTTP transports |

pub mod cli;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use error::ServerError;
pub use protocol::{RpcError, RpcRequest, RpcResponse};
pub use server::McpServer;
pub use tools::{CallToolResult, Tool};
