//! MCP method dispatch over the core pipeline.

use std::sync::Arc;

use serde_json::{json, Value};
use tickerpipe_core::{DownloadRequest, FetchPipeline};

use crate::protocol::{RpcError, RpcRequest, RpcResponse, JSONRPC_VERSION, PROTOCOL_VERSION};
use crate::tools::{tool_definitions, CallToolParams, CallToolResult, Tool};

pub const SERVER_NAME: &str = "tickerpipe";

/// Transport-independent MCP server.
pub struct McpServer {
    pipeline: Arc<FetchPipeline>,
}

impl McpServer {
    pub fn new(pipeline: Arc<FetchPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Arc<FetchPipeline> {
        &self.pipeline
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<RpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "unparseable message");
                return Some(RpcResponse::failure(
                    Value::Null,
                    RpcError::parse_error(error.to_string()),
                ));
            }
        };

        self.handle_value(value).await
    }

    pub async fn handle_value(&self, value: Value) -> Option<RpcResponse> {
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(error) => {
                return Some(RpcResponse::failure(
                    id,
                    RpcError::invalid_request(error.to_string()),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(RpcResponse::failure(
                id,
                RpcError::invalid_request(format!(
                    "unsupported jsonrpc version '{}'",
                    request.jsonrpc
                )),
            ));
        }

        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "notification received");
            return None;
        };

        let reply = match self.dispatch(request).await {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => RpcResponse::failure(id, error),
        };
        Some(reply)
    }

    async fn dispatch(&self, request: RpcRequest) -> Result<Value, RpcError> {
        tracing::debug!(method = %request.method, "dispatching request");
        match request.method.as_str() {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions() })),
            "tools/call" => {
                let result = self.call_tool(request.params).await?;
                serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))
            }
            other => Err(RpcError::method_not_found(other)),
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<CallToolResult, RpcError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| RpcError::invalid_params(format!("Invalid tools/call params: {e}")))?;

        let Some(tool) = Tool::from_name(&params.name) else {
            tracing::warn!(tool = %params.name, "unknown tool requested");
            return Ok(CallToolResult::text(
                format!("Unknown tool: {}", params.name),
                true,
            ));
        };

        tracing::info!(tool = tool.name(), "calling tool");
        match tool {
            Tool::DownloadStockData => {
                let arguments = match params.arguments {
                    None | Some(Value::Null) => json!({}),
                    Some(arguments) => arguments,
                };
                let request: DownloadRequest = serde_json::from_value(arguments).map_err(|e| {
                    RpcError::invalid_params(format!("Invalid arguments for {}: {e}", tool.name()))
                })?;

                let response = self.pipeline.download(request).await;
                let text = response
                    .to_pretty_json()
                    .map_err(|e| RpcError::internal(e.to_string()))?;
                Ok(CallToolResult::text(text, response.is_error()))
            }
            Tool::GetServerStatus => {
                let status = self.pipeline.server_status().await;
                let text = serde_json::to_string_pretty(&status)
                    .map_err(|e| RpcError::internal(e.to_string()))?;
                Ok(CallToolResult::text(text, false))
            }
        }
    }
}
