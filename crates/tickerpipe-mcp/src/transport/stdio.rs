use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::ServerError;
use crate::protocol::{RpcError, RpcResponse};
use crate::server::McpServer;

/// Serve newline-delimited JSON-RPC on stdin/stdout until stdin closes.
pub async fn serve_stdio(server: Arc<McpServer>) -> Result<(), ServerError> {
    tracing::info!("serving MCP over stdio");
    serve_lines(
        &server,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// One message per line in, one reply per line out. Blank lines are skipped
/// and notifications produce no output. A line that is not UTF-8 gets a parse
/// error reply; only I/O failures on the streams end the loop.
pub async fn serve_lines<R, W>(server: &McpServer, mut reader: R, mut writer: W) -> Result<(), ServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let reply = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => server.handle_message(line.trim_end()).await,
            Err(error) => {
                tracing::warn!(%error, "message is not valid UTF-8");
                Some(RpcResponse::failure(
                    Value::Null,
                    RpcError::parse_error(error.to_string()),
                ))
            }
        };

        if let Some(reply) = reply {
            let mut encoded = serde_json::to_string(&reply)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
