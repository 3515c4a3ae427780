//! Stdio transport for MCP protocol

use crate::mcp::error::McpError;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::debug;

/// Writes newline-delimited JSON messages to an output stream
pub struct StdioTransport<W: AsyncWrite + Unpin = tokio::io::Stdout> {
    out: BufWriter<W>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self::with_writer(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> StdioTransport<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            out: BufWriter::new(writer),
        }
    }

    /// Send one JSON-RPC message (response, batch or notification)
    pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<(), McpError> {
        let json = serde_json::to_string(message)?;
        debug!("Sending: {}", json);

        self.out.write_all(json.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;

        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}
