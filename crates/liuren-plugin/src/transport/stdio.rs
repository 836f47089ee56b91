//! Stdio transport: reads plugin events from stdin, writes envelopes to stdout.
//!
//! One JSON event per input line, one JSON envelope per output line.
//! Invocations run strictly one after another.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::handler::DivinationHandler;
use crate::types::{Envelope, PluginResult};

use super::framing;

pub struct StdioTransport {
    handler: DivinationHandler,
}

impl StdioTransport {
    pub fn new(handler: DivinationHandler) -> Self {
        Self { handler }
    }

    /// Run the transport loop over the process's stdin and stdout.
    pub async fn run(&self) -> PluginResult<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.run_with(reader, writer).await
    }

    /// Run the transport loop over arbitrary streams until EOF.
    pub async fn run_with<R, W>(&self, mut reader: R, mut writer: W) -> PluginResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let envelope = match framing::parse_event(trimmed) {
                Ok(event) => self.handler.handle_event(&event).await,
                Err(e) => {
                    tracing::warn!("Parse error: {e}");
                    Envelope::from_error(&e)
                }
            };

            let framed = framing::frame_envelope(&envelope)?;
            writer.write_all(framed.as_bytes()).await?;
            writer.flush().await?;
        }

        Ok(())
    }
}
