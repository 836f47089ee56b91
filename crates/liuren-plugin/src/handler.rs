//! Plugin entry point: free-text input in, response envelope out.

use liuren_board::{parse, resolve, BoardResult, RequestBuilder};

use crate::fetcher::BoardFetcher;
use crate::types::{Envelope, PluginError, PluginEvent, PluginResult};

/// Runs the resolve → build → fetch → parse pipeline for one invocation.
#[derive(Clone)]
pub struct DivinationHandler {
    requests: RequestBuilder,
    fetcher: BoardFetcher,
}

impl DivinationHandler {
    pub fn new(requests: RequestBuilder, fetcher: BoardFetcher) -> Self {
        Self { requests, fetcher }
    }

    /// Handle one host event. Never fails; errors become envelopes.
    pub async fn handle_event(&self, event: &PluginEvent) -> Envelope {
        match self.handle_content(&event.content).await {
            Ok(board) => Envelope::success(&board),
            Err(e) => {
                if e.is_input_error() {
                    tracing::info!("rejected input {:?}: {e}", event.content);
                } else {
                    tracing::warn!("divination failed: {e}");
                }
                Envelope::from_error(&e)
            }
        }
    }

    /// Split `<seed> <time>` and divine.
    pub async fn handle_content(&self, content: &str) -> PluginResult<BoardResult> {
        let (seed, time) = split_input(content)?;
        self.divine(seed, time).await
    }

    pub async fn divine(&self, seed: &str, time: &str) -> PluginResult<BoardResult> {
        let url = self.board_url(seed, time)?;
        let html = self.fetcher.fetch(&url).await?;
        Ok(parse(&html, &url)?)
    }

    /// The renderer URL for an input, without fetching it.
    pub fn board_url(&self, seed: &str, time: &str) -> PluginResult<String> {
        let spec = resolve(time)?;
        let url = self.requests.build_url(seed, &spec);
        tracing::debug!(%url, "built board url");
        Ok(url)
    }
}

/// Split host input into exactly two whitespace-separated tokens.
pub fn split_input(content: &str) -> Result<(&str, &str), PluginError> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    match tokens.as_slice() {
        [seed, time] => Ok((*seed, *time)),
        _ => Err(PluginError::Usage(tokens.len())),
    }
}
