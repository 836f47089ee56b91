//! Fetches rendered board markup through a [`Renderer`].
//!
//! The board page renders client-side, so the initial document does not
//! contain the grid. After navigation the fetcher polls for the grid
//! container until it appears or the render timeout elapses.

use std::sync::Arc;
use std::time::Duration;

use liuren_board::parser::selectors;

use crate::renderer::{RenderSession, Renderer};
use crate::types::FetchError;

pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Timing and readiness settings for a fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Selector whose presence marks the board as rendered.
    pub ready_selector: String,
    /// Upper bound for navigation and, separately, for the render wait.
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            ready_selector: selectors::GRID.to_string(),
            timeout: Duration::from_millis(DEFAULT_RENDER_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl FetchOptions {
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Duration::from_millis(timeout_ms);
        self
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Turns a board URL into rendered HTML, one browser session per call.
#[derive(Clone)]
pub struct BoardFetcher {
    renderer: Arc<dyn Renderer>,
    options: FetchOptions,
}

impl BoardFetcher {
    pub fn new(renderer: Arc<dyn Renderer>, options: FetchOptions) -> Self {
        Self { renderer, options }
    }

    /// Render `url` and return the page markup once the board is present.
    ///
    /// The session is closed before returning on every path.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut session = self
            .renderer
            .open_session()
            .await
            .map_err(|e| FetchError::Launch(format!("{e:#}")))?;

        let result = self.render(session.as_mut(), url).await;

        if let Err(e) = session.close().await {
            tracing::warn!("render session close failed: {e:#}");
        }

        match &result {
            Ok(html) => tracing::debug!(%url, bytes = html.len(), "fetched rendered board"),
            Err(e) => tracing::warn!(%url, "fetch failed: {e}"),
        }
        result
    }

    async fn render(&self, session: &mut dyn RenderSession, url: &str) -> Result<String, FetchError> {
        session
            .navigate(url, self.options.timeout_ms())
            .await
            .map_err(|e| FetchError::Navigation(format!("{e:#}")))?;

        self.wait_until_ready(session).await?;

        session
            .get_html()
            .await
            .map_err(|e| FetchError::Content(format!("{e:#}")))
    }

    async fn wait_until_ready(&self, session: &mut dyn RenderSession) -> Result<(), FetchError> {
        let selector = self.options.ready_selector.as_str();
        let poll = async {
            loop {
                match session.has_element(selector).await {
                    Ok(true) => return,
                    Ok(false) => {}
                    Err(e) => tracing::debug!("readiness probe failed: {e:#}"),
                }
                tokio::time::sleep(self.options.poll_interval).await;
            }
        };

        tokio::time::timeout(self.options.timeout, poll)
            .await
            .map_err(|_| FetchError::Timeout {
                selector: selector.to_string(),
                timeout_ms: self.options.timeout_ms(),
            })
    }
}
