//! Renderer abstraction for browser-based page rendering.
//!
//! A [`Renderer`] hands out isolated [`RenderSession`]s. Each session owns
//! its own browser for its lifetime; sessions are never pooled or reused.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// A browser engine that can open rendering sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Launch a fresh, isolated session.
    async fn open_session(&self) -> Result<Box<dyn RenderSession>>;
    /// Number of sessions opened and not yet released.
    fn active_sessions(&self) -> usize;
}

/// A single live page inside its own browser.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()>;
    /// Whether the current document contains an element matching `selector`.
    async fn has_element(&self, selector: &str) -> Result<bool>;
    /// Get the full page HTML as currently rendered.
    async fn get_html(&self) -> Result<String>;
    /// Tear the session down, including the browser behind it.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Renderer used when no browser is available.
///
/// Every session request fails, so fetches surface a launch error instead of
/// hanging.
pub struct NoopRenderer {
    reason: String,
}

impl NoopRenderer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Renderer for NoopRenderer {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>> {
        Err(anyhow::anyhow!("browser not available: {}", self.reason))
    }

    fn active_sessions(&self) -> usize {
        0
    }
}
