//! Configuration loading and resolution.
//!
//! Every setting resolves as explicit value > environment variable > default.

use std::path::PathBuf;
use std::sync::Arc;

use liuren_board::{RequestBuilder, DEFAULT_BASE_URL};

use crate::fetcher::{BoardFetcher, FetchOptions, DEFAULT_RENDER_TIMEOUT_MS};
use crate::handler::DivinationHandler;
use crate::renderer::chromium::{find_chromium, ChromiumRenderer};
use crate::renderer::Renderer;

pub const BASE_URL_ENV: &str = "LIUREN_BASE_URL";
pub const RENDER_TIMEOUT_ENV: &str = "LIUREN_RENDER_TIMEOUT_MS";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    pub base_url: String,
    pub render_timeout_ms: u64,
    pub chromium_path: Option<PathBuf>,
}

impl PluginConfig {
    pub fn resolve(
        base_url: Option<&str>,
        render_timeout_ms: Option<u64>,
        chromium_path: Option<&str>,
    ) -> Self {
        Self {
            base_url: resolve_base_url(base_url),
            render_timeout_ms: resolve_render_timeout_ms(render_timeout_ms),
            chromium_path: chromium_path.map(PathBuf::from).or_else(find_chromium),
        }
    }

    pub fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(self.base_url.clone())
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions::default().with_timeout_ms(self.render_timeout_ms)
    }

    /// Build a handler backed by headless Chromium.
    pub fn chromium_handler(&self) -> DivinationHandler {
        let renderer = ChromiumRenderer::new(self.chromium_path.clone());
        self.handler_with(Arc::new(renderer))
    }

    /// Build a handler backed by an arbitrary renderer.
    pub fn handler_with(&self, renderer: Arc<dyn Renderer>) -> DivinationHandler {
        DivinationHandler::new(
            self.request_builder(),
            BoardFetcher::new(renderer, self.fetch_options()),
        )
    }
}

/// Resolve the renderer base URL.
pub fn resolve_base_url(explicit: Option<&str>) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }

    if let Ok(env_url) = std::env::var(BASE_URL_ENV) {
        if !env_url.trim().is_empty() {
            return env_url.trim().to_string();
        }
    }

    DEFAULT_BASE_URL.to_string()
}

/// Resolve the bounded render wait in milliseconds.
pub fn resolve_render_timeout_ms(explicit: Option<u64>) -> u64 {
    if let Some(ms) = explicit {
        return ms;
    }

    match std::env::var(RENDER_TIMEOUT_ENV) {
        Ok(raw) => parse_timeout(&raw).unwrap_or_else(|| {
            tracing::warn!("ignoring invalid {RENDER_TIMEOUT_ENV}={raw:?}");
            DEFAULT_RENDER_TIMEOUT_MS
        }),
        Err(_) => DEFAULT_RENDER_TIMEOUT_MS,
    }
}

fn parse_timeout(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|ms| *ms > 0)
}
