//! Chromium-based renderer using chromiumoxide.

use super::{RenderSession, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Environment variable naming an explicit browser executable.
pub const CHROMIUM_PATH_ENV: &str = "LIUREN_CHROMIUM_PATH";

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. LIUREN_CHROMIUM_PATH env
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 3. ~/.liuren/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = [
            home.join(".liuren/chromium/chrome-linux64/chrome"),
            home.join(".liuren/chromium/chrome"),
        ];
        if let Some(found) = candidates.into_iter().find(|c| c.exists()) {
            return Some(found);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches one headless Chromium per session.
pub struct ChromiumRenderer {
    chrome_path: Option<PathBuf>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a renderer for the given executable, or the discovered one.
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self {
            chrome_path: chrome_path.or_else(find_chromium),
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let chrome_path = self
            .chrome_path
            .clone()
            .with_context(|| format!("Chromium not found. Set {CHROMIUM_PATH_ENV}."))?;

        BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>> {
        let config = self.browser_config()?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                shutdown_browser(&mut browser).await;
                handler.abort();
                bail!("failed to create new page: {e}");
            }
        };

        self.active_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("chromium session opened");

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    fn active_sessions(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

async fn shutdown_browser(browser: &mut Browser) {
    if let Err(e) = browser.close().await {
        tracing::warn!("browser close failed: {e}");
    }
    if let Err(e) = browser.wait().await {
        tracing::warn!("waiting for browser exit failed: {e}");
    }
}

/// A page plus the browser process that owns it.
///
/// Dropping the session without calling `close` still aborts the handler
/// task; chromiumoxide kills the child process when `Browser` drops.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
        self.active_count.fetch_sub(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()> {
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        match result {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn has_element(&self, selector: &str) -> Result<bool> {
        let script = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        let result = self
            .page
            .evaluate(script)
            .await
            .context("selector probe failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert probe result: {e:?}"))
    }

    async fn get_html(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = self;
        if let Err(e) = this.page.clone().close().await {
            tracing::warn!("page close failed: {e}");
        }
        shutdown_browser(&mut this.browser).await;
        tracing::debug!("chromium session closed");
        Ok(())
    }
}
