//! End-to-end pipeline tests for liuren-plugin.
//!
//! A scripted in-memory renderer stands in for Chromium so the whole
//! resolve → build → fetch → parse → envelope path runs without a browser.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use liuren_board::request::{params, query_pairs};
use liuren_plugin::config::PluginConfig;
use liuren_plugin::fetcher::{BoardFetcher, FetchOptions};
use liuren_plugin::handler::DivinationHandler;
use liuren_plugin::renderer::{RenderSession, Renderer};
use liuren_plugin::transport::StdioTransport;
use liuren_plugin::types::{Envelope, PluginEvent, USAGE_MESSAGE};

// ─────────────────────── helpers ───────────────────────

const BOARD_HTML: &str = include_str!("fixtures/board.html");

#[derive(Clone, Copy)]
enum Script {
    /// Board appears after this many readiness probes.
    ReadyAfter(usize),
    /// Board never appears.
    NeverReady,
    /// Navigation itself fails.
    NavigationFails,
}

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    visited: Mutex<Vec<String>>,
}

struct ScriptedRenderer {
    script: Script,
    html: String,
    counters: Arc<Counters>,
}

impl ScriptedRenderer {
    fn new(script: Script, html: &str) -> Arc<Self> {
        Arc::new(Self {
            script,
            html: html.to_string(),
            counters: Arc::new(Counters::default()),
        })
    }

    fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    fn visited(&self) -> Vec<String> {
        self.counters.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            script: self.script,
            html: self.html.clone(),
            probes: AtomicUsize::new(0),
            counters: Arc::clone(&self.counters),
        }))
    }

    fn active_sessions(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst) - self.counters.closed.load(Ordering::SeqCst)
    }
}

struct ScriptedSession {
    script: Script,
    html: String,
    probes: AtomicUsize,
    counters: Arc<Counters>,
}

#[async_trait]
impl RenderSession for ScriptedSession {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<()> {
        if let Script::NavigationFails = self.script {
            bail!("net::ERR_CONNECTION_REFUSED");
        }
        self.counters.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn has_element(&self, _selector: &str) -> Result<bool> {
        let seen = self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(match self.script {
            Script::ReadyAfter(n) => seen >= n,
            Script::NeverReady | Script::NavigationFails => false,
        })
    }

    async fn get_html(&self) -> Result<String> {
        Ok(self.html.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn handler_for(renderer: Arc<ScriptedRenderer>, timeout_ms: u64) -> DivinationHandler {
    let config = PluginConfig::resolve(None, Some(timeout_ms), Some("/nonexistent/chrome"));
    let options = FetchOptions {
        poll_interval: Duration::from_millis(5),
        ..config.fetch_options()
    };
    DivinationHandler::new(
        config.request_builder(),
        BoardFetcher::new(renderer, options),
    )
}

fn lookup(url: &str, key: &str) -> Option<String> {
    query_pairs(url)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

// ─────────────────────── success path ───────────────────────

#[tokio::test]
async fn test_end_to_end_time_only() {
    let renderer = ScriptedRenderer::new(Script::ReadyAfter(2), BOARD_HTML);
    let handler = handler_for(renderer.clone(), 1_000);

    let envelope = handler.handle_event(&PluginEvent::new("1234 05:45")).await;

    assert_eq!(envelope.code, 200);
    assert_eq!(envelope.message, "占卜成功");
    let data = envelope.data.expect("data on success");
    assert_eq!(data.divination_number, "1234");
    assert_eq!(data.yangli_time, "2024年11月2日 05:45");
    assert_eq!(data.nongli_time, "甲辰年甲戌月庚午日丁亥时");
    assert_eq!(data.gong_info.len(), 6);

    let order: Vec<&str> = data.gong_info.iter().map(|g| g.position.as_str()).collect();
    assert_eq!(order, vec!["大安", "留连", "速喜", "赤口", "小吉", "空亡"]);

    let current: Vec<&str> = data
        .gong_info
        .iter()
        .filter(|g| g.is_time_palace)
        .map(|g| g.position.as_str())
        .collect();
    assert_eq!(current, vec!["赤口"]);

    // Missing markers fall back to defaults.
    assert_eq!(data.gong_info[4].god, "");
    assert_eq!(data.gong_info[5].number, "0");

    assert!(data.source_url.contains("ri=1234"));
    assert!(data.source_url.contains("shi=4"));
    assert_eq!(renderer.visited(), vec![data.source_url.clone()]);
    assert_eq!(renderer.opened(), 1);
    assert_eq!(renderer.active_sessions(), 0);
}

#[tokio::test]
async fn test_end_to_end_full_date() {
    let renderer = ScriptedRenderer::new(Script::ReadyAfter(0), BOARD_HTML);
    let handler = handler_for(renderer.clone(), 1_000);

    let envelope = handler
        .handle_event(&PluginEvent::new("  42 2024-12-02-21:30 "))
        .await;

    assert!(envelope.is_success());
    let url = envelope.data.unwrap().source_url;
    assert_eq!(lookup(&url, params::SEED).as_deref(), Some("42"));
    assert_eq!(lookup(&url, params::DOUBLE_HOUR).as_deref(), Some("12"));
    assert_eq!(lookup(&url, params::SOLAR_DATE).as_deref(), Some("2024年12月2日"));
    assert_eq!(lookup(&url, params::SOLAR_TIME).as_deref(), Some("21:30"));
    assert_eq!(renderer.active_sessions(), 0);
}

#[tokio::test]
async fn test_each_invocation_gets_its_own_session() {
    let renderer = ScriptedRenderer::new(Script::ReadyAfter(0), BOARD_HTML);
    let handler = handler_for(renderer.clone(), 1_000);

    for content in ["1 00:30", "2 12:00", "3 23:10"] {
        let envelope = handler.handle_event(&PluginEvent::new(content)).await;
        assert!(envelope.is_success(), "{content}: {}", envelope.message);
    }
    assert_eq!(renderer.opened(), 3);
    assert_eq!(renderer.active_sessions(), 0);
}

// ─────────────────────── input errors ───────────────────────

#[test]
fn test_bad_input_is_400_without_browser() {
    let renderer = ScriptedRenderer::new(Script::ReadyAfter(0), BOARD_HTML);
    let handler = handler_for(renderer.clone(), 1_000);

    for content in ["", "1234", "1234 05:45 extra", "1234 0545", "1234 25:00", "x 2024-02-30-10:00"] {
        let envelope: Envelope =
            tokio_test::block_on(handler.handle_event(&PluginEvent::new(content)));
        assert_eq!(envelope.code, 400, "{content:?}");
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message, USAGE_MESSAGE);
    }
    assert_eq!(renderer.opened(), 0);
}

// ─────────────────────── downstream failures ───────────────────────

#[tokio::test]
async fn test_render_timeout_is_500_and_releases_session() {
    let renderer = ScriptedRenderer::new(Script::NeverReady, BOARD_HTML);
    let handler = handler_for(renderer.clone(), 50);

    let envelope = handler.handle_event(&PluginEvent::new("1234 05:45")).await;

    assert_eq!(envelope.code, 500);
    assert!(envelope.data.is_none());
    assert!(envelope.message.starts_with("占卜失败: "));
    assert!(envelope.message.contains("timed out after 50ms"), "{}", envelope.message);
    assert_eq!(renderer.opened(), 1);
    assert_eq!(renderer.active_sessions(), 0);
}

#[tokio::test]
async fn test_navigation_failure_is_500_and_releases_session() {
    let renderer = ScriptedRenderer::new(Script::NavigationFails, BOARD_HTML);
    let handler = handler_for(renderer.clone(), 1_000);

    let envelope = handler.handle_event(&PluginEvent::new("1234 05:45")).await;

    assert_eq!(envelope.code, 500);
    assert!(envelope.message.contains("ERR_CONNECTION_REFUSED"));
    assert_eq!(renderer.active_sessions(), 0);
}

#[tokio::test]
async fn test_changed_markup_is_500() {
    let html = r#"<html><body><div class="grid"><p>maintenance</p></div></body></html>"#;
    let renderer = ScriptedRenderer::new(Script::ReadyAfter(0), html);
    let handler = handler_for(renderer.clone(), 1_000);

    let envelope = handler.handle_event(&PluginEvent::new("1234 05:45")).await;

    assert_eq!(envelope.code, 500);
    assert!(envelope.data.is_none());
    assert!(envelope.message.contains("unexpected board markup"), "{}", envelope.message);
    assert_eq!(renderer.active_sessions(), 0);
}

// ─────────────────────── stdio transport ───────────────────────

#[tokio::test]
async fn test_stdio_transport_answers_each_line() {
    let renderer = ScriptedRenderer::new(Script::ReadyAfter(0), BOARD_HTML);
    let transport = StdioTransport::new(handler_for(renderer.clone(), 1_000));

    let input = "{\"content\":\"1234 05:45\"}\n\nnot json\n{\"content\":\"1234\"}\n";
    let mut output: Vec<u8> = Vec::new();
    transport
        .run_with(input.as_bytes(), &mut output)
        .await
        .expect("transport loop");

    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["code"], 200);
    assert_eq!(lines[0]["data"]["gong_info"].as_array().unwrap().len(), 6);
    assert_eq!(lines[1]["code"], 400);
    assert!(lines[1]["data"].is_null());
    assert_eq!(lines[2]["code"], 400);
    assert_eq!(renderer.opened(), 1);
}
