//! Liuren plugin: renders Six Ren boards in a headless browser and answers
//! plugin invocations with a JSON response envelope.

pub mod config;
pub mod fetcher;
pub mod handler;
pub mod renderer;
pub mod repl;
pub mod transport;
pub mod types;

pub use config::PluginConfig;
pub use fetcher::{BoardFetcher, FetchOptions};
pub use handler::DivinationHandler;
pub use transport::StdioTransport;
