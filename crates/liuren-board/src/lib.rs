//! Liuren Board, the core library for Six Ren (六壬) boards: double-hour
//! derivation, renderer request construction, and board extraction from
//! rendered markup.

pub mod error;
pub mod markup;
pub mod parser;
pub mod request;
pub mod time;
pub mod types;

pub use error::{BoardError, ErrorRecord, LiurenResult};
pub use markup::{try_extract, MarkupTree, ScraperTree};
pub use parser::{parse, parse_tree};
pub use request::{build_url, query_pairs, LunarPlaceholders, RequestBuilder, DEFAULT_BASE_URL};
pub use time::{resolve, BASELINE_SOLAR_DATE};
pub use types::*;
