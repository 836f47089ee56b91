//! Error types for time resolution and board extraction.

use serde::{Deserialize, Serialize};

/// Message attached to every rejected timestamp.
pub const TIME_FORMAT_HINT: &str = "时间格式错误，请使用 HH:MM 或 YYYY-MM-DD-HH:MM 格式";

/// Serializable record describing a failed extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
    pub url: String,
}

/// All errors produced by the core library.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Timestamp did not match `HH:MM` or `YYYY-MM-DD-HH:MM`.
    #[error("{hint}: {0}", hint = TIME_FORMAT_HINT)]
    Format(String),

    /// A selector literal could not be compiled.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// Rendered markup did not have the expected board structure.
    #[error("{error}")]
    Parse { error: String, url: String },
}

impl BoardError {
    pub fn format(input: &str) -> Self {
        BoardError::Format(input.to_string())
    }

    /// Error record shape `{error, url}` for parse failures.
    pub fn to_record(&self) -> Option<ErrorRecord> {
        match self {
            BoardError::Parse { error, url } => Some(ErrorRecord {
                error: error.clone(),
                url: url.clone(),
            }),
            _ => None,
        }
    }
}

pub type LiurenResult<T> = Result<T, BoardError>;
