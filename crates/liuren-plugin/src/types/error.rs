//! Error types and response status codes for the plugin.

use liuren_board::BoardError;

/// Status codes carried in the response envelope.
pub mod status_codes {
    pub const OK: u16 = 200;
    pub const BAD_INPUT: u16 = 400;
    pub const FAILED: u16 = 500;
}

/// Failures while obtaining rendered markup from the browser.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timed out after {timeout_ms}ms waiting for `{selector}` to render")]
    Timeout { selector: String, timeout_ms: u64 },

    #[error("failed to read rendered page: {0}")]
    Content(String),
}

/// All errors that can occur while serving a divination request.
#[derive(thiserror::Error, Debug)]
pub enum PluginError {
    #[error("expected `<seed> <time>`, got {0} token(s)")]
    Usage(usize),

    #[error("{0}")]
    Format(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unexpected board markup: {error}")]
    Parse { error: String, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PluginError {
    pub fn code(&self) -> u16 {
        use status_codes::*;
        match self {
            PluginError::Usage(_) | PluginError::Format(_) | PluginError::Json(_) => BAD_INPUT,
            PluginError::Fetch(_) | PluginError::Parse { .. } | PluginError::Io(_) => FAILED,
        }
    }

    /// Whether the caller supplied bad input, as opposed to a downstream failure.
    pub fn is_input_error(&self) -> bool {
        self.code() == status_codes::BAD_INPUT
    }
}

impl From<BoardError> for PluginError {
    fn from(e: BoardError) -> Self {
        match e {
            BoardError::Format(_) => PluginError::Format(e.to_string()),
            BoardError::Parse { error, url } => PluginError::Parse { error, url },
            BoardError::InvalidSelector(_) => PluginError::Parse {
                error: e.to_string(),
                url: String::new(),
            },
        }
    }
}

pub type PluginResult<T> = Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PluginError::Usage(3).code(), 400);
        assert_eq!(PluginError::from(BoardError::format("x")).code(), 400);
        assert_eq!(
            PluginError::from(FetchError::Timeout {
                selector: ".grid".into(),
                timeout_ms: 10
            })
            .code(),
            500
        );
        let parse = PluginError::from(BoardError::Parse {
            error: "palace grid (.grid) not found".into(),
            url: "http://x".into(),
        });
        assert_eq!(parse.code(), 500);
        assert!(!parse.is_input_error());
        assert!(parse.to_string().contains(".grid"));
    }

    #[test]
    fn test_timeout_message_mentions_timeout() {
        let e = FetchError::Timeout {
            selector: ".grid".into(),
            timeout_ms: 250,
        };
        assert_eq!(
            e.to_string(),
            "timed out after 250ms waiting for `.grid` to render"
        );
    }
}
