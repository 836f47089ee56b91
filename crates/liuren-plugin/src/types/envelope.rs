//! Plugin request and response shapes.
//!
//! The response schema is English-keyed; field names are part of the
//! external contract.

use serde::{Deserialize, Serialize};

use liuren_board::{BoardResult, PalaceRecord};

use super::error::{status_codes, PluginError};

pub const SUCCESS_MESSAGE: &str = "占卜成功";

pub const USAGE_MESSAGE: &str = "输入格式错误，请使用以下格式之一：\n1. 数字 HH:MM（例如：1234 05:45）\n2. 数字 YYYY-MM-DD-HH:MM（例如：1234 2024-12-02-06:45）";

pub const FAILURE_PREFIX: &str = "占卜失败";

/// An invocation from the plugin host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEvent {
    /// Free text: `<seed> <time>`.
    pub content: String,
}

impl PluginEvent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Response envelope returned to the plugin host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: u16,
    pub data: Option<BoardData>,
    pub message: String,
}

impl Envelope {
    pub fn success(board: &BoardResult) -> Self {
        Self {
            code: status_codes::OK,
            data: Some(BoardData::from(board)),
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn from_error(error: &PluginError) -> Self {
        let message = if error.is_input_error() {
            USAGE_MESSAGE.to_string()
        } else {
            format!("{FAILURE_PREFIX}: {error}")
        };
        Self {
            code: error.code(),
            data: None,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == status_codes::OK
    }
}

/// Board payload of a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardData {
    pub yangli_time: String,
    pub nongli_time: String,
    pub divination_number: String,
    pub gong_info: Vec<GongInfo>,
    pub source_url: String,
}

impl From<&BoardResult> for BoardData {
    fn from(board: &BoardResult) -> Self {
        Self {
            yangli_time: board.solar_banner.clone(),
            nongli_time: board.lunar_banner.clone(),
            divination_number: board.seed_digit.clone(),
            gong_info: board.palaces.iter().map(GongInfo::from).collect(),
            source_url: board.source_url.clone(),
        }
    }
}

/// One palace in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GongInfo {
    pub position: String,
    pub god: String,
    pub relation: String,
    pub star: String,
    pub branch: String,
    pub number: String,
    pub is_time_palace: bool,
}

impl From<&PalaceRecord> for GongInfo {
    fn from(p: &PalaceRecord) -> Self {
        Self {
            position: p.position.clone(),
            god: p.deity.clone(),
            relation: p.relation.clone(),
            star: p.star.clone(),
            branch: p.branch.clone(),
            number: p.seed_digit.clone(),
            is_time_palace: p.is_time_palace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FetchError;
    use serde_json::json;

    fn board() -> BoardResult {
        BoardResult {
            solar_banner: "2024年11月2日 05:45".into(),
            lunar_banner: "甲辰年甲戌月庚午日".into(),
            seed_digit: "1234".into(),
            palaces: vec![PalaceRecord {
                position: "大安".into(),
                deity: "青龙".into(),
                relation: "兄弟".into(),
                star: "木星".into(),
                branch: "寅".into(),
                seed_digit: "3".into(),
                is_time_palace: true,
            }],
            source_url: "http://x/#/p?ri=1234&shi=4".into(),
        }
    }

    #[test]
    fn test_success_schema() {
        let value = serde_json::to_value(Envelope::success(&board())).unwrap();
        assert_eq!(
            value,
            json!({
                "code": 200,
                "data": {
                    "yangli_time": "2024年11月2日 05:45",
                    "nongli_time": "甲辰年甲戌月庚午日",
                    "divination_number": "1234",
                    "gong_info": [{
                        "position": "大安",
                        "god": "青龙",
                        "relation": "兄弟",
                        "star": "木星",
                        "branch": "寅",
                        "number": "3",
                        "is_time_palace": true
                    }],
                    "source_url": "http://x/#/p?ri=1234&shi=4"
                },
                "message": "占卜成功"
            })
        );
    }

    #[test]
    fn test_input_error_envelope() {
        let env = Envelope::from_error(&PluginError::Usage(1));
        assert_eq!(env.code, 400);
        assert!(env.data.is_none());
        assert_eq!(env.message, USAGE_MESSAGE);
        let value = serde_json::to_value(&env).unwrap();
        assert!(value["data"].is_null());
    }

    #[test]
    fn test_failure_envelope_embeds_error() {
        let env = Envelope::from_error(&PluginError::Fetch(FetchError::Navigation(
            "net::ERR_NAME_NOT_RESOLVED".into(),
        )));
        assert_eq!(env.code, 500);
        assert!(env.data.is_none());
        assert!(env.message.starts_with("占卜失败: "));
        assert!(env.message.contains("ERR_NAME_NOT_RESOLVED"));
    }

    #[test]
    fn test_event_deserializes() {
        let event: PluginEvent = serde_json::from_str(r#"{"content":"1234 05:45"}"#).unwrap();
        assert_eq!(event, PluginEvent::new("1234 05:45"));
    }
}
