//! Query construction for the remote board renderer.
//!
//! The renderer is a client-side application whose router lives in the URL
//! fragment, so the query string is appended after the fragment path rather
//! than placed before it. Parameter names and the lunar placeholder values
//! are wire constants.

use url::form_urlencoded;

use crate::types::TimeSpec;

/// Rendering page the board is requested from.
pub const DEFAULT_BASE_URL: &str = "http://demo1.w258.cn/2024/xlr/#/pages/pan/pana";

pub mod params {
    pub const SEED: &str = "ri";
    pub const DOUBLE_HOUR: &str = "shi";
    pub const SOLAR_DATE: &str = "ydate";
    pub const SOLAR_TIME: &str = "ytime";
    pub const LUNAR_YEAR: &str = "lyear";
    pub const LUNAR_MONTH: &str = "lmonth";
    pub const LUNAR_DAY: &str = "lday";
    pub const LUNAR_HOUR: &str = "lshi";
}

/// Stem-branch values sent in the lunar slots.
///
/// The renderer only needs these to be well-formed; they are held at the
/// values of one reference date until a real lunar conversion exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunarPlaceholders {
    pub year: &'static str,
    pub month: &'static str,
    pub day: &'static str,
    pub hour: &'static str,
}

impl LunarPlaceholders {
    pub const REFERENCE: LunarPlaceholders = LunarPlaceholders {
        year: "甲辰",
        month: "甲戌",
        day: "庚午",
        hour: "丁亥",
    };
}

/// Builds renderer URLs from a seed and a resolved time.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    lunar: LunarPlaceholders,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            lunar: LunarPlaceholders::REFERENCE,
        }
    }

    pub fn with_lunar(mut self, lunar: LunarPlaceholders) -> Self {
        self.lunar = lunar;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Compose the full renderer URL.
    pub fn build_url(&self, seed: &str, time: &TimeSpec) -> String {
        let shi = time.double_hour.to_string();
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(params::SEED, seed)
            .append_pair(params::DOUBLE_HOUR, &shi)
            .append_pair(params::SOLAR_DATE, &time.solar_date)
            .append_pair(params::SOLAR_TIME, &time.solar_time)
            .append_pair(params::LUNAR_YEAR, self.lunar.year)
            .append_pair(params::LUNAR_MONTH, self.lunar.month)
            .append_pair(params::LUNAR_DAY, self.lunar.day)
            .append_pair(params::LUNAR_HOUR, self.lunar.hour)
            .finish();

        format!("{}?{query}", self.base_url)
    }
}

/// Compose a renderer URL against [`DEFAULT_BASE_URL`].
pub fn build_url(seed: &str, time: &TimeSpec) -> String {
    RequestBuilder::default().build_url(seed, time)
}

/// Decode the query pairs of a URL produced by [`RequestBuilder`].
///
/// Everything after the first `?` is treated as the query, fragment
/// included, which matches how the renderer reads it.
pub fn query_pairs(url: &str) -> Vec<(String, String)> {
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
