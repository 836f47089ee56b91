//! Timestamp resolution and double-hour derivation.
//!
//! Two input shapes are accepted: a bare `HH:MM`, which is pinned to the
//! baseline date, and `YYYY-MM-DD-HH:MM`, which carries its own date.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::error::{BoardError, LiurenResult};
use crate::types::{DoubleHour, TimeSpec};

/// Solar date used when the input carries only a time of day.
pub const BASELINE_SOLAR_DATE: &str = "2024年11月2日";

const DATE_TIME_FORMAT: &str = "%Y-%m-%d-%H:%M";

/// Resolve a free-form timestamp into a [`TimeSpec`].
pub fn resolve(input: &str) -> LiurenResult<TimeSpec> {
    let input = input.trim();

    let (solar_date, hour, minute) = if input.contains('-') {
        let dt = NaiveDateTime::parse_from_str(input, DATE_TIME_FORMAT)
            .map_err(|_| BoardError::format(input))?;
        (
            format_solar_date(dt.year(), dt.month(), dt.day()),
            dt.hour(),
            dt.minute(),
        )
    } else {
        let (hour, minute) = parse_clock(input)?;
        (BASELINE_SOLAR_DATE.to_string(), hour, minute)
    };

    let double_hour =
        DoubleHour::from_hm(hour, minute).ok_or_else(|| BoardError::format(input))?;
    let spec = TimeSpec {
        solar_date,
        solar_time: format!("{hour:02}:{minute:02}"),
        double_hour,
    };
    tracing::debug!(
        input,
        date = %spec.solar_date,
        time = %spec.solar_time,
        shi = %spec.double_hour,
        "resolved timestamp"
    );
    Ok(spec)
}

/// Parse `HH:MM` with range checks. One- or two-digit fields are accepted.
fn parse_clock(input: &str) -> LiurenResult<(u32, u32)> {
    let (h, m) = input
        .split_once(':')
        .ok_or_else(|| BoardError::format(input))?;

    let field = |s: &str| -> Option<u32> {
        if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    };

    match (field(h), field(m)) {
        (Some(hour), Some(minute)) if hour < 24 && minute < 60 => Ok((hour, minute)),
        _ => Err(BoardError::format(input)),
    }
}

fn format_solar_date(year: i32, month: u32, day: u32) -> String {
    format!("{year}年{month}月{day}日")
}
