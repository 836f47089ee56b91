//! Core data types for resolved times and parsed boards.

use serde::{Deserialize, Serialize};

/// Index of a traditional double hour (时辰), always in `1..=12`.
///
/// Window 1 wraps midnight (`[23:00, 01:00)`); every later window starts on
/// an odd hour and spans two hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoubleHour(u8);

impl DoubleHour {
    /// Derive the double hour for a wall-clock time.
    ///
    /// Returns `None` unless `hour < 24` and `minute < 60`.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        let index = if hour >= 23 || hour < 1 {
            1
        } else if hour >= 21 {
            12
        } else {
            (hour * 60 + minute - 60) / 120 + 2
        };
        u8::try_from(index).ok().map(Self)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for DoubleHour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time context resolved from user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpec {
    /// Solar date as `<year>年<month>月<day>日`.
    pub solar_date: String,
    /// Solar time as zero-padded `HH:MM`.
    pub solar_time: String,
    pub double_hour: DoubleHour,
}

/// The six palaces of the board, declared in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Palace {
    /// 大安
    GreatPeace,
    /// 留连
    Lingering,
    /// 速喜
    QuickJoy,
    /// 赤口
    RedMouth,
    /// 小吉
    SmallLuck,
    /// 空亡
    Void,
}

impl Palace {
    /// Canonical board order. Not alphabetical and not page order.
    pub const ORDER: [Palace; 6] = [
        Palace::GreatPeace,
        Palace::Lingering,
        Palace::QuickJoy,
        Palace::RedMouth,
        Palace::SmallLuck,
        Palace::Void,
    ];

    /// The label the rendering page prints for this palace.
    pub fn label(self) -> &'static str {
        match self {
            Palace::GreatPeace => "大安",
            Palace::Lingering => "留连",
            Palace::QuickJoy => "速喜",
            Palace::RedMouth => "赤口",
            Palace::SmallLuck => "小吉",
            Palace::Void => "空亡",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|p| p.label() == label)
    }

    /// Position of this palace within [`Palace::ORDER`].
    pub fn rank(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Palace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One palace cell read from the rendered board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalaceRecord {
    /// Position label exactly as rendered (trimmed).
    pub position: String,
    pub deity: String,
    pub relation: String,
    pub star: String,
    pub branch: String,
    /// Numeric label of the cell, `"0"` when the page shows none.
    pub seed_digit: String,
    /// Whether the cell is marked as the current double hour's palace.
    pub is_time_palace: bool,
}

impl PalaceRecord {
    /// The canonical palace for this record, if the label is recognised.
    pub fn palace(&self) -> Option<Palace> {
        Palace::from_label(&self.position)
    }

    /// Sort key: canonical index, or one past the last canonical index for
    /// unrecognised labels.
    pub fn rank(&self) -> usize {
        self.palace().map_or(Palace::ORDER.len(), Palace::rank)
    }
}

/// A fully extracted board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardResult {
    pub solar_banner: String,
    pub lunar_banner: String,
    pub seed_digit: String,
    /// Palace records in canonical order.
    pub palaces: Vec<PalaceRecord>,
    pub source_url: String,
}

impl BoardResult {
    /// First palace (in canonical order) marked as current.
    pub fn time_palace(&self) -> Option<&PalaceRecord> {
        self.palaces.iter().find(|p| p.is_time_palace)
    }
}
