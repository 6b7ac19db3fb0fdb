use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Blood pressure category assigned to a single reading.
///
/// Variant order is the column order used by every distribution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Systolic below 120 and diastolic below 80.
    Normal,
    /// Systolic 120–140 or diastolic 80–90.
    Elevated,
    /// Systolic above 140 or diastolic above 90.
    Hypertensive,
    /// Matched none of the rules above.
    Unclassified,
}

impl Category {
    /// Every category, in table column order.
    pub const ALL: [Category; 4] = [
        Category::Normal,
        Category::Elevated,
        Category::Hypertensive,
        Category::Unclassified,
    ];

    /// The three categories summarised in reports.
    pub const RECOGNIZED: [Category; 3] =
        [Category::Normal, Category::Elevated, Category::Hypertensive];

    /// English display name.
    pub fn label(self) -> &'static str {
        match self {
            Category::Normal => "Normal",
            Category::Elevated => "Elevated",
            Category::Hypertensive => "Hypertensive",
            Category::Unclassified => "Unclassified",
        }
    }

    /// Label used by the source spreadsheets.
    pub fn native_label(self) -> &'static str {
        match self {
            Category::Normal => "正常",
            Category::Elevated => "偏高",
            Category::Hypertensive => "高血壓",
            Category::Unclassified => "未分類",
        }
    }

    pub fn display_name(self, labels: LabelSet) -> &'static str {
        match labels {
            LabelSet::English => self.label(),
            LabelSet::Native => self.native_label(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Time-of-day bucket derived from the hour of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Period {
    /// 05:00–11:59
    Morning,
    /// 12:00–16:59
    Afternoon,
    /// 17:00–21:59
    Evening,
    /// 22:00–04:59
    Night,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Morning,
        Period::Afternoon,
        Period::Evening,
        Period::Night,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Period::Morning => "Morning",
            Period::Afternoon => "Afternoon",
            Period::Evening => "Evening",
            Period::Night => "Night",
        }
    }

    pub fn native_label(self) -> &'static str {
        match self {
            Period::Morning => "早上",
            Period::Afternoon => "下午",
            Period::Evening => "晚上",
            Period::Night => "夜間",
        }
    }

    pub fn display_name(self, labels: LabelSet) -> &'static str {
        match labels {
            LabelSet::English => self.label(),
            LabelSet::Native => self.native_label(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which fixed label set to render categories and periods with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelSet {
    #[default]
    English,
    Native,
}

impl LabelSet {
    /// Parse the `--labels` CLI value. Anything other than `"zh"` is English.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("zh") {
            LabelSet::Native
        } else {
            LabelSet::English
        }
    }
}

/// What to do with a row whose timestamp cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    /// Fail the whole load with `MalformedTimestamp`.
    #[default]
    Abort,
    /// Drop only the offending row.
    Skip,
}

impl TimestampPolicy {
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("skip") {
            TimestampPolicy::Skip
        } else {
            TimestampPolicy::Abort
        }
    }
}

/// Column labels used to locate the three required fields in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub timestamp: String,
    pub systolic: String,
    pub diastolic: String,
}

impl ColumnMapping {
    pub const DEFAULT_TIMESTAMP: &'static str = "時間";
    pub const DEFAULT_SYSTOLIC: &'static str = "收縮壓";
    pub const DEFAULT_DIASTOLIC: &'static str = "舒張壓";
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            timestamp: Self::DEFAULT_TIMESTAMP.to_string(),
            systolic: Self::DEFAULT_SYSTOLIC.to_string(),
            diastolic: Self::DEFAULT_DIASTOLIC.to_string(),
        }
    }
}

/// One input row as loaded, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    /// Identifier of the file the row came from.
    pub source: String,
    /// 1-based data row number within `source` (header excluded).
    pub row: usize,
    /// Timestamp cell, either a string or a Unix-seconds number.
    pub timestamp: serde_json::Value,
    /// Systolic pressure in mmHg, `None` when the cell was blank.
    pub systolic: Option<u16>,
    /// Diastolic pressure in mmHg, `None` when the cell was blank.
    pub diastolic: Option<u16>,
}

/// A normalized, classified blood pressure reading.
///
/// Built once by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Wall-clock time of the measurement (time-zone naive).
    pub timestamp: NaiveDateTime,
    /// Systolic pressure in mmHg.
    pub systolic: u16,
    /// Diastolic pressure in mmHg.
    pub diastolic: u16,
    /// Calendar date component of `timestamp`.
    pub date: NaiveDate,
    /// Hour component of `timestamp`, 0–23.
    pub hour: u32,
    pub category: Category,
    pub period: Period,
    /// `true` for exactly one reading per date: the earliest, first in input
    /// order on ties.
    pub is_first_of_day: bool,
    /// Identifier of the file the reading came from.
    pub source: String,
    /// 1-based row number within `source`.
    pub row: usize,
}
