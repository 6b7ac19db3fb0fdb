use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Parses measurement timestamps into naive wall-clock date-times.
///
/// Readings are analysed in the time zone they were recorded in, so offsets
/// are never converted: `"2024-01-15T08:00:00+08:00"` stays 08:00 on the 15th.
pub struct TimestampParser;

impl TimestampParser {
    const DATETIME_FORMATS: &'static [&'static str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];

    const DATE_FORMATS: &'static [&'static str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

    /// Attempt to parse a cell value.
    ///
    /// Handles:
    /// * `null`       → `None`
    /// * JSON string  → RFC 3339 or one of the common date-time patterns.
    /// * JSON number  → Unix timestamp (integer or float seconds).
    pub fn parse(value: &Value) -> Option<NaiveDateTime> {
        match value {
            Value::Null => None,
            Value::String(s) => Self::parse_str(s.trim()),
            Value::Number(n) => {
                if let Some(secs) = n.as_i64() {
                    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
                } else if let Some(f) = n.as_f64() {
                    let secs = f.trunc() as i64;
                    let nanos = (f.fract() * 1_000_000_000.0).round() as u32;
                    DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Parse a timestamp string. Returns `None` for empty or unrecognised
    /// input.
    pub fn parse_str(s: &str) -> Option<NaiveDateTime> {
        if s.is_empty() {
            return None;
        }

        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.naive_local());
        }

        for fmt in Self::DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }

        for fmt in Self::DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        debug!("TimestampParser: could not parse timestamp string \"{}\"", s);
        None
    }

    /// `true` for a null cell or one holding only whitespace.
    pub fn is_blank(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render a raw cell for error messages.
    pub fn describe(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}
