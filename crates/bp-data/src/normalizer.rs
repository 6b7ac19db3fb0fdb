//! Turns loaded rows into classified [`Reading`]s.

use std::collections::BTreeMap;

use bp_core::classify::{classify_bp, classify_period};
use bp_core::error::{AnalyzerError, Result};
use bp_core::models::{RawReading, Reading, TimestampPolicy};
use bp_core::time_utils::TimestampParser;
use chrono::{NaiveDate, Timelike};
use tracing::{debug, warn};

/// Output of a normalization pass, with the counts of rows left out.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    /// Enriched readings in input order.
    pub readings: Vec<Reading>,
    /// Rows dropped because systolic or diastolic was missing.
    pub dropped_missing_pressure: usize,
    /// Rows dropped under [`TimestampPolicy::Skip`].
    pub skipped_bad_timestamp: usize,
}

/// Parses, filters and classifies raw rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer {
    policy: TimestampPolicy,
}

impl RecordNormalizer {
    pub fn new(policy: TimestampPolicy) -> Self {
        Self { policy }
    }

    /// Normalize `raw` into readings. `raw` itself is left untouched.
    ///
    /// Timestamps are checked before pressures, so under
    /// [`TimestampPolicy::Abort`] an unparseable timestamp fails the load even
    /// on a row that would otherwise be dropped. A blank timestamp is not
    /// unparseable: a row with a blank timestamp and a missing pressure (the
    /// empty trailing rows of spreadsheet exports) is dropped like any other
    /// row with a missing pressure.
    pub fn normalize(&self, raw: &[RawReading]) -> Result<NormalizeOutcome> {
        let mut outcome = NormalizeOutcome {
            readings: Vec::with_capacity(raw.len()),
            ..Default::default()
        };

        for row in raw {
            let missing_pressure = row.systolic.is_none() || row.diastolic.is_none();
            if missing_pressure && TimestampParser::is_blank(&row.timestamp) {
                debug!("Dropping {} row {}: blank row", row.source, row.row);
                outcome.dropped_missing_pressure += 1;
                continue;
            }

            let Some(timestamp) = TimestampParser::parse(&row.timestamp) else {
                let value = TimestampParser::describe(&row.timestamp);
                match self.policy {
                    TimestampPolicy::Abort => {
                        return Err(AnalyzerError::MalformedTimestamp {
                            source_id: row.source.clone(),
                            row: row.row,
                            value,
                        });
                    }
                    TimestampPolicy::Skip => {
                        warn!(
                            "Skipping {} row {}: unparseable timestamp {:?}",
                            row.source, row.row, value
                        );
                        outcome.skipped_bad_timestamp += 1;
                        continue;
                    }
                }
            };

            let (Some(systolic), Some(diastolic)) = (row.systolic, row.diastolic) else {
                debug!("Dropping {} row {}: missing pressure", row.source, row.row);
                outcome.dropped_missing_pressure += 1;
                continue;
            };

            let hour = timestamp.hour();
            outcome.readings.push(Reading {
                timestamp,
                systolic,
                diastolic,
                date: timestamp.date(),
                hour,
                category: classify_bp(systolic, diastolic),
                period: classify_period(hour),
                is_first_of_day: false,
                source: row.source.clone(),
                row: row.row,
            });
        }

        for index in first_of_day_indices(&outcome.readings).into_values() {
            outcome.readings[index].is_first_of_day = true;
        }

        debug!(
            "Normalized {} readings ({} dropped, {} skipped)",
            outcome.readings.len(),
            outcome.dropped_missing_pressure,
            outcome.skipped_bad_timestamp
        );

        Ok(outcome)
    }
}

/// Index of the earliest reading for each date.
///
/// On equal timestamps the reading that appears first in `readings` wins, so
/// every date maps to exactly one index.
pub fn first_of_day_indices(readings: &[Reading]) -> BTreeMap<NaiveDate, usize> {
    let mut first: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (i, reading) in readings.iter().enumerate() {
        first
            .entry(reading.date)
            .and_modify(|current| {
                if reading.timestamp < readings[*current].timestamp {
                    *current = i;
                }
            })
            .or_insert(i);
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::models::{Category, Period};
    use serde_json::{json, Value};

    fn raw(row: usize, ts: Value, sys: Option<u16>, dia: Option<u16>) -> RawReading {
        RawReading {
            source: "bp.csv".to_string(),
            row,
            timestamp: ts,
            systolic: sys,
            diastolic: dia,
        }
    }

    #[test]
    fn test_normalize_derives_fields() {
        let rows = vec![raw(1, json!("2024-01-15 08:30"), Some(110), Some(70))];
        let outcome = RecordNormalizer::default().normalize(&rows).unwrap();

        let r = &outcome.readings[0];
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(r.hour, 8);
        assert_eq!(r.category, Category::Normal);
        assert_eq!(r.period, Period::Morning);
        assert!(r.is_first_of_day);
        assert_eq!(r.row, 1);
    }

    #[test]
    fn test_normalize_drops_missing_pressure_silently() {
        let rows = vec![
            raw(1, json!("2024-01-15 08:00"), None, Some(80)),
            raw(2, json!("2024-01-15 09:00"), Some(120), None),
            raw(3, json!("2024-01-15 10:00"), Some(118), Some(76)),
        ];
        let outcome = RecordNormalizer::default().normalize(&rows).unwrap();

        assert_eq!(outcome.readings.len(), 1);
        assert_eq!(outcome.readings[0].row, 3);
        assert_eq!(outcome.dropped_missing_pressure, 2);
        // The only surviving reading becomes first of the day.
        assert!(outcome.readings[0].is_first_of_day);
    }

    #[test]
    fn test_normalize_abort_on_malformed_timestamp() {
        let rows = vec![
            raw(1, json!("2024-01-15 08:00"), Some(110), Some(70)),
            raw(2, json!("someday"), Some(120), Some(80)),
        ];
        let err = RecordNormalizer::new(TimestampPolicy::Abort)
            .normalize(&rows)
            .unwrap_err();

        match err {
            AnalyzerError::MalformedTimestamp {
                source_id,
                row,
                value,
            } => {
                assert_eq!(source_id, "bp.csv");
                assert_eq!(row, 2);
                assert_eq!(value, "someday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_normalize_abort_checks_timestamp_before_pressure() {
        let rows = vec![raw(1, json!("someday"), None, None)];
        let result = RecordNormalizer::new(TimestampPolicy::Abort).normalize(&rows);
        assert!(matches!(
            result,
            Err(AnalyzerError::MalformedTimestamp { row: 1, .. })
        ));
    }

    #[test]
    fn test_normalize_blank_row_dropped_under_abort() {
        let rows = vec![
            raw(1, json!("2024-01-15 08:00"), Some(110), Some(70)),
            raw(2, json!(""), None, None),
            raw(3, json!(null), Some(120), None),
        ];
        let outcome = RecordNormalizer::new(TimestampPolicy::Abort)
            .normalize(&rows)
            .unwrap();

        assert_eq!(outcome.readings.len(), 1);
        assert_eq!(outcome.dropped_missing_pressure, 2);
        assert_eq!(outcome.skipped_bad_timestamp, 0);
    }

    #[test]
    fn test_normalize_blank_timestamp_with_pressures_still_aborts() {
        let rows = vec![raw(4, json!("  "), Some(120), Some(80))];
        let result = RecordNormalizer::new(TimestampPolicy::Abort).normalize(&rows);
        assert!(matches!(
            result,
            Err(AnalyzerError::MalformedTimestamp { row: 4, .. })
        ));
    }

    #[test]
    fn test_normalize_skip_policy_drops_row() {
        let rows = vec![
            raw(1, json!("garbage"), Some(120), Some(80)),
            raw(2, json!("2024-01-15 08:00"), Some(110), Some(70)),
        ];
        let outcome = RecordNormalizer::new(TimestampPolicy::Skip)
            .normalize(&rows)
            .unwrap();

        assert_eq!(outcome.readings.len(), 1);
        assert_eq!(outcome.skipped_bad_timestamp, 1);
    }

    #[test]
    fn test_normalize_does_not_mutate_input() {
        let rows = vec![raw(1, json!("2024-01-15 08:00"), Some(110), Some(70))];
        let before = rows.clone();
        RecordNormalizer::default().normalize(&rows).unwrap();
        assert_eq!(rows, before);
    }

    #[test]
    fn test_normalize_preserves_input_order() {
        let rows = vec![
            raw(1, json!("2024-01-15 20:00"), Some(110), Some(70)),
            raw(2, json!("2024-01-15 07:00"), Some(130), Some(85)),
        ];
        let outcome = RecordNormalizer::default().normalize(&rows).unwrap();
        let order: Vec<usize> = outcome.readings.iter().map(|r| r.row).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_first_of_day_earliest_per_date() {
        let rows = vec![
            raw(1, json!("2024-01-15 20:00"), Some(110), Some(70)),
            raw(2, json!("2024-01-15 07:00"), Some(130), Some(85)),
            raw(3, json!("2024-01-16 09:00"), Some(150), Some(95)),
            raw(4, json!("2024-01-16 06:30"), Some(118), Some(78)),
        ];
        let outcome = RecordNormalizer::default().normalize(&rows).unwrap();
        let flags: Vec<bool> = outcome.readings.iter().map(|r| r.is_first_of_day).collect();
        assert_eq!(flags, vec![false, true, false, true]);
    }

    #[test]
    fn test_first_of_day_tie_goes_to_input_order() {
        let rows = vec![
            raw(1, json!("2024-01-15 07:00"), Some(150), Some(95)),
            raw(2, json!("2024-01-15 07:00"), Some(110), Some(70)),
        ];
        let outcome = RecordNormalizer::default().normalize(&rows).unwrap();
        let firsts: Vec<usize> = outcome
            .readings
            .iter()
            .filter(|r| r.is_first_of_day)
            .map(|r| r.row)
            .collect();
        assert_eq!(firsts, vec![1]);
    }

    #[test]
    fn test_first_of_day_indices_empty() {
        assert!(first_of_day_indices(&[]).is_empty());
    }

    #[test]
    fn test_normalize_empty_input() {
        let outcome = RecordNormalizer::default().normalize(&[]).unwrap();
        assert!(outcome.readings.is_empty());
        assert_eq!(outcome.dropped_missing_pressure, 0);
    }
}
