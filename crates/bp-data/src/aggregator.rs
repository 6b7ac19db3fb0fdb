//! Category distributions and pressure statistics over a reading set.
//!
//! Everything here is recomputed from the readings on each call; nothing is
//! cached between calls.

use std::collections::{BTreeMap, BTreeSet};

use bp_core::models::{Category, Period, Reading};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

// ── DistributionTable ─────────────────────────────────────────────────────────

/// Category percentages for one group of readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRow<K> {
    /// The grouping key (a date or a period).
    pub key: K,
    /// Number of readings in the group.
    pub total: usize,
    /// Percentage of the group per category, 0–100.
    pub percentages: BTreeMap<Category, f64>,
}

impl<K> DistributionRow<K> {
    /// Percentage for `category`, `0.0` when it is not a column of the table.
    pub fn percentage(&self, category: Category) -> f64 {
        self.percentages.get(&category).copied().unwrap_or(0.0)
    }

    /// Sum of the row; 100 up to floating-point error.
    pub fn sum(&self) -> f64 {
        self.percentages.values().sum()
    }
}

/// Group-wise category percentages.
///
/// `categories` lists every category that occurs anywhere in the readings;
/// each row carries all of them, zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionTable<K> {
    pub categories: Vec<Category>,
    pub rows: Vec<DistributionRow<K>>,
}

impl<K: PartialEq> DistributionTable<K> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, key: &K) -> Option<&DistributionRow<K>> {
        self.rows.iter().find(|row| &row.key == key)
    }
}

/// Count of readings per category. Only categories that occur are present.
pub type CategoryCounts = BTreeMap<Category, usize>;

// ── PressureStats ─────────────────────────────────────────────────────────────

/// Mean / min / max of one pressure series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PressureRange {
    pub mean: f64,
    pub min: u16,
    pub max: u16,
}

impl PressureRange {
    fn from_values(values: impl Iterator<Item = u16>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0u64;
        let mut min = u16::MAX;
        let mut max = u16::MIN;
        for v in values {
            count += 1;
            sum += u64::from(v);
            min = min.min(v);
            max = max.max(v);
        }
        if count == 0 {
            return None;
        }
        Some(Self {
            mean: sum as f64 / count as f64,
            min,
            max,
        })
    }
}

/// Descriptive statistics over the whole reading set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PressureStats {
    pub count: usize,
    pub systolic: PressureRange,
    pub diastolic: PressureRange,
    pub first_timestamp: NaiveDateTime,
    pub last_timestamp: NaiveDateTime,
    /// Number of distinct dates with at least one reading.
    pub days: usize,
}

// ── ReadingAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that groups readings and tallies categories.
pub struct ReadingAggregator;

impl ReadingAggregator {
    /// Category percentages per calendar date, ascending by date.
    pub fn daily_distribution(readings: &[Reading]) -> DistributionTable<NaiveDate> {
        Self::distribution_by(readings, |r| r.date)
    }

    /// Category percentages per time-of-day period, in period order.
    pub fn period_distribution(readings: &[Reading]) -> DistributionTable<Period> {
        Self::distribution_by(readings, |r| r.period)
    }

    /// How many first-of-day readings fall into each category.
    pub fn first_of_day_distribution(readings: &[Reading]) -> CategoryCounts {
        Self::count_categories(readings.iter().filter(|r| r.is_first_of_day))
    }

    /// Category percentages over every reading. Empty when there are none.
    pub fn overall_distribution(readings: &[Reading]) -> BTreeMap<Category, f64> {
        let counts = Self::count_categories(readings.iter());
        to_percentages(&counts, readings.len(), counts.keys().copied())
    }

    /// Descriptive statistics, `None` for an empty set.
    pub fn statistics(readings: &[Reading]) -> Option<PressureStats> {
        let systolic = PressureRange::from_values(readings.iter().map(|r| r.systolic))?;
        let diastolic = PressureRange::from_values(readings.iter().map(|r| r.diastolic))?;
        let first_timestamp = readings.iter().map(|r| r.timestamp).min()?;
        let last_timestamp = readings.iter().map(|r| r.timestamp).max()?;
        let days = readings.iter().map(|r| r.date).collect::<BTreeSet<_>>().len();

        Some(PressureStats {
            count: readings.len(),
            systolic,
            diastolic,
            first_timestamp,
            last_timestamp,
            days,
        })
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Generic grouping driver. `key_fn` maps a reading to its group key.
    fn distribution_by<K: Ord + Clone>(
        readings: &[Reading],
        key_fn: impl Fn(&Reading) -> K,
    ) -> DistributionTable<K> {
        // BTreeMap keeps the groups sorted by key.
        let mut groups: BTreeMap<K, CategoryCounts> = BTreeMap::new();
        for reading in readings {
            *groups
                .entry(key_fn(reading))
                .or_default()
                .entry(reading.category)
                .or_insert(0) += 1;
        }

        let categories: Vec<Category> = groups
            .values()
            .flat_map(|counts| counts.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = groups
            .into_iter()
            .map(|(key, counts)| {
                let total: usize = counts.values().sum();
                DistributionRow {
                    key,
                    total,
                    percentages: to_percentages(&counts, total, categories.iter().copied()),
                }
            })
            .collect();

        DistributionTable { categories, rows }
    }

    fn count_categories<'a>(readings: impl Iterator<Item = &'a Reading>) -> CategoryCounts {
        let mut counts = CategoryCounts::new();
        for reading in readings {
            *counts.entry(reading.category).or_insert(0) += 1;
        }
        counts
    }
}

/// `count / total * 100` for each of `columns`, zero-filled.
fn to_percentages(
    counts: &CategoryCounts,
    total: usize,
    columns: impl Iterator<Item = Category>,
) -> BTreeMap<Category, f64> {
    if total == 0 {
        return BTreeMap::new();
    }
    columns
        .map(|c| {
            let count = counts.get(&c).copied().unwrap_or(0);
            (c, count as f64 / total as f64 * 100.0)
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
