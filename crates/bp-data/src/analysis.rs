//! Main analysis pipeline.
//!
//! Loads raw rows, normalizes them into [`Reading`]s and exposes the
//! aggregation queries used by the terminal UI, the JSON printer and the PDF
//! writer. Every query recomputes from the reading set.

use std::collections::BTreeMap;
use std::path::Path;

use bp_core::error::Result;
use bp_core::models::{Category, ColumnMapping, Period, RawReading, Reading, TimestampPolicy};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use crate::aggregator::{CategoryCounts, DistributionTable, PressureStats, ReadingAggregator};
use crate::normalizer::RecordNormalizer;
use crate::reader::load_raw_readings;

// ── Public types ──────────────────────────────────────────────────────────────

/// How input files are interpreted.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub columns: ColumnMapping,
    pub timestamp_policy: TimestampPolicy,
}

/// Metadata produced alongside the analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisMetadata {
    /// Local wall-clock time the analysis was built.
    pub generated_at: NaiveDateTime,
    /// Input path, or `"<memory>"` for in-memory rows.
    pub source: String,
    /// Rows read from the input before any filtering.
    pub rows_read: usize,
    pub rows_dropped_missing_pressure: usize,
    pub rows_skipped_bad_timestamp: usize,
    pub readings_count: usize,
    /// Distinct calendar dates with at least one reading.
    pub days_covered: usize,
    /// Wall-clock seconds spent reading the input files.
    pub load_time_seconds: f64,
}

/// One point of the systolic/diastolic trend series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub systolic: u16,
    pub diastolic: u16,
    pub category: Category,
}

/// Everything the renderers need, in one serializable bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub metadata: AnalysisMetadata,
    pub overall: BTreeMap<Category, f64>,
    pub statistics: Option<PressureStats>,
    pub daily: DistributionTable<NaiveDate>,
    pub periods: DistributionTable<Period>,
    pub first_of_day: CategoryCounts,
    pub trend: Vec<TrendPoint>,
}

// ── BloodPressureAnalyzer ─────────────────────────────────────────────────────

/// Owns the normalized reading set and answers aggregation queries over it.
#[derive(Debug, Clone)]
pub struct BloodPressureAnalyzer {
    readings: Vec<Reading>,
    metadata: AnalysisMetadata,
}

impl BloodPressureAnalyzer {
    /// Load `path` (a file or a directory of files) and normalize its rows.
    pub fn from_path(path: &Path, options: &LoadOptions) -> Result<Self> {
        let load_start = std::time::Instant::now();
        let raw = load_raw_readings(path, &options.columns)?;
        let load_time = load_start.elapsed().as_secs_f64();

        let mut analyzer = Self::from_raw(&raw, options)?;
        analyzer.metadata.source = path.display().to_string();
        analyzer.metadata.load_time_seconds = load_time;

        info!(
            "Loaded {} readings over {} days from {}",
            analyzer.metadata.readings_count,
            analyzer.metadata.days_covered,
            analyzer.metadata.source
        );
        Ok(analyzer)
    }

    /// Normalize rows that are already in memory. `raw` is not modified.
    pub fn from_raw(raw: &[RawReading], options: &LoadOptions) -> Result<Self> {
        let outcome = RecordNormalizer::new(options.timestamp_policy).normalize(raw)?;
        let days_covered = ReadingAggregator::statistics(&outcome.readings)
            .map(|s| s.days)
            .unwrap_or(0);

        let metadata = AnalysisMetadata {
            generated_at: Local::now().naive_local(),
            source: "<memory>".to_string(),
            rows_read: raw.len(),
            rows_dropped_missing_pressure: outcome.dropped_missing_pressure,
            rows_skipped_bad_timestamp: outcome.skipped_bad_timestamp,
            readings_count: outcome.readings.len(),
            days_covered,
            load_time_seconds: 0.0,
        };

        Ok(Self {
            readings: outcome.readings,
            metadata,
        })
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn metadata(&self) -> &AnalysisMetadata {
        &self.metadata
    }

    pub fn daily_distribution(&self) -> DistributionTable<NaiveDate> {
        ReadingAggregator::daily_distribution(&self.readings)
    }

    pub fn period_distribution(&self) -> DistributionTable<Period> {
        ReadingAggregator::period_distribution(&self.readings)
    }

    pub fn first_of_day_distribution(&self) -> CategoryCounts {
        ReadingAggregator::first_of_day_distribution(&self.readings)
    }

    pub fn overall_distribution(&self) -> BTreeMap<Category, f64> {
        ReadingAggregator::overall_distribution(&self.readings)
    }

    pub fn statistics(&self) -> Option<PressureStats> {
        ReadingAggregator::statistics(&self.readings)
    }

    /// Readings as a time series sorted by timestamp (stable on ties).
    pub fn trend_points(&self) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = self
            .readings
            .iter()
            .map(|r| TrendPoint {
                timestamp: r.timestamp,
                systolic: r.systolic,
                diastolic: r.diastolic,
                category: r.category,
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);
        points
    }

    /// Bundle every query result with the metadata.
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            metadata: self.metadata.clone(),
            overall: self.overall_distribution(),
            statistics: self.statistics(),
            daily: self.daily_distribution(),
            periods: self.period_distribution(),
            first_of_day: self.first_of_day_distribution(),
            trend: self.trend_points(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
