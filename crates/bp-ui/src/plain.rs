//! Plain-text rendering of an analysis report for non-interactive output.
//!
//! Column widths are measured in terminal cells, so the double-width native
//! category labels line up with ASCII ones.

use std::fmt::Write;

use bp_core::formatting::{format_number, format_percent, format_pressure, format_timestamp, percentage};
use bp_core::models::{Category, LabelSet};
use bp_data::aggregator::{CategoryCounts, DistributionTable};
use bp_data::analysis::AnalysisReport;
use unicode_width::UnicodeWidthStr;

const KEY_WIDTH: usize = 12;
const CELL_WIDTH: usize = 14;

// ── Padding ───────────────────────────────────────────────────────────────────

/// Pad `s` with trailing spaces to `width` display columns.
pub fn pad_right(s: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(used)))
}

/// Pad `s` with leading spaces to `width` display columns.
pub fn pad_left(s: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(s);
    format!("{}{}", " ".repeat(width.saturating_sub(used)), s)
}

// ── Tables ────────────────────────────────────────────────────────────────────

/// Render a distribution table, one line per group:
///
/// ```text
/// Date                Normal      Elevated
/// 2024-01-15          50.00%        50.00%
/// ```
pub fn format_distribution<K: PartialEq>(
    table: &DistributionTable<K>,
    key_header: &str,
    key_fmt: impl Fn(&K) -> String,
    labels: LabelSet,
) -> String {
    if table.is_empty() {
        return "(no readings)\n".to_string();
    }

    let mut out = pad_right(key_header, KEY_WIDTH);
    for category in &table.categories {
        out.push_str(&pad_left(category.display_name(labels), CELL_WIDTH));
    }
    out.push_str(&pad_left("n", 6));
    out.push('\n');

    for row in &table.rows {
        out.push_str(&pad_right(&key_fmt(&row.key), KEY_WIDTH));
        for category in &table.categories {
            out.push_str(&pad_left(&format_percent(row.percentage(*category)), CELL_WIDTH));
        }
        out.push_str(&pad_left(&row.total.to_string(), 6));
        out.push('\n');
    }
    out
}

/// Render first-of-day category counts with each count's share.
pub fn format_counts(counts: &CategoryCounts, labels: LabelSet) -> String {
    if counts.is_empty() {
        return "(no readings)\n".to_string();
    }

    let total: usize = counts.values().sum();
    let mut out = String::new();
    for (category, count) in counts {
        let share = percentage(*count as f64, total as f64, 2);
        out.push_str(&pad_right(category.display_name(labels), KEY_WIDTH));
        out.push_str(&pad_left(&count.to_string(), 6));
        out.push_str(&pad_left(&format_percent(share), CELL_WIDTH));
        out.push('\n');
    }
    out
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Full text report: summary, statistics and every distribution table.
pub fn format_report(report: &AnalysisReport, labels: LabelSet) -> String {
    let meta = &report.metadata;
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "Blood Pressure Report");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Source:     {}", meta.source);
    let _ = writeln!(out, "Generated:  {}", format_timestamp(&meta.generated_at));
    let _ = writeln!(
        out,
        "Readings:   {} over {} days ({} rows read, {} missing pressure, {} bad timestamps)",
        meta.readings_count,
        meta.days_covered,
        meta.rows_read,
        meta.rows_dropped_missing_pressure,
        meta.rows_skipped_bad_timestamp
    );
    out.push('\n');

    section(&mut out, "Summary");
    for category in Category::RECOGNIZED {
        let pct = report.overall.get(&category).copied().unwrap_or(0.0);
        out.push_str(&pad_right(category.display_name(labels), KEY_WIDTH));
        out.push_str(&pad_left(&format_percent(pct), CELL_WIDTH));
        out.push('\n');
    }
    out.push('\n');

    if let Some(stats) = &report.statistics {
        section(&mut out, "Statistics");
        let _ = writeln!(
            out,
            "Mean:       {}/{} mmHg",
            format_number(stats.systolic.mean, 1),
            format_number(stats.diastolic.mean, 1)
        );
        let _ = writeln!(
            out,
            "Min:        {} mmHg",
            format_pressure(stats.systolic.min, stats.diastolic.min)
        );
        let _ = writeln!(
            out,
            "Max:        {} mmHg",
            format_pressure(stats.systolic.max, stats.diastolic.max)
        );
        let _ = writeln!(
            out,
            "Span:       {} to {}",
            format_timestamp(&stats.first_timestamp),
            format_timestamp(&stats.last_timestamp)
        );
        out.push('\n');
    }

    section(&mut out, "By time of day");
    out.push_str(&format_distribution(
        &report.periods,
        "Period",
        |p| p.display_name(labels).to_string(),
        labels,
    ));
    out.push('\n');

    section(&mut out, "First reading of the day");
    out.push_str(&format_counts(&report.first_of_day, labels));
    out.push('\n');

    section(&mut out, "Daily");
    out.push_str(&format_distribution(
        &report.daily,
        "Date",
        |d| d.format("%Y-%m-%d").to_string(),
        labels,
    ));

    out
}

fn section(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(UnicodeWidthStr::width(title)));
    out.push('\n');
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::models::RawReading;
    use bp_data::analysis::{BloodPressureAnalyzer, LoadOptions};
    use serde_json::json;

    fn sample_report() -> AnalysisReport {
        let rows: Vec<RawReading> = [
            ("2024-01-15 08:00", 110, 70),
            ("2024-01-15 09:00", 135, 85),
            ("2024-01-15 14:00", 150, 95),
        ]
        .iter()
        .enumerate()
        .map(|(i, (ts, s, d))| RawReading {
            source: "mem".to_string(),
            row: i + 1,
            timestamp: json!(ts),
            systolic: Some(*s),
            diastolic: Some(*d),
        })
        .collect();
        BloodPressureAnalyzer::from_raw(&rows, &LoadOptions::default())
            .unwrap()
            .report()
    }

    // ── Padding ───────────────────────────────────────────────────────────────

    #[test]
    fn test_pad_right_ascii() {
        assert_eq!(pad_right("ab", 5), "ab   ");
        assert_eq!(pad_right("abcdef", 3), "abcdef");
    }

    #[test]
    fn test_pad_counts_wide_glyphs() {
        assert_eq!(pad_right("正常", 6), "正常  ");
        assert_eq!(pad_left("正常", 6), "  正常");
    }

    // ── Tables ────────────────────────────────────────────────────────────────

    #[test]
    fn test_format_distribution_rows() {
        let report = sample_report();
        let text = format_distribution(
            &report.daily,
            "Date",
            |d| d.format("%Y-%m-%d").to_string(),
            LabelSet::English,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Date"));
        assert!(lines[0].contains("Hypertensive"));
        assert!(lines[1].starts_with("2024-01-15"));
        assert_eq!(lines[1].matches("33.33%").count(), 3);
    }

    #[test]
    fn test_format_distribution_native_columns_align() {
        let report = sample_report();
        let text = format_distribution(
            &report.periods,
            "時段",
            |p| p.display_name(LabelSet::Native).to_string(),
            LabelSet::Native,
        );
        let widths: Vec<usize> = text.lines().map(UnicodeWidthStr::width).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "widths: {widths:?}");
        assert!(text.contains("早上"));
    }

    #[test]
    fn test_format_distribution_empty() {
        let table: DistributionTable<u8> = DistributionTable {
            categories: vec![],
            rows: vec![],
        };
        assert_eq!(
            format_distribution(&table, "Key", |k| k.to_string(), LabelSet::English),
            "(no readings)\n"
        );
    }

    #[test]
    fn test_format_counts() {
        let mut counts = CategoryCounts::new();
        counts.insert(Category::Normal, 3);
        counts.insert(Category::Hypertensive, 1);
        let text = format_counts(&counts, LabelSet::English);
        assert!(text.contains("75.00%"), "text: {text}");
        assert!(text.contains("25.00%"), "text: {text}");
    }

    // ── Report ────────────────────────────────────────────────────────────────

    #[test]
    fn test_format_report_sections() {
        let text = format_report(&sample_report(), LabelSet::English);
        for heading in [
            "Summary",
            "Statistics",
            "By time of day",
            "First reading of the day",
            "Daily",
        ] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("Readings:   3 over 1 days"));
        assert!(text.contains("Max:        150/95 mmHg"));
    }

    #[test]
    fn test_format_report_summary_lists_recognized_categories() {
        let text = format_report(&sample_report(), LabelSet::English);
        let summary: Vec<&str> = text
            .lines()
            .skip_while(|l| *l != "Summary")
            .skip(2)
            .take(3)
            .collect();
        assert!(summary[0].starts_with("Normal"));
        assert!(summary[1].starts_with("Elevated"));
        assert!(summary[2].starts_with("Hypertensive"));
        assert!(summary.iter().all(|l| l.ends_with("33.33%")));
    }
}
