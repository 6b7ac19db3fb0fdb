//! A4 PDF report built with `printpdf` builtin fonts.
//!
//! Builtin Helvetica has no CJK glyphs, so the report always uses the English
//! category and period names.

use std::io::BufWriter;
use std::path::Path;

use bp_core::error::{AnalyzerError, Result};
use bp_core::formatting::{format_number, format_percent, format_pressure, format_timestamp, percentage};
use bp_core::models::{Category, LabelSet};
use bp_data::aggregator::DistributionTable;
use bp_data::analysis::AnalysisReport;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use tracing::{debug, info};

use crate::chart::{draw_trend_chart, ChartFrame};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 20.0;
const LEFT: f32 = 20.0;
const CHART_HEIGHT: f32 = 80.0;
const KEY_COLUMN: f32 = 32.0;
const CATEGORY_COLUMN: f32 = 30.0;

// ── Public API ────────────────────────────────────────────────────────────────

/// Render `report` as PDF bytes.
pub fn generate_pdf_report(report: &AnalysisReport) -> Result<Vec<u8>> {
    render(report).map(|rendered| rendered.bytes)
}

/// Render `report` and write it to `path`.
pub fn write_pdf_report(path: &Path, report: &AnalysisReport) -> Result<()> {
    let rendered = render(report)?;
    std::fs::write(path, &rendered.bytes)?;
    info!(
        "Wrote PDF report ({} pages, {} bytes) to {}",
        rendered.pages,
        rendered.bytes.len(),
        path.display()
    );
    Ok(())
}

// ── Page writer ───────────────────────────────────────────────────────────────

struct Rendered {
    bytes: Vec<u8>,
    pages: usize,
}

fn pdf_error(context: &str, e: impl std::fmt::Display) -> AnalyzerError {
    AnalyzerError::Report(format!("PDF {context} error: {e}"))
}

/// Cursor over the document that starts a new page when the current one is
/// full.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| pdf_error("font", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| pdf_error("font", e))?;

        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: TOP,
            pages: 1,
        })
    }

    /// Start a new page unless `height` mm still fit on this one.
    fn reserve(&mut self, height: f32) {
        if self.y - height >= BOTTOM {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
        self.pages += 1;
    }

    fn text_at(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.font };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn line(&mut self, text: &str, size: f32, bold: bool, advance: f32) {
        self.reserve(advance);
        self.text_at(text, size, LEFT, bold);
        self.y -= advance;
    }

    fn heading(&mut self, text: &str) {
        // Keep a heading together with at least its first rows.
        self.reserve(20.0);
        self.y -= 4.0;
        self.line(text, 11.0, true, 6.0);
    }

    fn finish(self) -> Result<Rendered> {
        let pages = self.pages;
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| pdf_error("save", e))?;
        let bytes = buf.into_inner().map_err(|e| pdf_error("buffer", e))?;
        Ok(Rendered { bytes, pages })
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn render(report: &AnalysisReport) -> Result<Rendered> {
    let mut w = PageWriter::new("Blood Pressure Report")?;
    let meta = &report.metadata;

    w.line("Blood Pressure Report", 16.0, true, 9.0);
    w.line(
        &format!("Generated: {}", format_timestamp(&meta.generated_at)),
        9.0,
        false,
        4.5,
    );
    w.line(&format!("Source: {}", meta.source), 9.0, false, 4.5);
    w.line(
        &format!(
            "Readings: {} over {} days ({} rows read, {} without pressure, {} bad timestamps)",
            meta.readings_count,
            meta.days_covered,
            meta.rows_read,
            meta.rows_dropped_missing_pressure,
            meta.rows_skipped_bad_timestamp
        ),
        9.0,
        false,
        4.5,
    );

    w.heading("SUMMARY");
    for category in Category::RECOGNIZED {
        let pct = report.overall.get(&category).copied().unwrap_or(0.0);
        w.line(
            &format!("{}: {}", category.display_name(LabelSet::English), format_percent(pct)),
            10.0,
            false,
            5.0,
        );
    }

    if let Some(stats) = &report.statistics {
        w.heading("STATISTICS");
        w.line(
            &format!(
                "Mean: {}/{} mmHg",
                format_number(stats.systolic.mean, 1),
                format_number(stats.diastolic.mean, 1)
            ),
            9.0,
            false,
            4.5,
        );
        w.line(
            &format!(
                "Lowest: {} mmHg   Highest: {} mmHg",
                format_pressure(stats.systolic.min, stats.diastolic.min),
                format_pressure(stats.systolic.max, stats.diastolic.max)
            ),
            9.0,
            false,
            4.5,
        );
        w.line(
            &format!(
                "From {} to {}",
                format_timestamp(&stats.first_timestamp),
                format_timestamp(&stats.last_timestamp)
            ),
            9.0,
            false,
            4.5,
        );
    }

    w.heading("TREND");
    w.reserve(CHART_HEIGHT + 14.0);
    let bottom = w.y - CHART_HEIGHT - 4.0;
    match ChartFrame::fit(&report.trend, LEFT + 8.0, bottom, PAGE_WIDTH - 2.0 * LEFT - 8.0, CHART_HEIGHT) {
        Some(frame) => {
            draw_trend_chart(&w.layer, &frame, &report.trend, &w.font);
            w.y = bottom - 9.0;
        }
        None => w.line("No readings to plot.", 9.0, false, 4.5),
    }

    w.heading("BY TIME OF DAY");
    distribution(&mut w, &report.periods, "Period", |p| {
        p.display_name(LabelSet::English).to_string()
    });

    w.heading("FIRST READING OF THE DAY");
    if report.first_of_day.is_empty() {
        w.line("No readings.", 9.0, false, 4.5);
    }
    let firsts: usize = report.first_of_day.values().sum();
    for (category, count) in &report.first_of_day {
        w.line(
            &format!(
                "{}: {} days ({})",
                category.display_name(LabelSet::English),
                count,
                format_percent(percentage(*count as f64, firsts as f64, 2))
            ),
            9.0,
            false,
            4.5,
        );
    }

    w.heading("DAILY DISTRIBUTION");
    distribution(&mut w, &report.daily, "Date", |d| d.format("%Y-%m-%d").to_string());

    debug!("PDF laid out on {} pages", w.pages);
    w.finish()
}

/// Table with a header row; repeats the header after a page break.
fn distribution<K: PartialEq>(
    w: &mut PageWriter,
    table: &DistributionTable<K>,
    key_header: &str,
    key_fmt: impl Fn(&K) -> String,
) {
    if table.is_empty() {
        w.line("No readings.", 9.0, false, 4.5);
        return;
    }

    let header = |w: &PageWriter| {
        w.text_at(key_header, 9.0, LEFT, true);
        for (i, category) in table.categories.iter().enumerate() {
            let x = LEFT + KEY_COLUMN + i as f32 * CATEGORY_COLUMN;
            w.text_at(category.display_name(LabelSet::English), 9.0, x, true);
        }
        let x = LEFT + KEY_COLUMN + table.categories.len() as f32 * CATEGORY_COLUMN;
        w.text_at("Readings", 9.0, x, true);
    };

    header(&*w);
    w.y -= 5.0;
    let mut page = w.pages;

    for row in &table.rows {
        w.reserve(4.5);
        if w.pages != page {
            page = w.pages;
            header(&*w);
            w.y -= 5.0;
        }
        w.text_at(&key_fmt(&row.key), 9.0, LEFT, false);
        for (i, category) in table.categories.iter().enumerate() {
            let x = LEFT + KEY_COLUMN + i as f32 * CATEGORY_COLUMN;
            w.text_at(&format_percent(row.percentage(*category)), 9.0, x, false);
        }
        let x = LEFT + KEY_COLUMN + table.categories.len() as f32 * CATEGORY_COLUMN;
        w.text_at(&row.total.to_string(), 9.0, x, false);
        w.y -= 4.5;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::models::RawReading;
    use bp_data::analysis::{BloodPressureAnalyzer, LoadOptions};
    use chrono::{Duration, NaiveDate};
    use serde_json::json;
    use tempfile::TempDir;

    fn report_for_days(days: i64) -> AnalysisReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        let raw: Vec<RawReading> = (0..days)
            .flat_map(|d| {
                let morning = start + Duration::days(d);
                let evening = morning + Duration::hours(12);
                [(morning, 118 + (d % 30) as u16, 76), (evening, 135, 88)]
            })
            .enumerate()
            .map(|(i, (ts, s, dia))| RawReading {
                source: "mem".to_string(),
                row: i + 1,
                timestamp: json!(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
                systolic: Some(s),
                diastolic: Some(dia),
            })
            .collect();
        BloodPressureAnalyzer::from_raw(&raw, &LoadOptions::default())
            .unwrap()
            .report()
    }

    #[test]
    fn test_generate_pdf_header() {
        let bytes = generate_pdf_report(&report_for_days(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_generate_pdf_empty_report() {
        let bytes = generate_pdf_report(&report_for_days(0)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_short_report_fits_one_page() {
        let rendered = render(&report_for_days(3)).unwrap();
        assert_eq!(rendered.pages, 1);
    }

    #[test]
    fn test_long_daily_table_continues_on_new_pages() {
        let rendered = render(&report_for_days(120)).unwrap();
        assert!(rendered.pages >= 3, "pages = {}", rendered.pages);
    }

    #[test]
    fn test_write_pdf_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        write_pdf_report(&path, &report_for_days(5)).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_pdf_report_bad_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("report.pdf");
        let result = write_pdf_report(&path, &report_for_days(1));
        assert!(matches!(result, Err(AnalyzerError::Io(_))));
    }
}
