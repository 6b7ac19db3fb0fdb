//! Summary tab: header, category shares, pressure statistics and load notes.

use bp_core::formatting::{format_number, format_pressure, format_timestamp};
use bp_core::models::{Category, LabelSet};
use bp_data::analysis::AnalysisReport;
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use crate::components::header::Header;
use crate::components::progress_bar::{CategoryMixBar, CategoryShareBar};
use crate::themes::Theme;

/// Build the summary as lines so it can be tested without a terminal.
pub fn summary_lines<'a>(
    report: &'a AnalysisReport,
    labels: LabelSet,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let meta = &report.metadata;
    let range = report.statistics.as_ref().map(|s| {
        format!(
            "{} → {}",
            s.first_timestamp.format("%Y-%m-%d"),
            s.last_timestamp.format("%Y-%m-%d")
        )
    });

    let mut lines = Header::new(&meta.source, meta.readings_count, range, theme).to_lines();

    lines.push(Line::from(Span::styled("Category shares", theme.header)));
    for category in Category::RECOGNIZED {
        let pct = report.overall.get(&category).copied().unwrap_or(0.0);
        lines.push(CategoryShareBar::new(category, pct, labels, theme).to_line());
    }
    if let Some(pct) = report.overall.get(&Category::Unclassified) {
        lines.push(CategoryShareBar::new(Category::Unclassified, *pct, labels, theme).to_line());
    }
    lines.push(CategoryMixBar::new(&report.overall, labels, theme).to_line());
    lines.push(Line::from(""));

    if let Some(stats) = &report.statistics {
        lines.push(Line::from(Span::styled("Pressure", theme.header)));
        lines.push(label_value(
            "Mean",
            format!(
                "{}/{} mmHg",
                format_number(stats.systolic.mean, 1),
                format_number(stats.diastolic.mean, 1)
            ),
            theme,
        ));
        lines.push(label_value(
            "Lowest",
            format!(
                "{} mmHg",
                format_pressure(stats.systolic.min, stats.diastolic.min)
            ),
            theme,
        ));
        lines.push(label_value(
            "Highest",
            format!(
                "{} mmHg",
                format_pressure(stats.systolic.max, stats.diastolic.max)
            ),
            theme,
        ));
        lines.push(label_value("Days", stats.days.to_string(), theme));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled("Input", theme.header)));
    lines.push(label_value("Rows read", meta.rows_read.to_string(), theme));
    if meta.rows_dropped_missing_pressure > 0 {
        lines.push(label_value(
            "Missing pressure",
            meta.rows_dropped_missing_pressure.to_string(),
            theme,
        ));
    }
    if meta.rows_skipped_bad_timestamp > 0 {
        lines.push(label_value(
            "Bad timestamps",
            meta.rows_skipped_bad_timestamp.to_string(),
            theme,
        ));
    }
    lines.push(label_value(
        "Generated",
        format_timestamp(&meta.generated_at),
        theme,
    ));

    lines
}

pub fn render_summary_view(
    frame: &mut Frame,
    area: Rect,
    report: &AnalysisReport,
    labels: LabelSet,
    theme: &Theme,
) {
    let paragraph = Paragraph::new(Text::from(summary_lines(report, labels, theme)));
    frame.render_widget(paragraph, area);
}

fn label_value<'a>(label: &str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(crate::plain::pad_right(label, 18), theme.label),
        Span::styled(value, theme.value),
    ])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
