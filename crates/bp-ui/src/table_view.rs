//! Distribution tables (daily / by period / first reading) for the TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per group and
//! one percentage column per category present in the data.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use bp_core::formatting::{format_percent, percentage};
use bp_core::models::LabelSet;
use bp_data::aggregator::{CategoryCounts, DistributionTable};

use crate::themes::Theme;

/// Render a distribution table into `area`.
///
/// `key_header` titles the first column; `key_fmt` renders each row's key.
#[allow(clippy::too_many_arguments)]
pub fn render_distribution_table<K: PartialEq>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    key_header: &str,
    table: &DistributionTable<K>,
    key_fmt: impl Fn(&K) -> String,
    labels: LabelSet,
    theme: &Theme,
) {
    let mut header_cells = vec![Cell::from(key_header.to_string()).style(theme.table_header)];
    for category in &table.categories {
        header_cells.push(Cell::from(category.display_name(labels)).style(theme.table_header));
    }
    header_cells.push(Cell::from("Readings").style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let mut cells = vec![Cell::from(key_fmt(&row.key))];
            cells.extend(
                table
                    .categories
                    .iter()
                    .map(|c| Cell::from(format_percent(row.percentage(*c)))),
            );
            cells.push(Cell::from(row.total.to_string()));
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(12)];
    widths.extend(table.categories.iter().map(|_| Constraint::Length(14)));
    widths.push(Constraint::Length(10));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render first-of-day counts, one row per category.
pub fn render_first_reading_table(
    frame: &mut Frame,
    area: Rect,
    counts: &CategoryCounts,
    labels: LabelSet,
    theme: &Theme,
) {
    let header = Row::new(
        ["Category", "Days", "Share"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let total: usize = counts.values().sum();
    let rows: Vec<Row> = counts
        .iter()
        .map(|(category, count)| {
            Row::new(vec![
                Cell::from(category.display_name(labels)).style(theme.category_style(*category)),
                Cell::from(count.to_string()),
                Cell::from(format_percent(percentage(
                    *count as f64,
                    total as f64,
                    2,
                ))),
            ])
            .style(theme.table_row)
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" First Reading of the Day "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when there are no readings to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No readings found", theme.elevated)),
        Line::from(""),
        Line::from(Span::styled(
            "Every row was missing a systolic or diastolic value.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Blood Pressure Analyzer "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::models::{Category, Period};
    use bp_data::aggregator::DistributionRow;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::collections::BTreeMap;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn daily_table() -> DistributionTable<NaiveDate> {
        let mut pcts = BTreeMap::new();
        pcts.insert(Category::Normal, 50.0);
        pcts.insert(Category::Hypertensive, 50.0);
        DistributionTable {
            categories: vec![Category::Normal, Category::Hypertensive],
            rows: vec![DistributionRow {
                key: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                total: 2,
                percentages: pcts,
            }],
        }
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_daily_table_shows_values() {
        let mut terminal = Terminal::new(TestBackend::new(100, 10)).unwrap();
        let theme = Theme::dark();
        let table = daily_table();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_distribution_table(
                    frame,
                    area,
                    "Daily",
                    "Date",
                    &table,
                    |d| d.format("%Y-%m-%d").to_string(),
                    LabelSet::English,
                    &theme,
                );
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("2024-01-15"));
        assert!(text.contains("50.00%"));
        assert!(text.contains("Hypertensive"));
    }

    #[test]
    fn test_render_period_table_empty_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let theme = Theme::light();
        let table: DistributionTable<Period> = DistributionTable {
            categories: vec![],
            rows: vec![],
        };

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_distribution_table(
                    frame,
                    area,
                    "By Period",
                    "Period",
                    &table,
                    |p| p.to_string(),
                    LabelSet::Native,
                    &theme,
                );
            })
            .unwrap();
    }

    #[test]
    fn test_render_first_reading_table() {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        let theme = Theme::classic();
        let mut counts = CategoryCounts::new();
        counts.insert(Category::Normal, 1);

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_first_reading_table(frame, area, &counts, LabelSet::English, &theme);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Normal"));
        assert!(text.contains("100.00%"));
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, &theme);
            })
            .unwrap();

        assert!(buffer_text(&terminal).contains("No readings found"));
    }
}
