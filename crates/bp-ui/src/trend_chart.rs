//! Systolic / diastolic trend chart with reference threshold lines.

use bp_core::classify::{DIASTOLIC_THRESHOLDS, SYSTOLIC_THRESHOLDS};
use bp_data::analysis::TrendPoint;
use chrono::{Duration, NaiveDateTime};
use ratatui::{
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::themes::Theme;

/// Samples per reference line; drawn as dots so the line reads as dashed.
const THRESHOLD_DOTS: usize = 60;

/// Headroom above/below the plotted values, mmHg.
const Y_PADDING: f64 = 10.0;

/// Chart-space series derived from trend points. X is hours since the first
/// reading, Y is mmHg.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub start: NaiveDateTime,
    pub systolic: Vec<(f64, f64)>,
    pub diastolic: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl TrendSeries {
    /// Build the series. `None` when there is nothing to plot.
    pub fn from_points(points: &[TrendPoint]) -> Option<Self> {
        let start = points.iter().map(|p| p.timestamp).min()?;
        let hours = |ts: NaiveDateTime| (ts - start).num_seconds() as f64 / 3600.0;

        let systolic: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (hours(p.timestamp), f64::from(p.systolic)))
            .collect();
        let diastolic: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (hours(p.timestamp), f64::from(p.diastolic)))
            .collect();

        let x_max = systolic.iter().map(|(x, _)| *x).fold(0.0, f64::max);
        // A single instant still needs a non-degenerate axis.
        let x_bounds = [0.0, if x_max > 0.0 { x_max } else { 1.0 }];

        let lowest = points
            .iter()
            .map(|p| p.diastolic)
            .chain(DIASTOLIC_THRESHOLDS)
            .min()
            .map(f64::from)
            .unwrap_or(0.0);
        let highest = points
            .iter()
            .map(|p| p.systolic)
            .chain(SYSTOLIC_THRESHOLDS)
            .max()
            .map(f64::from)
            .unwrap_or(0.0);
        let y_bounds = [(lowest - Y_PADDING).max(0.0), highest + Y_PADDING];

        Some(Self {
            start,
            systolic,
            diastolic,
            x_bounds,
            y_bounds,
        })
    }

    /// Evenly spaced points along a horizontal reference line at `level`.
    pub fn threshold_line(&self, level: u16) -> Vec<(f64, f64)> {
        let [x0, x1] = self.x_bounds;
        let step = (x1 - x0) / (THRESHOLD_DOTS - 1) as f64;
        (0..THRESHOLD_DOTS)
            .map(|i| (x0 + step * i as f64, f64::from(level)))
            .collect()
    }

    /// Dates at the start, middle and end of the X axis.
    pub fn x_labels(&self) -> Vec<String> {
        let [x0, x1] = self.x_bounds;
        [x0, (x0 + x1) / 2.0, x1]
            .iter()
            .map(|h| {
                let at = self.start + Duration::seconds((h * 3600.0) as i64);
                at.format("%m-%d").to_string()
            })
            .collect()
    }

    pub fn y_labels(&self) -> Vec<String> {
        let [y0, y1] = self.y_bounds;
        [y0, (y0 + y1) / 2.0, y1]
            .iter()
            .map(|v| format!("{:.0}", v))
            .collect()
    }
}

/// Render the trend chart into `area`.
pub fn render_trend_chart(frame: &mut Frame, area: Rect, points: &[TrendPoint], theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(" Trend (mmHg) ");

    let Some(series) = TrendSeries::from_points(points) else {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled("No readings to plot", theme.dim)))
                .block(block),
            area,
        );
        return;
    };

    let systolic_refs: Vec<Vec<(f64, f64)>> = SYSTOLIC_THRESHOLDS
        .iter()
        .map(|level| series.threshold_line(*level))
        .collect();
    let diastolic_refs: Vec<Vec<(f64, f64)>> = DIASTOLIC_THRESHOLDS
        .iter()
        .map(|level| series.threshold_line(*level))
        .collect();

    // Unnamed datasets stay out of the legend.
    let mut datasets: Vec<Dataset> = systolic_refs
        .iter()
        .chain(diastolic_refs.iter())
        .map(|data| reference_dataset(data, theme.threshold))
        .collect();
    datasets.push(
        Dataset::default()
            .name("Systolic")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.systolic)
            .data(&series.systolic),
    );
    datasets.push(
        Dataset::default()
            .name("Diastolic")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.diastolic)
            .data(&series.diastolic),
    );

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("Date")
                .style(theme.axis)
                .bounds(series.x_bounds)
                .labels(series.x_labels()),
        )
        .y_axis(
            Axis::default()
                .title("mmHg")
                .style(theme.axis)
                .bounds(series.y_bounds)
                .labels(series.y_labels()),
        )
        .legend_position(Some(LegendPosition::TopRight));

    frame.render_widget(chart, area);
}

fn reference_dataset(data: &[(f64, f64)], style: Style) -> Dataset<'_> {
    Dataset::default()
        .marker(Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(style)
        .data(data)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::models::Category;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn point(day: u32, hour: u32, systolic: u16, diastolic: u16) -> TrendPoint {
        TrendPoint {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            systolic,
            diastolic,
            category: Category::Normal,
        }
    }

    // ── TrendSeries ───────────────────────────────────────────────────────────

    #[test]
    fn test_series_empty() {
        assert!(TrendSeries::from_points(&[]).is_none());
    }

    #[test]
    fn test_series_hours_since_start() {
        let points = [point(15, 8, 118, 76), point(16, 8, 150, 95)];
        let series = TrendSeries::from_points(&points).unwrap();
        assert_eq!(series.systolic, vec![(0.0, 118.0), (24.0, 150.0)]);
        assert_eq!(series.diastolic, vec![(0.0, 76.0), (24.0, 95.0)]);
        assert_eq!(series.x_bounds, [0.0, 24.0]);
    }

    #[test]
    fn test_series_y_bounds_include_thresholds() {
        let points = [point(15, 8, 110, 82)];
        let series = TrendSeries::from_points(&points).unwrap();
        // 80 diastolic threshold and 140 systolic threshold are both visible.
        assert_eq!(series.y_bounds, [70.0, 150.0]);
    }

    #[test]
    fn test_series_single_point_has_width() {
        let series = TrendSeries::from_points(&[point(15, 8, 120, 80)]).unwrap();
        assert_eq!(series.x_bounds, [0.0, 1.0]);
    }

    #[test]
    fn test_threshold_line_spans_axis() {
        let points = [point(15, 0, 120, 80), point(17, 0, 120, 80)];
        let series = TrendSeries::from_points(&points).unwrap();
        let line = series.threshold_line(130);
        assert_eq!(line.len(), THRESHOLD_DOTS);
        assert_eq!(line[0], (0.0, 130.0));
        let last = line[THRESHOLD_DOTS - 1];
        assert!((last.0 - 48.0).abs() < 1e-9);
        assert!(line.iter().all(|(_, y)| *y == 130.0));
    }

    #[test]
    fn test_x_labels_are_dates() {
        let points = [point(15, 0, 120, 80), point(17, 0, 120, 80)];
        let series = TrendSeries::from_points(&points).unwrap();
        assert_eq!(series.x_labels(), vec!["01-15", "01-16", "01-17"]);
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_trend_chart_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let theme = Theme::dark();
        let points = [
            point(15, 7, 118, 76),
            point(15, 20, 135, 86),
            point(16, 7, 150, 95),
        ];

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_trend_chart(frame, area, &points, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_trend_chart_empty_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let theme = Theme::classic();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_trend_chart(frame, area, &[], &theme);
            })
            .unwrap();
    }
}
