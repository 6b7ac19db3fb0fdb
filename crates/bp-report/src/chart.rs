//! Vector trend chart drawn straight onto a PDF layer.

use bp_core::classify::{DIASTOLIC_THRESHOLDS, SYSTOLIC_THRESHOLDS};
use bp_data::analysis::TrendPoint;
use chrono::NaiveDateTime;
use printpdf::{
    Color, IndirectFontRef, Line, LineDashPattern, Mm, PdfLayerReference, Point, Rgb,
};

/// Headroom above/below the plotted values, mmHg.
const Y_PADDING: f64 = 10.0;

const SYSTOLIC_RGB: (f32, f32, f32) = (0.80, 0.15, 0.15);
const DIASTOLIC_RGB: (f32, f32, f32) = (0.15, 0.35, 0.80);
const SYSTOLIC_REF_RGB: (f32, f32, f32) = (0.95, 0.60, 0.60);
const DIASTOLIC_REF_RGB: (f32, f32, f32) = (0.60, 0.70, 0.95);
const AXIS_RGB: (f32, f32, f32) = (0.0, 0.0, 0.0);

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Maps (hours since first reading, mmHg) into page millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
    pub start: NaiveDateTime,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartFrame {
    /// Fit a frame to `points`. `None` when there is nothing to plot.
    pub fn fit(points: &[TrendPoint], left: f32, bottom: f32, width: f32, height: f32) -> Option<Self> {
        let start = points.iter().map(|p| p.timestamp).min()?;
        let end = points.iter().map(|p| p.timestamp).max()?;
        let span = (end - start).num_seconds() as f64 / 3600.0;

        let lowest = points
            .iter()
            .map(|p| p.diastolic)
            .chain(DIASTOLIC_THRESHOLDS)
            .min()
            .map(f64::from)?;
        let highest = points
            .iter()
            .map(|p| p.systolic)
            .chain(SYSTOLIC_THRESHOLDS)
            .max()
            .map(f64::from)?;

        Some(Self {
            left,
            bottom,
            width,
            height,
            start,
            x_max: if span > 0.0 { span } else { 1.0 },
            y_min: ((lowest - Y_PADDING) / 10.0).floor().max(0.0) * 10.0,
            y_max: ((highest + Y_PADDING) / 10.0).ceil() * 10.0,
        })
    }

    pub fn hours(&self, ts: NaiveDateTime) -> f64 {
        (ts - self.start).num_seconds() as f64 / 3600.0
    }

    /// Page X for an offset in hours.
    pub fn x(&self, hours: f64) -> f32 {
        self.left + (hours / self.x_max) as f32 * self.width
    }

    /// Page Y for a pressure in mmHg.
    pub fn y(&self, mmhg: f64) -> f32 {
        self.bottom + ((mmhg - self.y_min) / (self.y_max - self.y_min)) as f32 * self.height
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn top(&self) -> f32 {
        self.bottom + self.height
    }
}

// ── Drawing ───────────────────────────────────────────────────────────────────

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn polyline(points: &[(f32, f32)]) -> Line {
    Line {
        points: points
            .iter()
            .map(|(x, y)| (Point::new(Mm(*x), Mm(*y)), false))
            .collect(),
        is_closed: false,
    }
}

fn dashed() -> LineDashPattern {
    LineDashPattern {
        dash_1: Some(4),
        gap_1: Some(3),
        ..Default::default()
    }
}

/// Draw axes, reference lines, both series and a legend.
pub fn draw_trend_chart(
    layer: &PdfLayerReference,
    frame: &ChartFrame,
    points: &[TrendPoint],
    font: &IndirectFontRef,
) {
    // Axes box.
    layer.set_outline_color(rgb(AXIS_RGB));
    layer.set_outline_thickness(0.8);
    layer.add_line(Line {
        points: [
            (frame.left, frame.bottom),
            (frame.right(), frame.bottom),
            (frame.right(), frame.top()),
            (frame.left, frame.top()),
        ]
        .iter()
        .map(|(x, y)| (Point::new(Mm(*x), Mm(*y)), false))
        .collect(),
        is_closed: true,
    });

    // Reference lines.
    layer.set_outline_thickness(0.5);
    layer.set_line_dash_pattern(dashed());
    for (levels, color) in [
        (SYSTOLIC_THRESHOLDS, SYSTOLIC_REF_RGB),
        (DIASTOLIC_THRESHOLDS, DIASTOLIC_REF_RGB),
    ] {
        layer.set_outline_color(rgb(color));
        for level in levels {
            let y = frame.y(f64::from(level));
            layer.add_line(polyline(&[(frame.left, y), (frame.right(), y)]));
        }
    }
    layer.set_line_dash_pattern(LineDashPattern::default());

    // Series.
    layer.set_outline_thickness(1.0);
    let series = |pick: fn(&TrendPoint) -> u16| -> Vec<(f32, f32)> {
        points
            .iter()
            .map(|p| {
                (
                    frame.x(frame.hours(p.timestamp)),
                    frame.y(f64::from(pick(p))),
                )
            })
            .collect()
    };
    for (coords, color) in [
        (series(|p| p.systolic), SYSTOLIC_RGB),
        (series(|p| p.diastolic), DIASTOLIC_RGB),
    ] {
        layer.set_outline_color(rgb(color));
        if coords.len() == 1 {
            // A lone reading becomes a short tick so it is still visible.
            let (x, y) = coords[0];
            layer.add_line(polyline(&[(x - 1.0, y), (x + 1.0, y)]));
        } else {
            layer.add_line(polyline(&coords));
        }
    }

    // Axis labels.
    layer.set_fill_color(rgb(AXIS_RGB));
    for level in SYSTOLIC_THRESHOLDS.iter().chain(DIASTOLIC_THRESHOLDS.iter()) {
        let y = frame.y(f64::from(*level));
        layer.use_text(level.to_string(), 7.0, Mm(frame.left - 8.0), Mm(y - 1.0), font);
    }
    let first = frame.start.format("%Y-%m-%d").to_string();
    let last = (frame.start + chrono::Duration::seconds((frame.x_max * 3600.0) as i64))
        .format("%Y-%m-%d")
        .to_string();
    layer.use_text(first, 7.0, Mm(frame.left), Mm(frame.bottom - 5.0), font);
    layer.use_text(last, 7.0, Mm(frame.right() - 16.0), Mm(frame.bottom - 5.0), font);

    // Legend.
    let legend_y = frame.top() + 3.0;
    let mut x = frame.left;
    for (label, color, dash) in [
        ("Systolic", SYSTOLIC_RGB, false),
        ("Diastolic", DIASTOLIC_RGB, false),
        ("Systolic reference (120/130/140)", SYSTOLIC_REF_RGB, true),
        ("Diastolic reference (80/85/90)", DIASTOLIC_REF_RGB, true),
    ] {
        layer.set_outline_color(rgb(color));
        if dash {
            layer.set_line_dash_pattern(dashed());
        }
        layer.add_line(polyline(&[(x, legend_y + 1.0), (x + 6.0, legend_y + 1.0)]));
        layer.set_line_dash_pattern(LineDashPattern::default());
        layer.use_text(label, 7.0, Mm(x + 7.5), Mm(legend_y), font);
        x += 9.0 + label.len() as f32 * 1.4;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::models::Category;
    use chrono::NaiveDate;

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

    #[test]
    fn test_fit_empty() {
        assert!(ChartFrame::fit(&[], 20.0, 100.0, 170.0, 80.0).is_none());
    }

    #[test]
    fn test_fit_ranges_round_to_tens() {
        let points = [point(15, 8, 118, 76), point(16, 8, 152, 95)];
        let frame = ChartFrame::fit(&points, 20.0, 100.0, 170.0, 80.0).unwrap();
        assert_eq!(frame.x_max, 24.0);
        assert_eq!(frame.y_min, 60.0);
        assert_eq!(frame.y_max, 170.0);
    }

    #[test]
    fn test_mapping_corners() {
        let points = [point(15, 0, 120, 80), point(17, 0, 140, 90)];
        let frame = ChartFrame::fit(&points, 20.0, 100.0, 170.0, 80.0).unwrap();

        assert_eq!(frame.x(0.0), 20.0);
        assert!((frame.x(48.0) - 190.0).abs() < 1e-4);
        assert!((frame.y(frame.y_min) - 100.0).abs() < 1e-4);
        assert!((frame.y(frame.y_max) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_thresholds_inside_frame() {
        let frame = ChartFrame::fit(&[point(15, 8, 100, 60)], 20.0, 100.0, 170.0, 80.0).unwrap();
        for level in SYSTOLIC_THRESHOLDS.iter().chain(DIASTOLIC_THRESHOLDS.iter()) {
            let y = frame.y(f64::from(*level));
            assert!(y > frame.bottom && y < frame.top(), "{level} at {y}");
        }
        // Single reading still gets a non-degenerate x axis.
        assert_eq!(frame.x_max, 1.0);
    }
}
