use std::collections::BTreeMap;

use bp_core::formatting::format_percent;
use bp_core::models::{Category, LabelSet};
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// Configuration controlling visual appearance of a bar.
pub struct BarConfig {
    /// Width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

// ── CategoryShareBar ─────────────────────────────────────────────────────────

/// One category's share of the readings as a horizontal bar:
/// `Normal        ████████░░░░ 33.33%`.
pub struct CategoryShareBar<'a> {
    pub category: Category,
    /// Share in percent, clamped to `[0.0, 100.0]`.
    pub percentage: f64,
    pub labels: LabelSet,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> CategoryShareBar<'a> {
    pub fn new(category: Category, percentage: f64, labels: LabelSet, theme: &'a Theme) -> Self {
        Self {
            category,
            percentage: percentage.clamp(0.0, 100.0),
            labels,
            theme,
            config: BarConfig::default(),
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let filled = ((self.percentage / 100.0) * self.config.width as f64).round() as u16;
        let filled = filled.min(self.config.width);
        let empty = self.config.width - filled;

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        let name = crate::plain::pad_right(self.category.display_name(self.labels), 14);

        Line::from(vec![
            Span::styled(name, self.theme.label),
            Span::styled(filled_str, self.theme.category_style(self.category)),
            Span::styled(empty_str, self.theme.dim),
            Span::styled(format!(" {}", format_percent(self.percentage)), self.theme.value),
        ])
    }
}

// ── CategoryMixBar ───────────────────────────────────────────────────────────

/// All categories side by side in one proportional bar, followed by short
/// labels for the non-zero ones.
pub struct CategoryMixBar<'a> {
    pub percentages: &'a BTreeMap<Category, f64>,
    pub labels: LabelSet,
    pub theme: &'a Theme,
    pub width: u16,
}

impl<'a> CategoryMixBar<'a> {
    pub fn new(
        percentages: &'a BTreeMap<Category, f64>,
        labels: LabelSet,
        theme: &'a Theme,
    ) -> Self {
        Self {
            percentages,
            labels,
            theme,
            width: 40,
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let mut spans: Vec<Span<'a>> = Vec::new();

        for (category, pct) in self.percentages {
            let chars = ((*pct / 100.0) * self.width as f64).round() as usize;
            if chars > 0 {
                spans.push(Span::styled(
                    "█".repeat(chars),
                    self.theme.category_style(*category),
                ));
            }
        }

        spans.push(Span::raw(" "));

        for (category, pct) in self.percentages {
            if *pct > 0.0 {
                spans.push(Span::styled(
                    format!("{}: {:.0}% ", category.display_name(self.labels), pct),
                    self.theme.category_style(*category),
                ));
            }
        }

        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
