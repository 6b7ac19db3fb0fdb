use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative marker placed either side of the application title.
pub const PULSE: &str = "─╮╭─";

/// Dashboard header rendering four lines:
///
/// 1. Application title (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. `[ source | N readings | first … last ]`.
/// 4. An empty line.
pub struct Header<'a> {
    /// Input file or directory the readings came from.
    pub source: &'a str,
    pub readings: usize,
    /// Formatted date range, `None` when there are no readings.
    pub range: Option<String>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(source: &'a str, readings: usize, range: Option<String>, theme: &'a Theme) -> Self {
        Self {
            source,
            readings,
            range,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        let mut info = vec![
            Span::styled("[ ", self.theme.label),
            Span::styled(self.source.to_string(), self.theme.value),
            Span::styled(" | ", self.theme.label),
            Span::styled(format!("{} readings", self.readings), self.theme.value),
        ];
        if let Some(range) = &self.range {
            info.push(Span::styled(" | ", self.theme.label));
            info.push(Span::styled(range.clone(), self.theme.value));
        }
        info.push(Span::styled(" ]", self.theme.label));

        vec![
            Line::from(vec![
                Span::styled(PULSE, self.theme.separator),
                Span::styled(" BLOOD PRESSURE ANALYZER ", self.theme.header),
                Span::styled(PULSE, self.theme.separator),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(info),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
