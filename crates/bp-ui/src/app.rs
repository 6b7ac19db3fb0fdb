//! Main application state and TUI event loop.
//!
//! [`App`] owns the theme, the label set, the selected tab and the analysis
//! report it displays. The report is computed once before the loop starts.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame, Terminal,
};

use bp_core::models::LabelSet;
use bp_data::analysis::AnalysisReport;

use crate::summary_view;
use crate::table_view;
use crate::themes::Theme;
use crate::trend_chart;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Summary,
    Trend,
    Daily,
    Periods,
    FirstReading,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Summary,
        Tab::Trend,
        Tab::Daily,
        Tab::Periods,
        Tab::FirstReading,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Summary => "Summary",
            Tab::Trend => "Trend",
            Tab::Daily => "Daily",
            Tab::Periods => "Periods",
            Tab::FirstReading => "First Reading",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// The tab to the right, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The tab to the left, wrapping around.
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the interactive report.
pub struct App {
    pub theme: Theme,
    pub labels: LabelSet,
    pub tab: Tab,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    pub report: AnalysisReport,
}

impl App {
    pub fn new(theme_name: &str, labels: LabelSet, report: AnalysisReport) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            labels,
            tab: Tab::Summary,
            should_quit: false,
            report,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the interactive report until `q`, `Q` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the loop stays
    /// on the current thread.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Apply a key press to the app state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.tab = self.tab.previous()
            }
            KeyCode::Char(c @ '1'..='5') => {
                let index = (c as usize) - ('1' as usize);
                self.tab = Tab::ALL[index];
            }
            _ => {}
        }
    }

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let titles: Vec<Line> = Tab::ALL
            .iter()
            .map(|t| Line::from(Span::styled(t.title(), self.theme.tab)))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .highlight_style(self.theme.tab_selected)
            .divider(Span::styled("|", self.theme.separator))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.table_border)
                    .title(" Blood Pressure Analyzer "),
            );
        frame.render_widget(tabs, chunks[0]);

        let body = chunks[1];
        let report = &self.report;
        let labels = self.labels;

        if report.trend.is_empty() && self.tab != Tab::Summary {
            table_view::render_no_data(frame, body, &self.theme);
        } else {
            match self.tab {
                Tab::Summary => {
                    summary_view::render_summary_view(frame, body, report, labels, &self.theme)
                }
                Tab::Trend => trend_chart::render_trend_chart(frame, body, &report.trend, &self.theme),
                Tab::Daily => table_view::render_distribution_table(
                    frame,
                    body,
                    "Daily Distribution",
                    "Date",
                    &report.daily,
                    |d| d.format("%Y-%m-%d").to_string(),
                    labels,
                    &self.theme,
                ),
                Tab::Periods => table_view::render_distribution_table(
                    frame,
                    body,
                    "By Time of Day",
                    "Period",
                    &report.periods,
                    |p| p.display_name(labels).to_string(),
                    labels,
                    &self.theme,
                ),
                Tab::FirstReading => table_view::render_first_reading_table(
                    frame,
                    body,
                    &report.first_of_day,
                    labels,
                    &self.theme,
                ),
            }
        }

        let help = Paragraph::new(Line::from(Span::styled(
            "Tab/→ next · Shift-Tab/← previous · 1-5 jump · q quit",
            self.theme.dim,
        )));
        frame.render_widget(help, chunks[2]);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
