//! Terminal UI layer for the blood pressure analyzer.
//!
//! Provides themes, line components, the summary, trend and table views,
//! plain-text report formatting, and the tabbed application loop built on
//! top of [`ratatui`].

pub mod app;
pub mod components;
pub mod plain;
pub mod summary_view;
pub mod table_view;
pub mod themes;
pub mod trend_chart;

pub use bp_core as core;
