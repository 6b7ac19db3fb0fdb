//! PDF report rendering for the blood pressure analyzer.
//!
//! Lays out the summary percentages, pressure statistics, a vector trend
//! chart with reference lines and the distribution tables on A4 pages.

pub mod chart;
pub mod pdf;

pub use pdf::{generate_pdf_report, write_pdf_report};
