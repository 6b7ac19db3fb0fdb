//! Shared types for the blood pressure analyzer.
//!
//! Holds the reading model, the classification rules, timestamp parsing,
//! error types, CLI settings and display formatting helpers.

pub mod classify;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{AnalyzerError, Result};
