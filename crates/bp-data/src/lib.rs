//! Data layer for the blood pressure analyzer.
//!
//! Discovers and reads input files, normalizes rows into classified
//! readings, aggregates category distributions and runs the top-level
//! analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod normalizer;
pub mod reader;

pub use bp_core as core;
