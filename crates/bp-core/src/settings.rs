use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{ColumnMapping, LabelSet, TimestampPolicy};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Blood pressure reading analysis and reporting
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bp-analyzer",
    about = "Blood pressure reading analysis and reporting",
    version
)]
pub struct Settings {
    /// Input file (.csv, .jsonl, .json) or directory of input files
    pub input: PathBuf,

    /// Output view
    #[arg(long, default_value = "text", value_parser = ["text", "tui", "json"])]
    pub view: String,

    /// Write a PDF report to this path
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Label set for categories and periods
    #[arg(long, default_value = "en", value_parser = ["en", "zh"])]
    pub labels: String,

    /// Name of the timestamp column
    #[arg(long, default_value = ColumnMapping::DEFAULT_TIMESTAMP)]
    pub timestamp_column: String,

    /// Name of the systolic pressure column
    #[arg(long, default_value = ColumnMapping::DEFAULT_SYSTOLIC)]
    pub systolic_column: String,

    /// Name of the diastolic pressure column
    #[arg(long, default_value = ColumnMapping::DEFAULT_DIASTOLIC)]
    pub diastolic_column: String,

    /// What to do with rows whose timestamp cannot be parsed
    #[arg(long, default_value = "abort", value_parser = ["abort", "skip"])]
    pub on_bad_timestamp: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.bp-analyzer/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systolic_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diastolic_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_bad_timestamp: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".bp-analyzer").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation. Accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins; `input` and `pdf` are never loaded from last-used.
        merge_unless_explicit(&matches, "view", &mut settings.view, last.view);
        merge_unless_explicit(&matches, "theme", &mut settings.theme, last.theme);
        merge_unless_explicit(&matches, "labels", &mut settings.labels, last.labels);
        merge_unless_explicit(
            &matches,
            "timestamp_column",
            &mut settings.timestamp_column,
            last.timestamp_column,
        );
        merge_unless_explicit(
            &matches,
            "systolic_column",
            &mut settings.systolic_column,
            last.systolic_column,
        );
        merge_unless_explicit(
            &matches,
            "diastolic_column",
            &mut settings.diastolic_column,
            last.diastolic_column,
        );
        merge_unless_explicit(
            &matches,
            "on_bad_timestamp",
            &mut settings.on_bad_timestamp,
            last.on_bad_timestamp,
        );

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    pub fn columns(&self) -> ColumnMapping {
        ColumnMapping {
            timestamp: self.timestamp_column.clone(),
            systolic: self.systolic_column.clone(),
            diastolic: self.diastolic_column.clone(),
        }
    }

    pub fn label_set(&self) -> LabelSet {
        LabelSet::from_name(&self.labels)
    }

    pub fn timestamp_policy(&self) -> TimestampPolicy {
        TimestampPolicy::from_name(&self.on_bad_timestamp)
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            view: Some(s.view.clone()),
            theme: Some(s.theme.clone()),
            labels: Some(s.labels.clone()),
            timestamp_column: Some(s.timestamp_column.clone()),
            systolic_column: Some(s.systolic_column.clone()),
            diastolic_column: Some(s.diastolic_column.clone()),
            on_bad_timestamp: Some(s.on_bad_timestamp.clone()),
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// NOTE: clap stores the arg id using the *field name* (underscores),
// not the long-flag spelling (hyphens).
fn merge_unless_explicit(
    matches: &clap::ArgMatches,
    name: &str,
    target: &mut String,
    persisted: Option<String>,
) {
    if is_arg_explicitly_set(matches, name) {
        return;
    }
    if let Some(v) = persisted {
        *target = v;
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
