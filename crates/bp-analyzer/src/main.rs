mod bootstrap;

use anyhow::{Context, Result};
use bp_core::settings::Settings;
use bp_data::analysis::{AnalysisReport, BloodPressureAnalyzer, LoadOptions};
use bp_ui::app::App;
use bp_ui::plain;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let interactive = settings.view == "tui";
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| interactive.then(bootstrap::default_log_file));
    bootstrap::setup_logging(&settings.log_level, log_file.as_ref(), interactive)?;

    tracing::info!(
        "Blood Pressure Analyzer v{} starting",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        "Input: {}, View: {}, Theme: {}",
        settings.input.display(),
        settings.view,
        settings.theme
    );

    let report = analyze(&settings)?;

    if let Some(path) = &settings.pdf {
        bp_report::write_pdf_report(path, &report)
            .with_context(|| format!("Failed to write PDF report to {}", path.display()))?;
    }

    if interactive {
        App::new(&settings.theme, settings.label_set(), report).run()?;
    } else {
        print!("{}", render_output(&settings, &report)?);
    }

    Ok(())
}

/// Load the input and build the report.
fn analyze(settings: &Settings) -> Result<AnalysisReport> {
    let options = LoadOptions {
        columns: settings.columns(),
        timestamp_policy: settings.timestamp_policy(),
    };
    let analyzer = BloodPressureAnalyzer::from_path(&settings.input, &options)
        .with_context(|| format!("Failed to analyze {}", settings.input.display()))?;
    Ok(analyzer.report())
}

/// Non-interactive output for the `text` and `json` views.
fn render_output(settings: &Settings, report: &AnalysisReport) -> Result<String> {
    match settings.view.as_str() {
        "json" => Ok(serde_json::to_string_pretty(report)? + "\n"),
        _ => Ok(plain::format_report(report, settings.label_set())),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;
    use tempfile::TempDir;

    const CSV: &str = "時間,收縮壓,舒張壓\n\
        2024-01-15 08:00,110,70\n\
        2024-01-15 09:00,135,85\n\
        2024-01-15 14:00,150,95\n";

    fn settings(input: &Path, extra: &[&str]) -> Settings {
        let mut args = vec!["bp-analyzer".to_string(), input.display().to_string()];
        args.extend(extra.iter().map(|s| s.to_string()));
        Settings::parse_from(args)
    }

    fn write_csv(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("bp.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_text_output() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(dir.path(), CSV);
        let s = settings(&input, &[]);

        let report = analyze(&s).unwrap();
        let out = render_output(&s, &report).unwrap();
        assert!(out.contains("Blood Pressure Report"));
        assert!(out.contains("33.33%"));
    }

    #[test]
    fn test_text_output_native_labels() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(dir.path(), CSV);
        let s = settings(&input, &["--labels", "zh"]);

        let report = analyze(&s).unwrap();
        let out = render_output(&s, &report).unwrap();
        assert!(out.contains("高血壓"));
    }

    #[test]
    fn test_json_output() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(dir.path(), CSV);
        let s = settings(&input, &["--view", "json"]);

        let report = analyze(&s).unwrap();
        let out = render_output(&s, &report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["metadata"]["readings_count"], 3);
        assert_eq!(value["first_of_day"]["Normal"], 1);
    }

    #[test]
    fn test_malformed_timestamp_fails_with_context() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(dir.path(), "時間,收縮壓,舒張壓\nyesterday,120,80\n");
        let s = settings(&input, &[]);

        let err = analyze(&s).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("Failed to analyze"), "got: {chain}");
        assert!(chain.contains("yesterday"), "got: {chain}");
    }

    #[test]
    fn test_malformed_timestamp_skipped_on_request() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(
            dir.path(),
            "時間,收縮壓,舒張壓\nyesterday,120,80\n2024-01-15 08:00,110,70\n",
        );
        let s = settings(&input, &["--on-bad-timestamp", "skip"]);

        let report = analyze(&s).unwrap();
        assert_eq!(report.metadata.readings_count, 1);
        assert_eq!(report.metadata.rows_skipped_bad_timestamp, 1);
    }

    #[test]
    fn test_custom_columns() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(dir.path(), "ts,sys,dia\n2024-01-15 08:00,110,70\n");
        let s = settings(
            &input,
            &[
                "--timestamp-column",
                "ts",
                "--systolic-column",
                "sys",
                "--diastolic-column",
                "dia",
            ],
        );

        let report = analyze(&s).unwrap();
        assert_eq!(report.metadata.readings_count, 1);
    }

    #[test]
    fn test_pdf_written_alongside() {
        let dir = TempDir::new().unwrap();
        let input = write_csv(dir.path(), CSV);
        let pdf = dir.path().join("out.pdf");
        let s = settings(&input, &["--pdf", pdf.to_str().unwrap()]);

        let report = analyze(&s).unwrap();
        bp_report::write_pdf_report(s.pdf.as_ref().unwrap(), &report).unwrap();
        assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));
    }
}
