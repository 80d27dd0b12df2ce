// LogWarden - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Discovery, analysis, report and exports

use clap::Parser;
use logwarden::app::analyze::{self, AnalyzeOptions};
use logwarden::app::report::{render_report, ReportOptions};
use logwarden::core::discovery::discover_files;
use logwarden::core::export;
use logwarden::core::filter::{AlertFilter, EntryFilter};
use logwarden::core::model::LogFormat;
use logwarden::platform::config::{self, AppConfig, PlatformPaths};
use logwarden::util;
use logwarden::util::error::{LogWardenError, Result};
use std::path::PathBuf;

/// LogWarden - log parser and security threat scanner.
///
/// Point LogWarden at log files or directories to detect their format, parse
/// every line and flag injection attempts, path traversal and brute-force
/// authentication failures.
#[derive(Parser, Debug)]
#[command(name = "logwarden", version, about)]
struct Cli {
    /// Log files or directories to analyse.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Force a format for every file instead of detecting it
    /// (apache, nginx, syslog, json, common, generic).
    #[arg(short = 'f', long = "format")]
    format: Option<String>,

    /// Only list entries with this exact level (implies --show-entries).
    #[arg(short = 'l', long = "level")]
    level: Option<String>,

    /// Only list entries whose message or source contains this text
    /// (case-insensitive; implies --show-entries).
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Only list entries whose message matches this regex (implies --show-entries).
    #[arg(long = "regex")]
    regex: Option<String>,

    /// Only report alerts at or above this severity (low, medium, high, critical).
    #[arg(short = 'm', long = "min-severity")]
    min_severity: Option<String>,

    /// Only report alerts of this type (repeatable), e.g. sql_injection,
    /// brute_force_attack.
    #[arg(short = 't', long = "alert-type")]
    alert_types: Vec<String>,

    /// List parsed entries after the alerts.
    #[arg(long = "show-entries")]
    show_entries: bool,

    /// Write the (filtered) entries to a .csv, .json or .jsonl file.
    #[arg(long = "export-entries")]
    export_entries: Option<PathBuf>,

    /// Write the (filtered) alerts to a .csv or .json file.
    #[arg(long = "export-alerts")]
    export_alerts: Option<PathBuf>,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging so its level can take part; its
    // warnings are replayed once the subscriber exists.
    let loaded = match cli.config {
        Some(ref path) => config::load_config_file(path),
        None => Ok(config::load_config(&PlatformPaths::resolve().config_dir)),
    };

    let (app_config, config_warnings) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            util::logging::init(cli.debug, None);
            fail(&LogWardenError::from(e));
        }
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "LogWarden starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    if let Err(e) = run(&cli, &app_config) {
        fail(&e);
    }
}

fn fail(e: &LogWardenError) -> ! {
    tracing::error!(error = %e, "Fatal error");
    eprintln!("Error: {e}");
    std::process::exit(1);
}

fn run(cli: &Cli, app_config: &AppConfig) -> Result<()> {
    let format_override = cli
        .format
        .as_deref()
        .map(str::parse::<LogFormat>)
        .transpose()?;

    let mut alert_filter = match cli.min_severity.as_deref() {
        Some(name) => AlertFilter::with_min_severity(name)?,
        None => AlertFilter::default(),
    };
    for name in &cli.alert_types {
        alert_filter.add_alert_type(name)?;
    }

    let mut entry_filter = EntryFilter {
        text_search: cli.search.clone().unwrap_or_default(),
        level: cli.level.clone(),
        regex_search: None,
    };
    if let Some(ref pattern) = cli.regex {
        entry_filter.set_regex(pattern)?;
    }
    let show_entries = cli.show_entries || !entry_filter.is_empty();

    // -- Discovery --
    let discovery_config = analyze::discovery_config(app_config);
    let mut files = Vec::new();
    let mut warnings = Vec::new();
    for path in &cli.paths {
        let (found, discovery_warnings) = discover_files(path, &discovery_config)?;
        if found.is_empty() {
            warnings.push(format!("No log files found under '{}'", path.display()));
        }
        files.extend(found);
        warnings.extend(discovery_warnings);
    }

    // -- Analysis --
    let options = AnalyzeOptions::from_config(app_config, format_override);
    let mut report = analyze::analyze_files(&files, &options);
    warnings.append(&mut report.warnings);
    report.warnings = warnings;

    print!(
        "{}",
        render_report(
            &report,
            &ReportOptions {
                alert_filter: alert_filter.clone(),
                entry_filter: show_entries.then(|| entry_filter.clone()),
            }
        )
    );

    // -- Exports --
    if let Some(ref path) = cli.export_entries {
        let selected: Vec<_> = entry_filter
            .apply(&report.entries)
            .into_iter()
            .map(|i| &report.entries[i])
            .collect();
        let count = export::export_entries(&selected, path)?;
        eprintln!("Exported {count} entries to {}", path.display());
    }
    if let Some(ref path) = cli.export_alerts {
        let selected: Vec<_> = alert_filter
            .apply(&report.alerts)
            .into_iter()
            .map(|i| &report.alerts[i])
            .collect();
        let count = export::export_alerts(&selected, path)?;
        eprintln!("Exported {count} alerts to {}", path.display());
    }

    Ok(())
}
