// LogWarden - app/analyze.rs
//
// Analysis orchestration: read → detect → parse → threat scan, per file.
//
// Files are independent batches: brute-force counting never crosses a file
// boundary. They are analysed in parallel with rayon and results come back
// in input order. A file that cannot be read is recorded with status error
// and a warning; the batch always completes.

use crate::core::analysis::analyze_for_threats;
use crate::core::detect::detect_format;
use crate::core::discovery::{DiscoveredFile, DiscoveryConfig};
use crate::core::model::{FileStatus, LogFile, LogFormat, ParsedEntry, SecurityAlert};
use crate::core::parser::{self, ParseConfig};
use crate::core::summary::{summarize, AnalysisSummary};
use crate::platform::config::AppConfig;
use crate::platform::fs::read_file_content;
use crate::util::error::ParseError;
use chrono::Utc;
use rayon::prelude::*;

/// Per-run analysis settings.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Grammar to force on every file instead of detecting it.
    pub format_override: Option<LogFormat>,

    pub parse: ParseConfig,

    /// Dedicated pool size; 0 uses the global rayon pool.
    pub worker_threads: usize,
}

impl AnalyzeOptions {
    pub fn from_config(config: &AppConfig, format_override: Option<LogFormat>) -> Self {
        Self {
            format_override,
            parse: ParseConfig {
                max_parse_errors_per_file: config.max_parse_errors_per_file,
            },
            worker_threads: config.worker_threads,
        }
    }
}

/// Discovery settings taken from the validated config.
pub fn discovery_config(config: &AppConfig) -> DiscoveryConfig {
    DiscoveryConfig {
        max_depth: config.max_depth,
        max_files: config.max_files,
        include_patterns: config.include_patterns.clone(),
        exclude_patterns: config.exclude_patterns.clone(),
        large_file_threshold: config.large_file_threshold,
    }
}

/// Everything produced for one file.
#[derive(Debug)]
pub struct FileAnalysis {
    pub file: LogFile,
    pub entries: Vec<ParsedEntry>,
    pub alerts: Vec<SecurityAlert>,
    /// Recorded per-line failures (capped).
    pub parse_errors: Vec<ParseError>,
    /// Lines dropped because extraction failed.
    pub dropped_lines: u64,
}

/// Per-file counters kept after entries and alerts are merged into the
/// report-wide lists.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file: LogFile,
    pub entry_count: usize,
    pub alert_count: usize,
    pub dropped_lines: u64,
    pub parse_errors: Vec<ParseError>,
}

/// Merged result of a multi-file run, files in input order.
#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub files: Vec<FileOutcome>,
    pub entries: Vec<ParsedEntry>,
    pub alerts: Vec<SecurityAlert>,
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    pub fn summary(&self) -> AnalysisSummary {
        summarize(
            self.files.iter().map(|o| &o.file),
            &self.entries,
            &self.alerts,
        )
    }

    /// Append one file's results.
    pub fn push(&mut self, analysis: FileAnalysis) {
        self.files.push(FileOutcome {
            entry_count: analysis.entries.len(),
            alert_count: analysis.alerts.len(),
            dropped_lines: analysis.dropped_lines,
            parse_errors: analysis.parse_errors,
            file: analysis.file,
        });
        self.entries.extend(analysis.entries);
        self.alerts.extend(analysis.alerts);
    }
}

/// Analyse one file's content already in memory.
///
/// # Arguments
/// * `file_id` - Opaque identifier; prefix of every entry id
/// * `name` - Display name for the file record
/// * `content` - Complete file content
/// * `size` - Size in bytes for the file record
pub fn analyze_content(
    file_id: &str,
    name: &str,
    content: &str,
    size: u64,
    options: &AnalyzeOptions,
) -> FileAnalysis {
    let analysed_at = Utc::now();
    let format = options
        .format_override
        .unwrap_or_else(|| detect_format(content));

    let parsed = parser::parse_content(content, file_id, format, &options.parse);
    let alerts = analyze_for_threats(&parsed.entries);

    tracing::debug!(
        file = file_id,
        format = %format,
        entries = parsed.entries.len(),
        alerts = alerts.len(),
        "File analysed"
    );

    FileAnalysis {
        file: LogFile {
            id: file_id.to_string(),
            name: name.to_string(),
            path: None,
            size,
            format,
            analysed_at,
            line_count: parsed.lines_processed as usize,
            status: FileStatus::Parsed,
        },
        entries: parsed.entries,
        alerts,
        parse_errors: parsed.errors,
        dropped_lines: parsed.dropped_lines,
    }
}

/// Read and analyse a discovered file. Read failures give an error-status
/// record and a warning instead of an `Err`.
fn analyze_file(file: &DiscoveredFile, options: &AnalyzeOptions) -> (FileAnalysis, Option<String>) {
    let file_id = file.path.display().to_string();
    let name = file
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_id.clone());

    match read_file_content(&file.path, file.is_large) {
        Ok(content) => {
            let mut analysis = analyze_content(&file_id, &name, &content, file.size, options);
            analysis.file.path = Some(file.path.clone());
            (analysis, None)
        }
        Err(e) => {
            let msg = format!("Cannot read '{}': {e}", file.path.display());
            tracing::warn!(warning = %msg, "File read failed");
            let analysis = FileAnalysis {
                file: LogFile {
                    id: file_id,
                    name,
                    path: Some(file.path.clone()),
                    size: file.size,
                    format: options.format_override.unwrap_or(LogFormat::Generic),
                    analysed_at: Utc::now(),
                    line_count: 0,
                    status: FileStatus::Error,
                },
                entries: Vec::new(),
                alerts: Vec::new(),
                parse_errors: Vec::new(),
                dropped_lines: 0,
            };
            (analysis, Some(msg))
        }
    }
}

/// Analyse every file in parallel and merge the results in input order.
pub fn analyze_files(files: &[DiscoveredFile], options: &AnalyzeOptions) -> AnalysisReport {
    tracing::info!(files = files.len(), "Analysis started");

    let run = || -> Vec<(FileAnalysis, Option<String>)> {
        files
            .par_iter()
            .map(|file| analyze_file(file, options))
            .collect()
    };

    let results = if options.worker_threads > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.worker_threads)
            .thread_name(|i| format!("logwarden-worker-{i}"))
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot build worker pool, using global pool");
                run()
            }
        }
    } else {
        run()
    };

    let mut report = AnalysisReport::default();
    for (analysis, warning) in results {
        report.warnings.extend(warning);
        report.push(analysis);
    }

    tracing::info!(
        files = report.files.len(),
        entries = report.entries.len(),
        alerts = report.alerts.len(),
        warnings = report.warnings.len(),
        "Analysis complete"
    );
    report
}
