// LogWarden - app/report.rs
//
// Plain-text rendering of an analysis run for stdout.

use crate::app::analyze::AnalysisReport;
use crate::core::filter::{distinct_levels, AlertFilter, EntryFilter};
use crate::core::summary::{format_bytes, group_alerts_by_severity};
use std::fmt::Write;

/// What the report should include beyond the summary and file table.
#[derive(Debug, Default)]
pub struct ReportOptions {
    pub alert_filter: AlertFilter,
    /// When set, matching entries are listed after the alerts.
    pub entry_filter: Option<EntryFilter>,
}

/// Render `report` as text.
pub fn render_report(report: &AnalysisReport, options: &ReportOptions) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, report, options);
    out
}

fn write_report(
    out: &mut String,
    report: &AnalysisReport,
    options: &ReportOptions,
) -> std::fmt::Result {
    let summary = report.summary();

    writeln!(out, "== Summary ==")?;
    writeln!(
        out,
        "Files: {}  Size: {}  Entries: {}  Errors: {}  Warnings: {}  Alerts: {}",
        summary.file_count,
        format_bytes(summary.total_bytes),
        summary.entry_count,
        summary.error_count,
        summary.warning_count,
        summary.alert_count
    )?;
    if !summary.alerts_per_severity.is_empty() {
        let parts: Vec<String> = summary
            .alerts_per_severity
            .iter()
            .rev()
            .map(|(severity, count)| format!("{severity}: {count}"))
            .collect();
        writeln!(out, "Alerts by severity: {}", parts.join(", "))?;
    }
    let levels = distinct_levels(&report.entries);
    if !levels.is_empty() {
        writeln!(out, "Levels: {}", levels.join(", "))?;
    }

    writeln!(out)?;
    writeln!(out, "== Files ==")?;
    for outcome in &report.files {
        let file = &outcome.file;
        write!(
            out,
            "{:<40} {:<8} {:>10} {:>8} lines {:>6} alerts  [{}]",
            file.name,
            file.format.as_str(),
            format_bytes(file.size),
            file.line_count,
            outcome.alert_count,
            file.status
        )?;
        if outcome.dropped_lines > 0 {
            write!(out, "  {} unparsable", outcome.dropped_lines)?;
        }
        writeln!(out)?;
    }

    let alerts: Vec<_> = options
        .alert_filter
        .apply(&report.alerts)
        .into_iter()
        .map(|i| report.alerts[i].clone())
        .collect();
    writeln!(out)?;
    writeln!(out, "== Alerts ({}) ==", alerts.len())?;
    for (severity, group) in group_alerts_by_severity(&alerts) {
        writeln!(out, "[{}] {}", severity.as_str().to_uppercase(), group.len())?;
        for alert in group {
            writeln!(
                out,
                "  {:<20} {}  ({})",
                alert.alert_type.as_str(),
                alert.description,
                alert.entry_id.as_deref().unwrap_or("-")
            )?;
        }
    }

    if let Some(ref filter) = options.entry_filter {
        let matching = filter.apply(&report.entries);
        writeln!(out)?;
        writeln!(out, "== Entries ({}) ==", matching.len())?;
        for idx in matching {
            let entry = &report.entries[idx];
            let ts = entry
                .timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                out,
                "{:<24} {} {:<7} {}",
                entry.id,
                ts,
                entry.level.as_deref().unwrap_or("-"),
                entry.message
            )?;
        }
    }

    if !report.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "== Warnings ==")?;
        for warning in &report.warnings {
            writeln!(out, "  {warning}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::analyze::{analyze_content, AnalyzeOptions};
    use crate::core::model::AlertSeverity;

    fn report_for(content: &str) -> AnalysisReport {
        let size = content.len() as u64;
        let analysis = analyze_content("web.log", "web.log", content, size, &AnalyzeOptions::default());
        let mut report = AnalysisReport::default();
        report.push(analysis);
        report
    }

    #[test]
    fn test_report_lists_summary_files_and_alerts() {
        let report = report_for("GET /../../etc/passwd\nall good\n");
        let text = render_report(&report, &ReportOptions::default());

        assert!(text.contains("Files: 1"));
        assert!(text.contains("Entries: 2"));
        assert!(text.contains("Levels: INFO"));
        assert!(text.contains("web.log"));
        assert!(text.contains("== Alerts (1) =="));
        assert!(text.contains("[HIGH] 1"));
        assert!(text.contains("path_traversal"));
        assert!(!text.contains("== Entries"), "entries are opt-in");
    }

    #[test]
    fn test_report_applies_filters() {
        let report = report_for("GET /../../etc/passwd\nERROR disk full\n");
        let options = ReportOptions {
            alert_filter: AlertFilter {
                min_severity: Some(AlertSeverity::Critical),
                ..Default::default()
            },
            entry_filter: Some(EntryFilter {
                level: Some("ERROR".to_string()),
                ..Default::default()
            }),
        };
        let text = render_report(&report, &options);
        assert!(text.contains("== Alerts (0) =="));
        assert!(text.contains("== Entries (1) =="));
        assert!(text.contains("web.log-2"));
        assert!(!text.contains("web.log-1 "));
    }
}
