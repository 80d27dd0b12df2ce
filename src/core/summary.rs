// LogWarden - core/summary.rs
//
// Aggregate statistics over an analysed batch: the dashboard numbers.

use crate::core::model::{AlertSeverity, LogFile, LogFormat, ParsedEntry, SecurityAlert};
use serde::Serialize;
use std::collections::BTreeMap;

/// Totals across every analysed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub file_count: usize,
    pub total_bytes: u64,
    pub entry_count: usize,
    /// Entries labelled ERROR or FATAL (any case).
    pub error_count: usize,
    /// Entries labelled WARNING or WARN (any case).
    pub warning_count: usize,
    pub alert_count: usize,
    pub files_per_format: BTreeMap<LogFormat, usize>,
    pub alerts_per_severity: BTreeMap<AlertSeverity, usize>,
}

pub fn summarize<'a>(
    files: impl IntoIterator<Item = &'a LogFile>,
    entries: &[ParsedEntry],
    alerts: &[SecurityAlert],
) -> AnalysisSummary {
    let mut summary = AnalysisSummary {
        entry_count: entries.len(),
        alert_count: alerts.len(),
        ..Default::default()
    };

    for file in files {
        summary.file_count += 1;
        summary.total_bytes += file.size;
        *summary.files_per_format.entry(file.format).or_insert(0) += 1;
    }

    for entry in entries {
        let Some(level) = entry.level.as_deref() else {
            continue;
        };
        if level.eq_ignore_ascii_case("ERROR") || level.eq_ignore_ascii_case("FATAL") {
            summary.error_count += 1;
        } else if level.eq_ignore_ascii_case("WARNING") || level.eq_ignore_ascii_case("WARN") {
            summary.warning_count += 1;
        }
    }

    for alert in alerts {
        *summary.alerts_per_severity.entry(alert.severity).or_insert(0) += 1;
    }

    summary
}

/// Alerts grouped by severity, most severe first. Empty groups are omitted;
/// alerts keep their relative order within a group.
pub fn group_alerts_by_severity(
    alerts: &[SecurityAlert],
) -> Vec<(AlertSeverity, Vec<&SecurityAlert>)> {
    AlertSeverity::all()
        .iter()
        .map(|severity| {
            let group: Vec<_> = alerts.iter().filter(|a| a.severity == *severity).collect();
            (*severity, group)
        })
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

/// Human-readable size: `"0 Bytes"`, `"512 Bytes"`, `"1.5 KB"`, `"2 MB"`.
///
/// Base 1024, at most two decimals with trailing zeros dropped, largest unit GB.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[unit])
}
