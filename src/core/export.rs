// LogWarden - core/export.rs
//
// CSV, JSON and JSON-lines export of entries and alerts.
// Writers are generic over `Write`; the output path is only used for
// format selection and error context.

use crate::core::model::{ParsedEntry, SecurityAlert};
use crate::util::constants::{EXPORT_BATCH_SIZE, MAX_EXPORT_ENTRIES};
use crate::util::error::ExportError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output encoding, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    JsonLines,
}

impl ExportFormat {
    /// `.csv`, `.json` or `.jsonl`/`.ndjson` (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            Some("jsonl") | Some("ndjson") => Ok(Self::JsonLines),
            _ => Err(ExportError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

fn check_count(count: usize) -> Result<(), ExportError> {
    if count > MAX_EXPORT_ENTRIES {
        return Err(ExportError::TooManyEntries {
            count,
            max: MAX_EXPORT_ENTRIES,
        });
    }
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| ExportError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

// =============================================================================
// Entries
// =============================================================================

/// Write `entries` to `path` in the format its extension names.
/// Returns the number of records written.
pub fn export_entries(entries: &[&ParsedEntry], path: &Path) -> Result<usize, ExportError> {
    let format = ExportFormat::from_path(path)?;
    check_count(entries.len())?;
    let writer = create(path)?;

    let count = match format {
        ExportFormat::Csv => export_entries_csv(entries, writer, path)?,
        ExportFormat::Json => export_json(entries, writer, path)?,
        ExportFormat::JsonLines => export_entries_jsonl(entries, writer, path)?,
    };
    tracing::info!(path = %path.display(), records = count, ?format, "Entries exported");
    Ok(count)
}

/// Columns: id, file_id, line, timestamp, level, source, message, fields.
/// `fields` holds the parsed-fields map as compact JSON.
pub fn export_entries_csv<W: Write>(
    entries: &[&ParsedEntry],
    writer: W,
    path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "id",
            "file_id",
            "line",
            "timestamp",
            "level",
            "source",
            "message",
            "fields",
        ])
        .map_err(csv_err)?;

    for entry in entries {
        let ts = entry.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default();
        let fields = serde_json::to_string(&entry.fields).map_err(|e| ExportError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        let line = entry.line_number.to_string();
        csv_writer
            .write_record([
                entry.id.as_str(),
                entry.file_id.as_str(),
                line.as_str(),
                ts.as_str(),
                entry.level.as_deref().unwrap_or(""),
                entry.source.as_deref().unwrap_or(""),
                entry.message.as_str(),
                fields.as_str(),
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(entries.len())
}

/// One JSON object per line, flushed every `EXPORT_BATCH_SIZE` records.
pub fn export_entries_jsonl<W: Write>(
    entries: &[&ParsedEntry],
    mut writer: W,
    path: &Path,
) -> Result<usize, ExportError> {
    let io_err = |e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    for (batch_no, batch) in entries.chunks(EXPORT_BATCH_SIZE).enumerate() {
        for entry in batch {
            serde_json::to_writer(&mut writer, entry).map_err(|e| ExportError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;
            writer.write_all(b"\n").map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;
        tracing::trace!(batch = batch_no, records = batch.len(), "Export batch flushed");
    }

    Ok(entries.len())
}

// =============================================================================
// Alerts
// =============================================================================

/// Write `alerts` to `path` as CSV or a JSON array.
pub fn export_alerts(alerts: &[&SecurityAlert], path: &Path) -> Result<usize, ExportError> {
    let format = ExportFormat::from_path(path)?;
    if format == ExportFormat::JsonLines {
        return Err(ExportError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }
    check_count(alerts.len())?;
    let writer = create(path)?;

    let count = match format {
        ExportFormat::Csv => export_alerts_csv(alerts, writer, path)?,
        _ => export_json(alerts, writer, path)?,
    };
    tracing::info!(path = %path.display(), records = count, ?format, "Alerts exported");
    Ok(count)
}

/// Columns: id, entry_id, type, severity, description, created_at.
pub fn export_alerts_csv<W: Write>(
    alerts: &[&SecurityAlert],
    writer: W,
    path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["id", "entry_id", "type", "severity", "description", "created_at"])
        .map_err(csv_err)?;

    for alert in alerts {
        let created_at = alert.created_at.to_rfc3339();
        csv_writer
            .write_record([
                alert.id.as_str(),
                alert.entry_id.as_deref().unwrap_or(""),
                alert.alert_type.as_str(),
                alert.severity.as_str(),
                alert.description.as_str(),
                created_at.as_str(),
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(alerts.len())
}

/// Pretty-printed JSON array.
pub fn export_json<T: serde::Serialize, W: Write>(
    records: &[T],
    mut writer: W,
    path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| ExportError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{AlertSeverity, AlertType, FieldValue};
    use chrono::Utc;
    use std::path::PathBuf;

    fn make_entry(n: u64, message: &str) -> ParsedEntry {
        let mut e = ParsedEntry::from_raw(message, n, "test.log");
        e.level = Some("ERROR".to_string());
        e.fields.insert("status".to_string(), FieldValue::Integer(500));
        e
    }

    fn make_alert() -> SecurityAlert {
        SecurityAlert {
            id: "alert-test.log-1-xss".to_string(),
            entry_id: Some("test.log-1".to_string()),
            alert_type: AlertType::Xss,
            severity: AlertSeverity::High,
            description: "Potential xss detected: <script>".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a.CSV")).unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("a.json")).unwrap(), ExportFormat::Json);
        assert_eq!(
            ExportFormat::from_path(Path::new("a.jsonl")).unwrap(),
            ExportFormat::JsonLines
        );
        assert!(matches!(
            ExportFormat::from_path(Path::new("a.xlsx")),
            Err(ExportError::UnsupportedFormat { .. })
        ));
        assert!(ExportFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_entries_csv() {
        let a = make_entry(1, "Error, with comma");
        let b = make_entry(2, "Error two");
        let mut buf = Vec::new();
        let count = export_entries_csv(&[&a, &b], &mut buf, &PathBuf::from("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("id,file_id,line,timestamp,level,source,message,fields"));
        assert!(output.contains("\"Error, with comma\""));
        assert!(output.contains("test.log-2"));
        assert!(output.contains(r#""{""status"":500}""#));
    }

    #[test]
    fn test_entries_jsonl_one_object_per_line() {
        let entries: Vec<_> = (1..=3).map(|n| make_entry(n, "m")).collect();
        let refs: Vec<&ParsedEntry> = entries.iter().collect();
        let mut buf = Vec::new();
        export_entries_jsonl(&refs, &mut buf, Path::new("out.jsonl")).unwrap();

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        let back: ParsedEntry = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(back.id, "test.log-3");
        assert_eq!(back.fields["status"], FieldValue::Integer(500));
    }

    #[test]
    fn test_entries_json_array() {
        let e = make_entry(1, "Test message");
        let mut buf = Vec::new();
        let count = export_json(&[&e], &mut buf, Path::new("out.json")).unwrap();
        assert_eq!(count, 1);
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["message"], "Test message");
        assert_eq!(value[0]["timestamp"], serde_json::Value::Null);
    }

    #[test]
    fn test_alerts_csv() {
        let alert = make_alert();
        let mut buf = Vec::new();
        export_alerts_csv(&[&alert], &mut buf, Path::new("alerts.csv")).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("id,entry_id,type,severity,description,created_at"));
        assert!(output.contains("alert-test.log-1-xss,test.log-1,xss,high,"));
    }

    #[test]
    fn test_export_to_disk_and_reject_jsonl_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let alert = make_alert();

        let path = dir.path().join("alerts.json");
        assert_eq!(export_alerts(&[&alert], &path).unwrap(), 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"alert_type\": \"xss\""));

        let path = dir.path().join("alerts.jsonl");
        assert!(matches!(
            export_alerts(&[&alert], &path),
            Err(ExportError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_export_entries_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let e = make_entry(1, "disk");
        let path = dir.path().join("entries.csv");
        assert_eq!(export_entries(&[&e], &path).unwrap(), 1);
        assert!(std::fs::read_to_string(&path).unwrap().contains("disk"));
    }
}
