// LogWarden - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::error::ParseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// =============================================================================
// Log format
// =============================================================================

/// Line grammar assigned to an entire file. Chosen once per file (detected or
/// overridden by the caller) and applied uniformly to every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Apache,
    Nginx,
    Syslog,
    Json,
    Common,
    Generic,
}

impl LogFormat {
    /// Returns all variants in declaration order.
    pub fn all() -> &'static [LogFormat] {
        &[
            LogFormat::Apache,
            LogFormat::Nginx,
            LogFormat::Syslog,
            LogFormat::Json,
            LogFormat::Common,
            LogFormat::Generic,
        ]
    }

    /// Lowercase label, as used on the command line and in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Apache => "apache",
            LogFormat::Nginx => "nginx",
            LogFormat::Syslog => "syslog",
            LogFormat::Json => "json",
            LogFormat::Common => "common",
            LogFormat::Generic => "generic",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        LogFormat::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| ParseError::UnknownFormat {
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Log line
// =============================================================================

/// One non-blank line of a file together with its 1-based position after
/// blank lines have been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub line_number: u64,
    pub text: &'a str,
}

// =============================================================================
// Parsed fields
// =============================================================================

/// Structured value extracted from a log line.
///
/// Serialises as plain JSON (no variant tags) so exported fields look exactly
/// like the JSON object they were decoded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<FieldValue>),
    Map(Fields),
}

/// Parsed-fields mapping carried by every entry.
pub type Fields = BTreeMap<String, FieldValue>;

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null),
            },
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from).collect())
            }
            Value::Object(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// Parsed entry (normalised output of parsing)
// =============================================================================

/// A single parsed log line.
///
/// Created once by the parser and never mutated afterwards; detection only
/// reads entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEntry {
    /// Deterministic identity: `"{file_id}-{line_number}"`.
    pub id: String,

    /// Opaque identifier of the file this entry came from.
    pub file_id: String,

    /// 1-based position among the file's non-blank lines.
    pub line_number: u64,

    /// Parsed timestamp in UTC, when the line carried one we could read.
    pub timestamp: Option<DateTime<Utc>>,

    /// Level label, either inferred (ERROR/WARNING/INFO/DEBUG) or taken
    /// verbatim from the line.
    pub level: Option<String>,

    /// Host, client address, or other origin of the line.
    pub source: Option<String>,

    /// Message text. Never empty: falls back to the raw line.
    pub message: String,

    /// Format-specific structured fields.
    pub fields: Fields,
}

impl ParsedEntry {
    /// Build the deterministic entry identity for a file/line pair.
    pub fn make_id(file_id: &str, line_number: u64) -> String {
        format!("{file_id}-{line_number}")
    }

    /// An entry holding only the raw line. Grammar extractors overwrite
    /// whichever parts they manage to recover.
    pub fn from_raw(line: &str, line_number: u64, file_id: &str) -> Self {
        Self {
            id: Self::make_id(file_id, line_number),
            file_id: file_id.to_string(),
            line_number,
            timestamp: None,
            level: None,
            source: None,
            message: line.to_string(),
            fields: Fields::new(),
        }
    }
}

// =============================================================================
// Level
// =============================================================================

/// Level labels produced by inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Error,
    Warning,
    Info,
    Debug,
}

impl Level {
    /// Uppercase label stored on entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Security alerts
// =============================================================================

/// Alert priority. `Ord` follows urgency: `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// All variants, most severe first (report order).
    pub fn all() -> &'static [AlertSeverity] {
        &[
            AlertSeverity::Critical,
            AlertSeverity::High,
            AlertSeverity::Medium,
            AlertSeverity::Low,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }

    /// Parse a severity name. Case-insensitive.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of threat an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    SqlInjection,
    Xss,
    BruteForce,
    PathTraversal,
    CommandInjection,
    /// Repeated authentication failures from one source within a batch.
    BruteForceAttack,
}

impl AlertType {
    /// Snake-case tag used in alert identities and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::SqlInjection => "sql_injection",
            AlertType::Xss => "xss",
            AlertType::BruteForce => "brute_force",
            AlertType::PathTraversal => "path_traversal",
            AlertType::CommandInjection => "command_injection",
            AlertType::BruteForceAttack => "brute_force_attack",
        }
    }

    pub fn all() -> &'static [AlertType] {
        &[
            AlertType::SqlInjection,
            AlertType::Xss,
            AlertType::BruteForce,
            AlertType::PathTraversal,
            AlertType::CommandInjection,
            AlertType::BruteForceAttack,
        ]
    }

    /// Parse an alert-type tag. Case-insensitive; `-` is accepted for `_`.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let tag = s.trim().to_lowercase().replace('-', "_");
        Self::all().iter().copied().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A security finding produced by the detection pass over one entry batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub id: String,

    /// Entry that triggered the alert.
    pub entry_id: Option<String>,

    pub alert_type: AlertType,

    pub severity: AlertSeverity,

    pub description: String,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Log file record
// =============================================================================

/// Processing state of an analysed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploaded,
    Parsing,
    Parsed,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Uploaded => "uploaded",
            FileStatus::Parsing => "parsing",
            FileStatus::Parsed => "parsed",
            FileStatus::Error => "error",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about one analysed file.
#[derive(Debug, Clone, Serialize)]
pub struct LogFile {
    /// Opaque identifier; prefix of every entry id from this file.
    pub id: String,

    /// Display name (file name, or the label given for in-memory content).
    pub name: String,

    /// Source path, when the content came from disk.
    pub path: Option<PathBuf>,

    /// Content size in bytes.
    pub size: u64,

    /// Grammar used to parse the file.
    pub format: LogFormat,

    /// When analysis of this file started.
    pub analysed_at: DateTime<Utc>,

    /// Number of non-blank lines.
    pub line_count: usize,

    pub status: FileStatus,
}
