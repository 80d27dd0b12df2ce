// LogWarden - core/parser.rs
//
// Line-oriented log parsing, one extraction routine per grammar.
// Core layer: accepts content strings, never touches the filesystem.
//
// A line whose extraction fails is dropped on its own; the rest of the file
// is parsed normally. Nothing in this module can abort a whole file.

use crate::core::grammar;
use crate::core::level::{level_from_message, level_from_status};
use crate::core::model::{FieldValue, LogFormat, LogLine, ParsedEntry};
use crate::util::error::ParseError;
use crate::util::logging::preview;
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::num::IntErrorKind;

/// Configuration for parsing operations.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Per-line errors kept in `ParseResult::errors`. Further failing lines
    /// are still dropped and counted, just not recorded individually.
    pub max_parse_errors_per_file: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        use crate::util::constants;
        Self {
            max_parse_errors_per_file: constants::MAX_PARSE_ERRORS_PER_FILE,
        }
    }
}

/// Result of parsing one file's content.
#[derive(Debug)]
pub struct ParseResult {
    /// Successfully parsed entries, in line order.
    pub entries: Vec<ParsedEntry>,
    /// Per-line errors (capped at `max_parse_errors_per_file`).
    pub errors: Vec<ParseError>,
    /// Non-blank lines seen.
    pub lines_processed: u64,
    /// Lines dropped because extraction failed (including unrecorded ones).
    pub dropped_lines: u64,
}

/// Iterate over the non-blank lines of `content`, numbered from 1.
///
/// Blank (whitespace-only) lines are removed before numbering, so the number
/// is the line's position in the blank-free sequence, not in the raw file.
pub fn numbered_lines(content: &str) -> impl Iterator<Item = LogLine<'_>> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .zip(1u64..)
        .map(|(text, line_number)| LogLine { line_number, text })
}

/// Parse every non-blank line of `content` with `format`.
///
/// # Arguments
/// * `content` - Full file content (the app layer handles reading)
/// * `file_id` - Opaque file identifier, used to build entry identities
/// * `format` - Grammar applied uniformly to every line
/// * `config` - Parsing limits
pub fn parse_content(
    content: &str,
    file_id: &str,
    format: LogFormat,
    config: &ParseConfig,
) -> ParseResult {
    tracing::debug!(file = file_id, format = %format, "Parsing started");
    collect_lines(content, file_id, config, |text, line_number| {
        parse_line(text, line_number, file_id, format)
    })
}

/// Run `parse` over every numbered line, keeping successes and dropping
/// failures. Errors past the configured cap are counted but not kept.
fn collect_lines<F>(
    content: &str,
    file_id: &str,
    config: &ParseConfig,
    mut parse: F,
) -> ParseResult
where
    F: FnMut(&str, u64) -> Result<ParsedEntry, ParseError>,
{
    let mut entries = Vec::new();
    let mut errors = Vec::new();
    let mut lines_processed: u64 = 0;
    let mut dropped_lines: u64 = 0;

    for line in numbered_lines(content) {
        lines_processed += 1;
        match parse(line.text, line.line_number) {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                dropped_lines += 1;
                tracing::debug!(
                    error = %err,
                    line = preview(line.text),
                    "Dropping unparsable line"
                );
                if errors.len() < config.max_parse_errors_per_file {
                    errors.push(err);
                }
            }
        }
    }

    tracing::debug!(
        file = file_id,
        entries = entries.len(),
        dropped = dropped_lines,
        lines = lines_processed,
        "Parsing complete"
    );

    ParseResult {
        entries,
        errors,
        lines_processed,
        dropped_lines,
    }
}

/// Parse one raw line into an entry using `format`'s grammar.
///
/// A line the grammar does not recognise still produces an entry holding the
/// raw line as its message. `Err` is reserved for lines the grammar matched
/// but whose fields could not be extracted; callers drop such lines.
pub fn parse_line(
    line: &str,
    line_number: u64,
    file_id: &str,
    format: LogFormat,
) -> Result<ParsedEntry, ParseError> {
    let mut entry = ParsedEntry::from_raw(line, line_number, file_id);

    let extracted = match format {
        LogFormat::Apache => parse_apache(line, &mut entry),
        LogFormat::Nginx => parse_nginx(line, &mut entry),
        LogFormat::Syslog => {
            parse_syslog(line, &mut entry);
            Ok(())
        }
        LogFormat::Json => {
            parse_json(line, &mut entry);
            Ok(())
        }
        LogFormat::Common | LogFormat::Generic => {
            parse_common(line, &mut entry);
            Ok(())
        }
    };

    extracted.map_err(|reason| ParseError::LineParse {
        file_id: file_id.to_string(),
        line_number,
        reason,
    })?;

    Ok(entry)
}

// =============================================================================
// Grammar extractors
// =============================================================================

fn parse_apache(line: &str, entry: &mut ParsedEntry) -> Result<(), String> {
    let Some(caps) = grammar::pattern(LogFormat::Apache).captures(line) else {
        return Ok(());
    };

    let status = parse_int("status code", &caps[4])?;
    let size = match &caps[5] {
        "-" => 0,
        raw => parse_int("response size", raw)?,
    };

    entry.source = Some(caps[1].to_string());
    entry.timestamp = parse_timestamp(&caps[2]);
    entry.fields = [
        ("request".to_string(), FieldValue::from(&caps[3])),
        ("status".to_string(), FieldValue::Integer(status)),
        ("size".to_string(), FieldValue::Integer(size)),
    ]
    .into_iter()
    .collect();
    entry.level = Some(level_from_status(status).as_str().to_string());
    Ok(())
}

fn parse_nginx(line: &str, entry: &mut ParsedEntry) -> Result<(), String> {
    let Some(caps) = grammar::pattern(LogFormat::Nginx).captures(line) else {
        return Ok(());
    };

    let status = parse_int("status code", &caps[4])?;
    let size = parse_int("response size", &caps[5])?;

    entry.source = Some(caps[1].to_string());
    entry.timestamp = parse_timestamp(&caps[2]);
    entry.fields = [
        ("request".to_string(), FieldValue::from(&caps[3])),
        ("status".to_string(), FieldValue::Integer(status)),
        ("size".to_string(), FieldValue::Integer(size)),
        ("referer".to_string(), FieldValue::from(&caps[6])),
        ("userAgent".to_string(), FieldValue::from(&caps[7])),
    ]
    .into_iter()
    .collect();
    entry.level = Some(level_from_status(status).as_str().to_string());
    Ok(())
}

fn parse_syslog(line: &str, entry: &mut ParsedEntry) {
    let Some(caps) = grammar::pattern(LogFormat::Syslog).captures(line) else {
        return;
    };

    let message = &caps[4];
    entry.timestamp = parse_timestamp(&caps[1]);
    entry.source = Some(caps[2].to_string());
    entry
        .fields
        .insert("process".to_string(), FieldValue::from(&caps[3]));
    if !message.is_empty() {
        entry.message = message.to_string();
    }
    entry.level = Some(level_from_message(message).as_str().to_string());
}

/// Decode a JSON object line. Anything that is not a JSON object keeps the
/// raw-line defaults; malformed JSON is not an error.
fn parse_json(line: &str, entry: &mut ParsedEntry) {
    let object = match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            tracing::trace!(line = preview(line), "JSON line is not an object");
            return;
        }
        Err(e) => {
            tracing::trace!(error = %e, line = preview(line), "Malformed JSON line");
            return;
        }
    };

    entry.timestamp = first_truthy(&object, &["timestamp"]).and_then(json_timestamp);
    entry.level = first_truthy(&object, &["level", "severity"]).map(value_text);
    entry.source = first_truthy(&object, &["source", "host"]).map(value_text);
    if let Some(message) = first_truthy(&object, &["message", "msg"]) {
        entry.message = value_text(message);
    }
    entry.fields = object
        .into_iter()
        .map(|(key, value)| (key, FieldValue::from(value)))
        .collect();
}

/// `timestamp LEVEL message`, else keyword inference over the whole line.
fn parse_common(line: &str, entry: &mut ParsedEntry) {
    match grammar::pattern(LogFormat::Common).captures(line) {
        Some(caps) => {
            entry.timestamp = parse_timestamp(&caps[1]);
            entry.level = Some(caps[2].to_string());
            if !caps[3].is_empty() {
                entry.message = caps[3].to_string();
            }
        }
        None => {
            entry.level = Some(level_from_message(line).as_str().to_string());
        }
    }
}

/// Digit runs too long for `i64` saturate to `i64::MAX`; the line is kept.
fn parse_int(what: &str, raw: &str) -> Result<i64, String> {
    match raw.parse::<i64>() {
        Ok(value) => Ok(value),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(i64::MAX),
        Err(e) => Err(format!("{what} '{raw}' is not a valid integer: {e}")),
    }
}

// =============================================================================
// JSON helpers
// =============================================================================

/// First value among `keys` that is present and not "empty" (null, false,
/// zero, empty string). Later keys are fallbacks for earlier ones.
fn first_truthy<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| is_truthy(value))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a JSON value: strings verbatim, everything else as JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strings go through the usual timestamp strategies; numbers are epoch
/// milliseconds.
fn json_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

// =============================================================================
// Timestamp parsing
// =============================================================================

/// Parse a raw timestamp captured by one of the grammars.
///
/// Strategy, first success wins:
///   1. RFC 3339 / ISO 8601 with offset (`+0530` normalised to `+05:30`,
///      space separator accepted).
///   2. ISO 8601 without offset, optional fractional seconds, read as UTC.
///   3. Apache `10/Oct/2023:13:55:36 +0000`, with or without the offset.
///   4. Year-less BSD syslog `Jan  5 14:30:22`, with the current UTC year
///      injected. Files spanning a year boundary get the wrong year for the
///      older entries.
///
/// Returns `None` when nothing fits; a bad timestamp never fails a line.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let iso = normalise_iso(trimmed);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&iso) {
        return Some(dt.into());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(&iso, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }

    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%d/%b/%Y:%H:%M:%S %z") {
        return Some(dt.into());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, "%d/%b/%Y:%H:%M:%S") {
        return Some(ndt.and_utc());
    }

    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    let with_year = format!("{} {collapsed}", Utc::now().year());
    if let Ok(ndt) = NaiveDateTime::parse_from_str(&with_year, "%Y %b %d %H:%M:%S") {
        return Some(ndt.and_utc());
    }

    tracing::trace!(raw = trimmed, "Unrecognised timestamp");
    None
}

/// Put an ISO-like timestamp into RFC 3339 shape: `T` date/time separator and
/// a colon in a trailing `±HHMM` offset.
fn normalise_iso(s: &str) -> String {
    let mut out = s.to_string();
    if out.as_bytes().get(10) == Some(&b' ') {
        out.replace_range(10..11, "T");
    }
    let len = out.len();
    let numeric_offset = len > 19
        && out.get(len - 5..).is_some_and(|tail| {
            let bytes = tail.as_bytes();
            matches!(bytes[0], b'+' | b'-') && bytes[1..].iter().all(u8::is_ascii_digit)
        });
    if numeric_offset {
        out.insert(len - 2, ':');
    }
    out
}
