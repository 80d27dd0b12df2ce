// LogWarden - core/level.rs
//
// Level inference: from an HTTP status code or from keywords in free text.

use crate::core::model::Level;

/// Map an HTTP status code to a level.
///
/// 5xx and above are errors, 4xx warnings; everything else (including
/// redirects and out-of-range codes) is informational.
pub fn level_from_status(status: i64) -> Level {
    if status >= 500 {
        Level::Error
    } else if status >= 400 {
        Level::Warning
    } else {
        Level::Info
    }
}

/// Infer a level from keywords in `message`.
///
/// Case-insensitive substring test in priority order: ERROR/FATAL, WARN,
/// INFO, DEBUG. Messages with none of these default to INFO.
pub fn level_from_message(message: &str) -> Level {
    let upper = message.to_uppercase();
    if upper.contains("ERROR") || upper.contains("FATAL") {
        Level::Error
    } else if upper.contains("WARN") {
        Level::Warning
    } else if upper.contains("INFO") {
        Level::Info
    } else if upper.contains("DEBUG") {
        Level::Debug
    } else {
        Level::Info
    }
}
