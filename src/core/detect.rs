// LogWarden - core/detect.rs
//
// Content-based format detection.
// Core layer: pure function of the content, no state and no I/O.

use crate::core::grammar;
use crate::core::model::LogFormat;
use crate::util::constants::FORMAT_DETECTION_LINES;

/// Sniff the line grammar of a file from the start of its content.
///
/// Looks at the first `FORMAT_DETECTION_LINES` lines exactly as split, blank
/// lines included, and returns the first format in `grammar::DETECTION_ORDER`
/// that matches any of them, scanning line by line. Falls back to
/// `LogFormat::Generic`.
///
/// The sniff window counts blank lines while the parser numbers only
/// non-blank ones, so a file that opens with blank lines is detected from
/// fewer real lines than it is parsed with.
pub fn detect_format(content: &str) -> LogFormat {
    for (idx, line) in content.lines().take(FORMAT_DETECTION_LINES).enumerate() {
        for format in grammar::DETECTION_ORDER {
            if grammar::pattern(format).is_match(line) {
                tracing::debug!(format = %format, line = idx + 1, "Format detected");
                return format;
            }
        }
    }
    tracing::debug!("No known format in detection window, using generic");
    LogFormat::Generic
}

#[cfg(test)]
mod tests {
    use super::*;

    const APACHE_LINE: &str = r#"192.168.0.7 - - [10/Oct/2023:13:55:36 +0000] "GET /index.html HTTP/1.1" 200 2326 "-" "Mozilla/5.0""#;

    #[test]
    fn test_detects_apache_combined_line() {
        let content = format!("{APACHE_LINE}\n{APACHE_LINE}\n");
        assert_eq!(detect_format(&content), LogFormat::Apache);
    }

    /// Apache is tried before nginx and its grammar accepts an nginx line's
    /// prefix, so nginx-shaped content still reports apache.
    #[test]
    fn test_apache_wins_over_nginx_for_same_line() {
        assert_eq!(detect_format(APACHE_LINE), LogFormat::Apache);
    }

    #[test]
    fn test_detects_syslog() {
        let content = "Mar  3 09:12:01 gw01 CRON[2231]: (root) CMD (run-parts)\n";
        assert_eq!(detect_format(content), LogFormat::Syslog);
    }

    #[test]
    fn test_detects_json() {
        let content = "{\"level\":\"info\",\"msg\":\"up\"}\n{\"level\":\"warn\"}\n";
        assert_eq!(detect_format(content), LogFormat::Json);
    }

    #[test]
    fn test_empty_content_is_generic() {
        assert_eq!(detect_format(""), LogFormat::Generic);
    }

    #[test]
    fn test_blank_and_unrecognised_lines_are_generic() {
        let content = "\n\nhello world\n   \nstill nothing\n";
        assert_eq!(detect_format(content), LogFormat::Generic);
    }

    /// Common-format lines are never detected; they parse under generic.
    #[test]
    fn test_common_shape_is_not_a_detection_candidate() {
        let content = "2024-01-15 14:30:22 INFO service started\n";
        assert_eq!(detect_format(content), LogFormat::Generic);
    }

    #[test]
    fn test_only_first_five_lines_are_sniffed() {
        let content = format!("a\nb\nc\nd\ne\n{APACHE_LINE}\n");
        assert_eq!(detect_format(&content), LogFormat::Generic);

        let content = format!("\n\n\n\n{APACHE_LINE}\n");
        assert_eq!(detect_format(&content), LogFormat::Apache);
    }

    #[test]
    fn test_first_matching_line_decides() {
        let content = format!("{{\"msg\":\"x\"}}\n{APACHE_LINE}\n");
        assert_eq!(detect_format(&content), LogFormat::Json);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let content = "Jan 15 14:30:22 host app: started\nnoise\n";
        assert_eq!(detect_format(content), detect_format(content));
    }
}
