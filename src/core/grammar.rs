// LogWarden - core/grammar.rs
//
// Line grammars for every supported log format, compiled once per process.
// Shared by format detection (match/no-match) and the line parser (captures).
//
// Patterns are unanchored at the end unless they say otherwise, so trailing
// content after the recognised prefix is ignored. Digit and word classes are
// spelled as ASCII ranges so exotic Unicode digits never reach integer parsing.

use crate::core::model::LogFormat;
use regex::Regex;
use std::sync::OnceLock;

/// Combined/common access log:
/// `host ident user [timestamp] "request" status size`, size may be `-`.
const APACHE: &str = r#"^(\S+) \S+ \S+ \[([^\]]+)\] "([^"]*)" ([0-9]+) ([0-9]+|-)"#;

/// Apache prefix with a literal `-` ident, numeric size, then quoted
/// referer and user agent.
const NGINX: &str =
    r#"^(\S+) - \S+ \[([^\]]+)\] "([^"]*)" ([0-9]+) ([0-9]+) "([^"]*)" "([^"]*)""#;

/// BSD syslog without year: `Mon DD HH:MM:SS host process: message`.
const SYSLOG: &str =
    r"^([A-Za-z0-9_]+\s+[0-9]+\s+[0-9]+:[0-9]+:[0-9]+) (\S+) ([^:]+): (.*)$";

/// A line that looks like one JSON object.
const JSON: &str = r"^\{.*\}$";

/// `ISO-timestamp LEVEL message`.
const COMMON: &str = r"^([0-9]{4}-[0-9]{2}-[0-9]{2}[T\s][0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]+)?(?:Z|[+-][0-9]{2}:?[0-9]{2})?)\s+([A-Za-z0-9_]+)\s+(.*)$";

/// Formats tried by the detector, in priority order.
pub const DETECTION_ORDER: [LogFormat; 4] = [
    LogFormat::Apache,
    LogFormat::Nginx,
    LogFormat::Syslog,
    LogFormat::Json,
];

struct Grammars {
    apache: Regex,
    nginx: Regex,
    syslog: Regex,
    json: Regex,
    common: Regex,
}

fn grammars() -> &'static Grammars {
    static GRAMMARS: OnceLock<Grammars> = OnceLock::new();
    GRAMMARS.get_or_init(|| {
        // Patterns are compile-time constants exercised by the unit tests
        // below, so a typo fails a test rather than panicking in production.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("grammar: invalid regex")
        }
        Grammars {
            apache: re(APACHE),
            nginx: re(NGINX),
            syslog: re(SYSLOG),
            json: re(JSON),
            common: re(COMMON),
        }
    })
}

/// Compiled line grammar for `format`.
///
/// `Generic` shares the `Common` grammar: both try the timestamp/level/message
/// shape and fall back to keyword inference.
pub fn pattern(format: LogFormat) -> &'static Regex {
    let g = grammars();
    match format {
        LogFormat::Apache => &g.apache,
        LogFormat::Nginx => &g.nginx,
        LogFormat::Syslog => &g.syslog,
        LogFormat::Json => &g.json,
        LogFormat::Common | LogFormat::Generic => &g.common,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_grammars_compile() {
        for format in LogFormat::all() {
            let _ = pattern(*format);
        }
    }

    #[test]
    fn test_apache_captures() {
        let caps = pattern(LogFormat::Apache)
            .captures(r#"10.1.1.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /a.gif HTTP/1.0" 200 2326"#)
            .unwrap();
        assert_eq!(&caps[1], "10.1.1.1");
        assert_eq!(&caps[2], "10/Oct/2000:13:55:36 -0700");
        assert_eq!(&caps[3], "GET /a.gif HTTP/1.0");
        assert_eq!(&caps[4], "200");
        assert_eq!(&caps[5], "2326");
    }

    #[test]
    fn test_apache_accepts_dash_size() {
        let caps = pattern(LogFormat::Apache)
            .captures(r#"h - - [t] "GET / HTTP/1.1" 304 -"#)
            .unwrap();
        assert_eq!(&caps[5], "-");
    }

    #[test]
    fn test_nginx_requires_referer_and_agent() {
        let line = r#"1.2.3.4 - - [t] "GET / HTTP/1.1" 200 612 "-" "curl/8.0""#;
        let caps = pattern(LogFormat::Nginx).captures(line).unwrap();
        assert_eq!(&caps[6], "-");
        assert_eq!(&caps[7], "curl/8.0");
        assert!(!pattern(LogFormat::Nginx).is_match(r#"1.2.3.4 - - [t] "GET /" 200 612"#));
    }

    #[test]
    fn test_syslog_captures() {
        let caps = pattern(LogFormat::Syslog)
            .captures("Jan  5 14:30:22 web01 sshd[812]: Accepted publickey")
            .unwrap();
        assert_eq!(&caps[1], "Jan  5 14:30:22");
        assert_eq!(&caps[2], "web01");
        assert_eq!(&caps[3], "sshd[812]");
        assert_eq!(&caps[4], "Accepted publickey");
    }

    #[test]
    fn test_json_shape_only() {
        assert!(pattern(LogFormat::Json).is_match(r#"{"a":1}"#));
        assert!(pattern(LogFormat::Json).is_match("{not really json}"));
        assert!(!pattern(LogFormat::Json).is_match(r#" {"a":1}"#));
    }

    #[test]
    fn test_common_captures() {
        let caps = pattern(LogFormat::Common)
            .captures("2024-01-15T14:30:22.123Z ERROR disk full")
            .unwrap();
        assert_eq!(&caps[1], "2024-01-15T14:30:22.123Z");
        assert_eq!(&caps[2], "ERROR");
        assert_eq!(&caps[3], "disk full");
        assert!(pattern(LogFormat::Common).is_match("2024-01-15 14:30:22+05:30 warn x"));
        assert!(!pattern(LogFormat::Common).is_match("service started"));
    }
}
