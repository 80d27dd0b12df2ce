// LogWarden - core/brute_force.rs
//
// Batch-scoped counter of authentication failures per source.
// The counter lives for one call only; nothing carries over between batches.

use crate::core::model::{AlertSeverity, AlertType, ParsedEntry, SecurityAlert};
use crate::core::threat::brute_force_pattern;
use crate::util::constants::{BRUTE_FORCE_ALERT_THRESHOLD, BRUTE_FORCE_CRITICAL_THRESHOLD};
use chrono::Utc;
use std::collections::HashMap;

/// Count failure-looking messages per source and emit an alert for every
/// qualifying entry once its source reaches the alert threshold.
///
/// Entries without a source (or with an empty one) are never counted.
/// Every emission for one source shares the id `brute-force-{source}`, so
/// consumers that upsert by id keep only one of them.
pub fn detect_brute_force(entries: &[ParsedEntry]) -> Vec<SecurityAlert> {
    let pattern = brute_force_pattern();
    let now = Utc::now();
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let mut alerts = Vec::new();

    for entry in entries {
        let Some(source) = entry.source.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        if !pattern.is_match(&entry.message) {
            continue;
        }

        let count = counts.entry(source).or_insert(0);
        *count += 1;
        if *count < BRUTE_FORCE_ALERT_THRESHOLD {
            continue;
        }

        let severity = if *count >= BRUTE_FORCE_CRITICAL_THRESHOLD {
            AlertSeverity::Critical
        } else {
            AlertSeverity::High
        };
        alerts.push(SecurityAlert {
            id: format!("brute-force-{source}"),
            entry_id: Some(entry.id.clone()),
            alert_type: AlertType::BruteForceAttack,
            severity,
            description: format!("{count} failed authentication attempts from {source}"),
            created_at: now,
        });
    }

    if !alerts.is_empty() {
        tracing::debug!(
            sources = counts.len(),
            alerts = alerts.len(),
            "Brute-force activity detected"
        );
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(n: u64, source: Option<&str>) -> ParsedEntry {
        let mut e = ParsedEntry::from_raw("Failed password for root", n, "auth");
        e.source = source.map(str::to_string);
        e
    }

    #[test]
    fn test_ten_failures_escalate_to_critical() {
        let entries: Vec<_> = (1..=10).map(|n| failure(n, Some("10.0.0.5"))).collect();
        let alerts = detect_brute_force(&entries);

        // Counts 5 through 10 each emit.
        assert_eq!(alerts.len(), 6);
        assert!(alerts
            .iter()
            .any(|a| a.severity == AlertSeverity::High));
        assert!(alerts
            .iter()
            .any(|a| a.severity == AlertSeverity::Critical));
        assert!(alerts.iter().all(|a| a.id == "brute-force-10.0.0.5"));
        assert!(alerts.iter().all(|a| a.alert_type == AlertType::BruteForceAttack));

        assert_eq!(alerts[0].description, "5 failed authentication attempts from 10.0.0.5");
        assert_eq!(alerts[0].entry_id.as_deref(), Some("auth-5"));
        assert_eq!(alerts[4].severity, AlertSeverity::High);
        assert_eq!(alerts[5].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_below_threshold_is_silent() {
        let entries: Vec<_> = (1..=4).map(|n| failure(n, Some("h"))).collect();
        assert!(detect_brute_force(&entries).is_empty());
    }

    #[test]
    fn test_sources_are_counted_separately() {
        let entries: Vec<_> = (1..=8)
            .map(|n| failure(n, Some(if n % 2 == 0 { "a" } else { "b" })))
            .collect();
        assert!(detect_brute_force(&entries).is_empty());
    }

    #[test]
    fn test_missing_or_empty_source_never_counts() {
        let mut entries: Vec<_> = (1..=6).map(|n| failure(n, None)).collect();
        entries.extend((7..=12).map(|n| failure(n, Some(""))));
        assert!(detect_brute_force(&entries).is_empty());
    }

    #[test]
    fn test_non_matching_messages_do_not_count() {
        let mut entries: Vec<_> = (1..=4).map(|n| failure(n, Some("h"))).collect();
        let mut ok = ParsedEntry::from_raw("Accepted publickey", 5, "auth");
        ok.source = Some("h".to_string());
        entries.push(ok);
        assert!(detect_brute_force(&entries).is_empty());

        entries.push(failure(6, Some("h")));
        assert_eq!(detect_brute_force(&entries).len(), 1);
    }

    #[test]
    fn test_state_does_not_leak_between_calls() {
        let entries: Vec<_> = (1..=4).map(|n| failure(n, Some("h"))).collect();
        assert!(detect_brute_force(&entries).is_empty());
        assert!(detect_brute_force(&entries).is_empty());
    }
}
