// LogWarden - core/analysis.rs
//
// Alert aggregation for one entry batch.

use crate::core::brute_force::detect_brute_force;
use crate::core::model::{ParsedEntry, SecurityAlert};
use crate::core::threat::scan_entries;

/// Rule-scan alerts (entry order, catalog order within an entry) followed by
/// brute-force alerts. No deduplication happens here.
pub fn analyze_for_threats(entries: &[ParsedEntry]) -> Vec<SecurityAlert> {
    let mut alerts = scan_entries(entries);
    alerts.extend(detect_brute_force(entries));
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::AlertType;

    #[test]
    fn test_rule_alerts_precede_brute_force_alerts() {
        let entries: Vec<ParsedEntry> = (1..=5)
            .map(|n| {
                let mut e = ParsedEntry::from_raw("authentication failed", n, "f");
                e.source = Some("10.0.0.5".to_string());
                e
            })
            .collect();

        let alerts = analyze_for_threats(&entries);
        let types: Vec<_> = alerts.iter().map(|a| a.alert_type).collect();
        assert_eq!(
            types,
            vec![
                AlertType::BruteForce,
                AlertType::BruteForce,
                AlertType::BruteForce,
                AlertType::BruteForce,
                AlertType::BruteForce,
                AlertType::BruteForceAttack,
            ]
        );
    }

    #[test]
    fn test_oversized_status_line_is_still_scanned() {
        use crate::core::model::LogFormat;
        use crate::core::parser::{parse_content, ParseConfig};

        let content = "h - - [t] \"GET /?id=' OR 1=1 --\" 200 5\n\
                       h - - [t] \"GET /?id=' OR 1=1 --\" 99999999999999999999 5\n";
        let parsed = parse_content(content, "f", LogFormat::Apache, &ParseConfig::default());
        assert_eq!(parsed.entries.len(), 2);

        let ids: Vec<_> = analyze_for_threats(&parsed.entries)
            .into_iter()
            .filter(|a| a.alert_type == AlertType::SqlInjection)
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["alert-f-1-sql_injection", "alert-f-2-sql_injection"]);
    }

    #[test]
    fn test_empty_batch_has_no_alerts() {
        assert!(analyze_for_threats(&[]).is_empty());
    }
}
