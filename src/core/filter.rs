// LogWarden - core/filter.rs
//
// Composable filters over parsed entries and alerts.
// All active filters are AND-combined.
// Core layer: pure logic, no I/O.

use crate::core::model::{AlertSeverity, AlertType, ParsedEntry, SecurityAlert};
use crate::util::error::FilterError;
use regex::Regex;
use std::collections::HashSet;

// =============================================================================
// Entry filter
// =============================================================================

/// Entry filter state. All fields are AND-combined when applied.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Case-insensitive substring matched against message or source.
    /// Empty = no filter.
    pub text_search: String,

    /// Exact level label to keep. None = all levels.
    pub level: Option<String>,

    /// Compiled regex tested against the message. None = no regex filter.
    pub regex_search: Option<Regex>,
}

impl EntryFilter {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.text_search.is_empty() && self.level.is_none() && self.regex_search.is_none()
    }

    /// Set the regex search pattern, compiling it.
    /// An empty pattern clears the regex filter.
    pub fn set_regex(&mut self, pattern: &str) -> Result<(), FilterError> {
        if pattern.is_empty() {
            self.regex_search = None;
            return Ok(());
        }
        let regex = Regex::new(pattern).map_err(|e| FilterError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })?;
        self.regex_search = Some(regex);
        Ok(())
    }

    /// Apply the filter, returning indices of matching entries.
    pub fn apply(&self, entries: &[ParsedEntry]) -> Vec<usize> {
        if self.is_empty() {
            return (0..entries.len()).collect();
        }

        let text_lower = self.text_search.to_lowercase();

        entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.matches(entry, &text_lower))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn matches(&self, entry: &ParsedEntry, text_lower: &str) -> bool {
        if let Some(ref level) = self.level {
            if entry.level.as_deref() != Some(level.as_str()) {
                return false;
            }
        }

        if !text_lower.is_empty() {
            let in_message = entry.message.to_lowercase().contains(text_lower);
            let in_source = entry
                .source
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(text_lower));
            if !in_message && !in_source {
                return false;
            }
        }

        if let Some(ref regex) = self.regex_search {
            if !regex.is_match(&entry.message) {
                return false;
            }
        }

        true
    }
}

/// Level labels present in `entries`, in first-seen order.
pub fn distinct_levels(entries: &[ParsedEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|e| e.level.as_deref())
        .filter(|level| seen.insert(*level))
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Alert filter
// =============================================================================

/// Alert filter state.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    /// Keep alerts at or above this severity. None = all.
    pub min_severity: Option<AlertSeverity>,

    /// Alert types to include (empty = all).
    pub alert_types: HashSet<AlertType>,
}

impl AlertFilter {
    /// Build a filter from a severity name given on the command line.
    pub fn with_min_severity(name: &str) -> Result<Self, FilterError> {
        let severity =
            AlertSeverity::from_str_loose(name).ok_or_else(|| FilterError::UnknownSeverity {
                value: name.to_string(),
            })?;
        Ok(Self {
            min_severity: Some(severity),
            ..Default::default()
        })
    }

    /// Restrict the filter to one more alert type, by tag.
    pub fn add_alert_type(&mut self, name: &str) -> Result<(), FilterError> {
        let alert_type =
            AlertType::from_str_loose(name).ok_or_else(|| FilterError::UnknownAlertType {
                value: name.to_string(),
            })?;
        self.alert_types.insert(alert_type);
        Ok(())
    }

    pub fn matches(&self, alert: &SecurityAlert) -> bool {
        if let Some(min) = self.min_severity {
            if alert.severity < min {
                return false;
            }
        }
        self.alert_types.is_empty() || self.alert_types.contains(&alert.alert_type)
    }

    /// Apply the filter, returning indices of matching alerts.
    pub fn apply(&self, alerts: &[SecurityAlert]) -> Vec<usize> {
        alerts
            .iter()
            .enumerate()
            .filter(|(_, alert)| self.matches(alert))
            .map(|(idx, _)| idx)
            .collect()
    }
}
