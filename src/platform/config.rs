// LogWarden - platform/config.rs
//
// Config directory resolution and config.toml loading with validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogWarden configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logwarden/ or %APPDATA%\LogWarden\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }
}

// =============================================================================
// config.toml
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored, so a newer config file still loads in
/// an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub discovery: DiscoverySection,
    pub parsing: ParsingSection,
    pub logging: LoggingSection,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    pub max_depth: Option<usize>,
    pub max_files: Option<usize>,
    pub include_patterns: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// Files at or above this size are memory-mapped.
    pub large_file_threshold_bytes: Option<u64>,
    /// Per-line parse errors kept per file.
    pub max_parse_errors_per_file: Option<usize>,
    /// Number of worker threads (0 = auto).
    pub worker_threads: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Discovery --
    pub max_depth: usize,
    pub max_files: usize,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,

    // -- Parsing --
    pub large_file_threshold: u64,
    pub max_parse_errors_per_file: usize,
    pub worker_threads: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let owned = |patterns: &[&str]| patterns.iter().map(|s| (*s).to_string()).collect();
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: owned(constants::DEFAULT_INCLUDE_PATTERNS),
            exclude_patterns: owned(constants::DEFAULT_EXCLUDE_PATTERNS),
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
            max_parse_errors_per_file: constants::MAX_PARSE_ERRORS_PER_FILE,
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            log_level: None,
        }
    }
}

/// Load `config.toml` from the platform config directory.
///
/// Never fails: a missing file gives defaults silently (first run); an
/// unreadable or unparseable file gives defaults plus a warning.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match load_config_file(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Load a config file named explicitly (e.g. with `--config`).
///
/// Read and TOML errors are returned; out-of-range values are still only
/// warnings.
pub fn load_config_file(path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Check each field against its allowed range, accumulating all problems.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    let mut check = |field: &str, value: u64, min: u64, max: u64, default: u64| -> bool {
        if (min..=max).contains(&value) {
            return true;
        }
        let err = ConfigError::ValueOutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            expected: format!("{min}-{max}"),
        };
        warnings.push(format!("{err}. Using default ({default})."));
        false
    };

    // -- Discovery --
    if let Some(depth) = raw.discovery.max_depth {
        if check(
            "discovery.max_depth",
            depth as u64,
            1,
            constants::ABSOLUTE_MAX_DEPTH as u64,
            constants::DEFAULT_MAX_DEPTH as u64,
        ) {
            config.max_depth = depth;
        }
    }
    if let Some(files) = raw.discovery.max_files {
        if check(
            "discovery.max_files",
            files as u64,
            constants::MIN_MAX_FILES as u64,
            constants::ABSOLUTE_MAX_FILES as u64,
            constants::DEFAULT_MAX_FILES as u64,
        ) {
            config.max_files = files;
        }
    }

    // -- Parsing --
    if let Some(threshold) = raw.parsing.large_file_threshold_bytes {
        if check(
            "parsing.large_file_threshold_bytes",
            threshold,
            constants::MIN_LARGE_FILE_THRESHOLD,
            u64::MAX,
            constants::DEFAULT_LARGE_FILE_THRESHOLD,
        ) {
            config.large_file_threshold = threshold;
        }
    }
    if let Some(cap) = raw.parsing.max_parse_errors_per_file {
        if check(
            "parsing.max_parse_errors_per_file",
            cap as u64,
            0,
            constants::ABSOLUTE_MAX_PARSE_ERRORS_PER_FILE as u64,
            constants::MAX_PARSE_ERRORS_PER_FILE as u64,
        ) {
            config.max_parse_errors_per_file = cap;
        }
    }
    if let Some(threads) = raw.parsing.worker_threads {
        if check(
            "parsing.worker_threads",
            threads as u64,
            0,
            constants::MAX_WORKER_THREADS as u64,
            constants::DEFAULT_WORKER_THREADS as u64,
        ) {
            config.worker_threads = threads;
        }
    }

    // Patterns are taken as given; invalid globs are reported at discovery.
    if let Some(patterns) = raw.discovery.include_patterns {
        config.include_patterns = patterns;
    }
    if let Some(patterns) = raw.discovery.exclude_patterns {
        config.exclude_patterns = patterns;
    }

    // -- Logging --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(text).expect("valid toml"))
    }

    #[test]
    fn test_empty_config_is_default() {
        let (config, warnings) = parse("");
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, warnings) = parse(
            r#"
            [discovery]
            max_depth = 3
            max_files = 20
            include_patterns = ["*.log"]

            [parsing]
            large_file_threshold_bytes = 2097152
            max_parse_errors_per_file = 5
            worker_threads = 4

            [logging]
            level = "DEBUG"
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_files, 20);
        assert_eq!(config.include_patterns, vec!["*.log"]);
        assert_eq!(config.large_file_threshold, 2_097_152);
        assert_eq!(config.max_parse_errors_per_file, 5);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let (config, warnings) = parse(
            r#"
            [discovery]
            max_depth = 0
            max_files = 99999999

            [parsing]
            worker_threads = 100000

            [logging]
            level = "loud"
            "#,
        );
        assert_eq!(warnings.len(), 4, "{warnings:?}");
        assert!(warnings[0].contains("discovery.max_depth"));
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_files, constants::DEFAULT_MAX_FILES);
        assert_eq!(config.worker_threads, constants::DEFAULT_WORKER_THREADS);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (_, warnings) = parse("[ui]\ntheme = \"dark\"\n[discovery]\nfuture_key = 1\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_default_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_broken_default_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(constants::CONFIG_FILE_NAME), "[discovery\n").unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_explicit_file_errors_are_returned() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            load_config_file(&missing),
            Err(ConfigError::Io { .. })
        ));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "max_depth = [").unwrap();
        assert!(matches!(
            load_config_file(&broken),
            Err(ConfigError::TomlParse { .. })
        ));
    }
}
