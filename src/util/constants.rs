// LogWarden - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogWarden";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogWarden";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Format detection
// =============================================================================

/// Number of lines taken from the start of a file's content when sniffing
/// its line grammar. Blank lines count towards this window.
pub const FORMAT_DETECTION_LINES: usize = 5;

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Maximum number of files to discover under a single directory argument.
pub const DEFAULT_MAX_FILES: usize = 500;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 10_000;

/// Default include glob patterns for log file discovery.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.log", "*.log.[0-9]*", "*.txt", "*.json"];

/// Default exclude glob patterns for log file discovery.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "*.gz",
    "*.zip",
    "*.bak",
    "*.tmp",
    "node_modules",
    ".git",
];

// =============================================================================
// Parsing limits
// =============================================================================

/// File size threshold in bytes above which content is read via `memmap2`.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100 MB

/// Smallest accepted large-file threshold.
pub const MIN_LARGE_FILE_THRESHOLD: u64 = 1024 * 1024; // 1 MB

/// Maximum number of per-line parse errors kept per file before suppression.
/// Lines beyond the cap are still dropped; only the diagnostics are capped.
pub const MAX_PARSE_ERRORS_PER_FILE: usize = 1_000;

/// Upper bound on the user-configurable per-file parse error cap.
pub const ABSOLUTE_MAX_PARSE_ERRORS_PER_FILE: usize = 100_000;

/// Default number of worker threads for parallel file analysis.
/// 0 means use the global rayon pool (one thread per CPU core).
pub const DEFAULT_WORKER_THREADS: usize = 0;

/// Upper bound on configurable worker threads.
pub const MAX_WORKER_THREADS: usize = 256;

/// Maximum length of a raw log line included in debug/trace output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Threat detection
// =============================================================================

/// Number of message characters embedded in a rule alert's description.
pub const ALERT_MESSAGE_PREVIEW_CHARS: usize = 100;

/// Failure count per source at which brute-force alerts start firing.
pub const BRUTE_FORCE_ALERT_THRESHOLD: u32 = 5;

/// Failure count per source from which brute-force alerts are critical.
pub const BRUTE_FORCE_CRITICAL_THRESHOLD: u32 = 10;

// =============================================================================
// Export
// =============================================================================

/// Records written between flushes in JSON-lines exports. Matches the batch
/// size used by downstream stores that bulk-insert parsed entries.
pub const EXPORT_BATCH_SIZE: usize = 1_000;

/// Maximum number of records that can be exported in a single operation.
pub const MAX_EXPORT_ENTRIES: usize = 5_000_000;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
