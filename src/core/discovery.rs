// LogWarden - core/discovery.rs
//
// Log file discovery: a file path yields itself, a directory is walked.
//
// Reads only file metadata (size), never contents; the app layer owns
// reading. Per-entry I/O errors are non-fatal and collected as warnings.
// Exclude patterns short-circuit directory descent via filter_entry so
// excluded subtrees (e.g. node_modules/) are never traversed.

use crate::util::error::DiscoveryError;
use std::path::{Path, PathBuf};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Maximum number of matching files; more is an error.
    pub max_files: usize,

    /// Glob patterns (filename-only) that a file MUST match to be included.
    /// An empty list means "include everything that is not excluded".
    pub include_patterns: Vec<String>,

    /// Glob patterns matched against filenames AND directory component names.
    /// Matching files are skipped; matching directories are not descended into.
    pub exclude_patterns: Vec<String>,

    /// File size (bytes) at or above which the `is_large` flag is set.
    pub large_file_threshold: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        use crate::util::constants;
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_patterns: constants::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
        }
    }
}

/// A file selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size: u64,
    /// Above the large-file threshold: read through a memory map.
    pub is_large: bool,
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover log files at `root`.
///
/// A regular file is returned as-is, without pattern filtering: naming a
/// file explicitly is taken as intent. A directory is walked to
/// `max_depth`, filtering filenames through the include/exclude globs.
///
/// # Non-fatal errors
/// Entries below the root that cannot be accessed are recorded as
/// human-readable strings in the returned warnings vector.
///
/// # Fatal errors
/// `RootNotFound` when `root` does not exist, `Traversal` when the root
/// itself cannot be read, `MaxFilesExceeded` when more than `max_files`
/// files match.
pub fn discover_files(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<DiscoveredFile>, Vec<String>), DiscoveryError> {
    use crate::util::constants;

    let metadata = std::fs::metadata(root).map_err(|_| DiscoveryError::RootNotFound {
        path: root.to_path_buf(),
    })?;

    if metadata.is_file() {
        let size = metadata.len();
        tracing::debug!(file = %root.display(), size, "Explicit file selected");
        return Ok((
            vec![DiscoveredFile {
                path: root.to_path_buf(),
                size,
                is_large: size >= config.large_file_threshold,
            }],
            Vec::new(),
        ));
    }

    // Clamp config limits to absolute bounds.
    let max_files = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        max_files,
        include = ?config.include_patterns,
        exclude = ?config.exclude_patterns,
        "Discovery starting"
    );

    let include_pats = compile_patterns(&config.include_patterns, "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    let mut files: Vec<DiscoveredFile> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Literal exclude patterns prune directories; wildcard patterns
            // only apply to filenames.
            if e.file_type().is_dir() && e.depth() > 0 {
                let name = e.file_name().to_str().unwrap_or("");
                return !is_excluded_component(name, &exclude_pats);
            }
            true
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(DiscoveryError::Traversal {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();

        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                continue;
            }
        };

        if is_excluded_filename(file_name, &exclude_pats) {
            tracing::trace!(file = file_name, "Excluded by pattern");
            continue;
        }
        if !is_included(file_name, &include_pats) {
            tracing::trace!(file = file_name, "Not matched by include patterns");
            continue;
        }

        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                let msg = format!("Cannot read metadata for '{}': {e}", path.display());
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if files.len() == max_files {
            return Err(DiscoveryError::MaxFilesExceeded {
                path: root.to_path_buf(),
                max: max_files,
            });
        }

        let is_large = size >= config.large_file_threshold;
        if is_large {
            tracing::debug!(
                file = %path.display(),
                size_mb = size / (1024 * 1024),
                "Large file flagged"
            );
        }

        files.push(DiscoveredFile {
            path: path.to_path_buf(),
            size,
            is_large,
        });
    }

    tracing::debug!(
        files = files.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((files, warnings))
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile glob pattern strings; patterns that fail to compile are logged and
/// skipped.
fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// True if `dir_name` matches an exclude pattern with no wildcard characters.
fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}

fn is_excluded_filename(file_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| p.matches(file_name))
}

/// An empty include list includes everything.
fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    include_pats.is_empty() || include_pats.iter().any(|p| p.matches(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_temp_tree() -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        fs::write(root.join("access.log"), "127.0.0.1 - - [t] \"GET /\" 200 1\n")
            .expect("write access.log");
        fs::write(root.join("app.json"), "{\"msg\":\"up\"}\n").expect("write app.json");
        fs::write(root.join("notes.txt"), "plain text\n").expect("write notes.txt");
        fs::write(root.join("old.log.gz"), "binary").expect("write .gz");
        fs::write(root.join("image.png"), "binary").expect("write .png");

        let sub = root.join("nested");
        fs::create_dir(&sub).expect("mkdir nested");
        fs::write(sub.join("auth.log"), "Jan 15 14:30:22 h sshd: ok\n").expect("write auth.log");

        let node = root.join("node_modules");
        fs::create_dir(&node).expect("mkdir node_modules");
        fs::write(node.join("module.log"), "should be excluded\n").expect("write module.log");

        dir
    }

    fn names(files: &[DiscoveredFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_discovers_matching_files() {
        let dir = make_temp_tree();
        let (files, warnings) = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        let found = names(&files);

        for expected in ["access.log", "app.json", "notes.txt", "auth.log"] {
            assert!(found.contains(&expected.to_string()), "missing {expected} in {found:?}");
        }
        assert!(!found.contains(&"old.log.gz".to_string()), "gz should be excluded");
        assert!(!found.contains(&"image.png".to_string()), "png is not included");
        assert!(!found.contains(&"module.log".to_string()), "node_modules is pruned");
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_max_depth_1_excludes_subdirs() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_depth: 1,
            ..Default::default()
        };
        let (files, _) = discover_files(dir.path(), &config).unwrap();
        assert!(!names(&files).contains(&"auth.log".to_string()));
    }

    #[test]
    fn test_too_many_files_is_an_error() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_files: 2,
            ..Default::default()
        };
        let result = discover_files(dir.path(), &config);
        assert!(matches!(
            result,
            Err(DiscoveryError::MaxFilesExceeded { max: 2, .. })
        ));
    }

    #[test]
    fn test_explicit_file_bypasses_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("capture.pcap.txt.bak");
        fs::write(&file, "hello world").unwrap();

        let (files, _) = discover_files(&file, &DiscoveryConfig::default()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, file);
        assert_eq!(files[0].size, 11);
    }

    #[test]
    fn test_root_not_found() {
        let result = discover_files(
            Path::new("/nonexistent/path/logwarden"),
            &DiscoveryConfig::default(),
        );
        assert!(matches!(result, Err(DiscoveryError::RootNotFound { .. })));
    }

    #[test]
    fn test_is_large_flag() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tiny.log"), "x").unwrap();

        let config = DiscoveryConfig {
            large_file_threshold: 999_999_999,
            ..Default::default()
        };
        let (files, _) = discover_files(dir.path(), &config).unwrap();
        assert!(!files[0].is_large);

        let config = DiscoveryConfig {
            large_file_threshold: 0,
            ..Default::default()
        };
        let (files, _) = discover_files(dir.path(), &config).unwrap();
        assert!(files[0].is_large, "threshold 0 flags every file");
    }

    #[test]
    fn test_results_are_sorted_within_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.log", "a.log", "b.log"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        let (files, _) = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert_eq!(names(&files), vec!["a.log", "b.log", "c.log"]);
    }
}
