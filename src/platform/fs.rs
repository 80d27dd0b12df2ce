// LogWarden - platform/fs.rs
//
// File content reading. Large files are memory-mapped; everything is
// decoded lossily so a stray invalid byte never rejects a whole log.

use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Retry delays for transient I/O errors on small-file reads.
const RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

/// Read the full content of a file as a string.
///
/// When `is_large` is set the file is memory-mapped instead of copied into a
/// buffer first. Invalid UTF-8 is replaced with U+FFFD. Transient errors
/// (WouldBlock, Interrupted, TimedOut) on ordinary reads are retried with
/// backoff; anything else is returned immediately.
pub fn read_file_content(path: &Path, is_large: bool) -> io::Result<String> {
    if is_large {
        let file = File::open(path)?;
        // SAFETY: the map is read-only and dropped before returning. A log
        // file truncated by another process while mapped can fault; that is
        // the accepted cost of mapping.
        let mmap = unsafe { Mmap::map(&file)? };
        tracing::debug!(
            path = %path.display(),
            bytes = mmap.len(),
            "Reading memory-mapped file"
        );
        return Ok(String::from_utf8_lossy(&mmap).into_owned());
    }

    let bytes = read_with_retry(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(path = %path.display(), "Invalid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}

fn read_with_retry(path: &Path) -> io::Result<Vec<u8>> {
    let mut last_err: Option<io::Error> = None;

    for (attempt, delay) in RETRY_DELAYS_MS.iter().enumerate() {
        match std::fs::read(path) {
            Ok(bytes) => return Ok(bytes),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(*delay));
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("read retries exhausted")))
}

fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_small_and_mapped_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.log");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let small = read_file_content(&path, false).unwrap();
        let mapped = read_file_content(&path, true).unwrap();
        assert_eq!(small, "line one\nline two\n");
        assert_eq!(small, mapped);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.log");
        std::fs::write(&path, b"ok \xff\xfe end\n").unwrap();

        let text = read_file_content(&path, false).unwrap();
        assert!(text.starts_with("ok "));
        assert!(text.contains('\u{FFFD}'));
        assert!(text.ends_with(" end\n"));
    }

    #[test]
    fn test_transient_error_kinds() {
        assert!(is_transient_error(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(!is_transient_error(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_file_content(Path::new("/nonexistent/logwarden.log"), false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
