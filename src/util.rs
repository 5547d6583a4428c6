//! Utility functions for urlgroup.
//!
//! Reading URL lists from disk and turning each line into the path the
//! grouper works on.

use std::fs;
use std::path::Path;

use url::Url;

use crate::error::{Result, UrlGroupError};

/// Maximum URL list size that can be read into memory (10 MB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read a file into a string, refusing files larger than `max_size` bytes.
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read (doesn't exist, permission denied, etc.)
/// * The file exceeds `max_size`
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| UrlGroupError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(UrlGroupError::input(format!(
            "File {} is too large ({} bytes, max {} bytes)",
            path.display(),
            size,
            max_size
        )));
    }

    fs::read_to_string(path).map_err(|e| UrlGroupError::storage(path, e))
}

/// Extract the path of one input line.
///
/// Accepts absolute URLs (`https://host/a/b?q`) and bare absolute paths
/// (`/a/b`). Query strings and fragments are dropped.
pub fn path_of(line: &str) -> Result<String> {
    let line = line.trim();
    if line.starts_with('/') {
        let base = Url::parse("http://localhost/")?;
        return Ok(base.join(line)?.path().to_string());
    }
    Ok(Url::parse(line)?.path().to_string())
}

/// Paths of every usable line in `content`.
///
/// Blank lines and `#` comments are skipped. Lines that fail to parse are
/// skipped with a warning.
pub fn paths_from_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            match path_of(trimmed) {
                Ok(path) => Some(path),
                Err(err) => {
                    tracing::warn!(line = idx + 1, error = %err, "skipping unparseable line");
                    None
                }
            }
        })
        .collect()
}

/// Read a URL list file and return the path of every usable line.
pub fn load_paths(path: &Path, max_size: u64) -> Result<Vec<String>> {
    let content = read_to_string_with_limit(path, max_size)?;
    Ok(paths_from_lines(&content))
}
