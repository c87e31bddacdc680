//! Prefix filter and flat (depth-1) directory listing.
//!
//! Everything else in `fs_ops` is built on `list_matching`: it never recurses,
//! never follows symlinks, and treats a missing directory as empty.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

use crate::errors::{StashError, StashResult};

use super::helpers::io_error_with_help;

/// Literal, case-sensitive prefix match on a file name. `None` matches everything.
pub fn matches_prefix(name: &OsStr, prefix: Option<&str>) -> bool {
    match prefix {
        None => true,
        // Compare on the raw encoding so non-UTF-8 names never match by accident.
        Some(p) => name.as_encoded_bytes().starts_with(p.as_bytes()),
    }
}

/// List the direct, non-directory children of `dir` whose name matches `prefix`.
///
/// - Missing `dir` yields an empty list.
/// - A `dir` that exists but is not a directory is an error.
/// - Subdirectories are skipped; symlinks are returned as-is and never followed.
/// - Results are sorted by file name.
pub fn list_matching(dir: &Path, prefix: Option<&str>) -> StashResult<Vec<PathBuf>> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(StashError::NotADirectory(dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            trace!(dir = %dir.display(), "directory missing; nothing to list");
            return Ok(Vec::new());
        }
        Err(e) => return Err(io_error_with_help("inspect directory", dir)(e)),
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| io_error_with_help("list directory", dir)(e.into()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if matches_prefix(entry.file_name(), prefix) {
            out.push(entry.into_path());
        }
    }
    trace!(dir = %dir.display(), prefix = ?prefix, count = out.len(), "listed matching entries");
    Ok(out)
}
