//! Filesystem operations: flat listing, delete, hide/restore and robust cleanup.

mod cleanup;
mod helpers;
mod listing;
mod relocate;
mod transfer;
pub(crate) mod util;

pub use cleanup::remove_dir_with_retries;
pub use helpers::{describe_io_error, io_error_with_help};
pub use listing::{list_matching, matches_prefix};
pub use relocate::{Relocator, RestoreSummary};

use std::path::{Path, PathBuf};

use crate::errors::StashResult;

/// Remove every flat entry of `dir` matching `prefix` using the default policy.
pub fn delete_matching(dir: &Path, prefix: Option<&str>) -> StashResult<usize> {
    Relocator::default().delete_matching(dir, prefix)
}

/// Move matching entries of `source_dir` into `hidden_dir`, rejecting name collisions.
pub fn hide(source_dir: &Path, prefix: Option<&str>, hidden_dir: &Path) -> StashResult<Vec<PathBuf>> {
    Relocator::default().hide(source_dir, prefix, hidden_dir)
}

/// Move matching entries of `hidden_dir` back into `dest_dir` and drop the emptied `hidden_dir`.
pub fn restore(dest_dir: &Path, prefix: Option<&str>, hidden_dir: &Path) -> StashResult<RestoreSummary> {
    Relocator::default().restore(dest_dir, prefix, hidden_dir)
}
