//! Retrying recursive directory removal.
//!
//! Directories touched by another process (virus scanners, a browser that has not
//! quite exited) can refuse deletion for a moment. This retries a bounded number of
//! times, clearing read-only bits between attempts.

use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{StashError, StashResult};
use crate::platform::clear_readonly;
use crate::shutdown;

/// Remove `dir` and everything below it, retrying up to `attempts` times (at least once)
/// with `delay` between tries. A missing `dir` counts as success.
pub fn remove_dir_with_retries(dir: &Path, attempts: u32, delay: Duration) -> StashResult<()> {
    let attempts = attempts.max(1);
    let mut last: Option<io::Error> = None;

    for attempt in 1..=attempts {
        shutdown::check()?;
        match fs::remove_dir_all(dir) {
            Ok(()) => {
                debug!(dir = %dir.display(), attempt, "removed directory");
                return Ok(());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                warn!(dir = %dir.display(), attempt, attempts, error = %e, "directory removal failed");
                last = Some(e);
            }
        }
        if attempt < attempts {
            clear_readonly_tree(dir);
            thread::sleep(delay);
        }
    }

    // remove_dir_all can report an error after a concurrent remover already finished.
    if !dir.exists() {
        return Ok(());
    }
    Err(StashError::RemoveRetriesExhausted {
        path: dir.to_path_buf(),
        attempts,
        last: last.unwrap_or_else(|| io::Error::other("directory still present")),
    })
}

fn clear_readonly_tree(dir: &Path) {
    for entry in WalkDir::new(dir).follow_links(false).into_iter().filter_map(Result::ok) {
        if let Err(e) = clear_readonly(entry.path()) {
            debug!(path = %entry.path().display(), error = %e, "could not clear read-only flag");
        }
    }
}
