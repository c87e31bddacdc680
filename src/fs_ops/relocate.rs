//! Hide / restore / delete over a flat directory.
//!
//! `Relocator` carries the per-run policy (collision handling, dry-run). The three
//! operations share the same listing primitive and differ only in how strict they are:
//! - `delete_matching` is best-effort: it keeps going past individual failures and
//!   reports them all at the end.
//! - `hide` and `restore` stop at the first failed move. Entries moved before the
//!   failure stay where they landed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{CollisionPolicy, Config};
use crate::errors::{StashError, StashResult};
use crate::shutdown;

use super::helpers::io_error_with_help;
use super::listing::list_matching;
use super::transfer::relocate_entry;

/// Outcome of a `restore` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Final paths of the restored entries inside the destination directory.
    pub restored: Vec<PathBuf>,
    /// True when the hidden directory was drained and removed by this call.
    pub hidden_dir_removed: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Relocator {
    pub on_collision: CollisionPolicy,
    /// Log what would happen but leave the filesystem alone.
    pub dry_run: bool,
}

impl Relocator {
    pub fn new(on_collision: CollisionPolicy) -> Self {
        Self { on_collision, dry_run: false }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            on_collision: cfg.on_collision,
            dry_run: cfg.dry_run,
        }
    }

    /// Permanently remove every flat entry of `dir` matching `prefix`.
    ///
    /// `dir` itself is never removed, and a missing `dir` is a no-op. Returns the
    /// number of entries removed; if any removal failed the rest are still attempted
    /// and `StashError::DeleteIncomplete` lists the failures.
    pub fn delete_matching(&self, dir: &Path, prefix: Option<&str>) -> StashResult<usize> {
        let entries = list_matching(dir, prefix)?;
        let mut removed = 0usize;
        let mut failures = Vec::new();

        for path in entries {
            if self.dry_run {
                info!(path = %path.display(), "dry-run: would delete entry");
                removed += 1;
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                // Gone between listing and removal; the post-condition holds either way.
                Err(e) if e.kind() == io::ErrorKind::NotFound => removed += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to delete entry; continuing");
                    failures.push((path, e));
                }
            }
        }

        if failures.is_empty() {
            info!(dir = %dir.display(), prefix = ?prefix, removed, "deleted matching entries");
            Ok(removed)
        } else {
            Err(StashError::DeleteIncomplete {
                dir: dir.to_path_buf(),
                removed,
                failures,
            })
        }
    }

    /// Move every flat entry of `source_dir` matching `prefix` into `hidden_dir`.
    ///
    /// `hidden_dir` is created (with parents) when missing and keeps whatever it
    /// already contained. A missing `source_dir` moves nothing. Returns the new paths
    /// of the moved entries.
    pub fn hide(&self, source_dir: &Path, prefix: Option<&str>, hidden_dir: &Path) -> StashResult<Vec<PathBuf>> {
        ensure_distinct(source_dir, hidden_dir)?;

        // A bad source must not leave a fresh hidden dir behind.
        let entries = list_matching(source_dir, prefix)?;
        if self.ensure_dir(hidden_dir)? {
            // Hidden storage usually holds credentials; keep it private (best-effort).
            let _ = crate::platform::set_dir_mode_0700(hidden_dir);
        }

        let moved = self.move_all(&entries, hidden_dir)?;

        info!(
            source = %source_dir.display(),
            hidden = %hidden_dir.display(),
            prefix = ?prefix,
            count = moved.len(),
            "hid matching entries"
        );
        Ok(moved)
    }

    /// Move every flat entry of `hidden_dir` matching `prefix` back into `dest_dir`,
    /// then remove `hidden_dir` if nothing is left in it.
    ///
    /// `dest_dir` is created when missing. A missing `hidden_dir` moves nothing and is
    /// not an error. A `hidden_dir` that still holds entries afterwards (prefix did not
    /// cover them, or it contains subdirectories) is left in place.
    pub fn restore(&self, dest_dir: &Path, prefix: Option<&str>, hidden_dir: &Path) -> StashResult<RestoreSummary> {
        ensure_distinct(dest_dir, hidden_dir)?;

        let entries = list_matching(hidden_dir, prefix)?;
        self.ensure_dir(dest_dir)?;
        let restored = self.move_all(&entries, dest_dir)?;
        let hidden_dir_removed = self.remove_if_drained(hidden_dir, restored.len())?;

        info!(
            dest = %dest_dir.display(),
            hidden = %hidden_dir.display(),
            prefix = ?prefix,
            count = restored.len(),
            hidden_dir_removed,
            "restored hidden entries"
        );
        Ok(RestoreSummary {
            restored,
            hidden_dir_removed,
        })
    }

    fn move_all(&self, entries: &[PathBuf], dest_dir: &Path) -> StashResult<Vec<PathBuf>> {
        let mut moved = Vec::with_capacity(entries.len());
        for src in entries {
            shutdown::check().inspect_err(|_| {
                warn!(moved = moved.len(), remaining = entries.len() - moved.len(), "interrupted mid-relocation");
            })?;
            if self.dry_run {
                let dest = dest_dir.join(src.file_name().unwrap_or_default());
                info!(src = %src.display(), dest = %dest.display(), "dry-run: would move entry");
                moved.push(dest);
                continue;
            }
            moved.push(relocate_entry(src, dest_dir, self.on_collision)?);
        }
        Ok(moved)
    }

    /// Make sure `dir` exists as a directory. Returns true when it had to be created.
    fn ensure_dir(&self, dir: &Path) -> StashResult<bool> {
        match fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => Ok(false),
            Ok(_) => Err(StashError::NotADirectory(dir.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.dry_run {
                    info!(action = "mkdir -p", path = %dir.display(), "dry-run");
                    return Ok(false);
                }
                fs::create_dir_all(dir).map_err(io_error_with_help("create directory", dir))?;
                debug!(dir = %dir.display(), "created directory");
                Ok(true)
            }
            Err(e) => Err(io_error_with_help("inspect directory", dir)(e)),
        }
    }

    /// Remove `dir` (non-recursively) if it exists and is empty.
    /// In dry-run, `pending` entries are treated as already gone.
    fn remove_if_drained(&self, dir: &Path, pending: usize) -> StashResult<bool> {
        let remaining = match fs::read_dir(dir) {
            Ok(rd) => rd.count(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(io_error_with_help("read hidden directory", dir)(e)),
        };

        if self.dry_run {
            let would = remaining <= pending;
            info!(dir = %dir.display(), would_remove = would, "dry-run: hidden directory cleanup");
            return Ok(would);
        }
        if remaining > 0 {
            info!(dir = %dir.display(), remaining, "hidden directory not empty; keeping it");
            return Ok(false);
        }

        match fs::remove_dir(dir) {
            Ok(()) => {
                debug!(dir = %dir.display(), "removed drained hidden directory");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error_with_help("remove hidden directory", dir)(e)),
        }
    }
}

/// Refuse to relocate a directory into itself (accounts for symlinks when both exist).
fn ensure_distinct(a: &Path, b: &Path) -> StashResult<()> {
    let a_real = fs::canonicalize(a).unwrap_or_else(|_| a.to_path_buf());
    let b_real = fs::canonicalize(b).unwrap_or_else(|_| b.to_path_buf());
    if a_real == b_real {
        Err(StashError::SamePath(a_real))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn delete_keeps_non_matching_and_the_dir() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("cookie1").touch().unwrap();
        temp.child("cookie2").touch().unwrap();
        temp.child("keep.txt").touch().unwrap();

        let removed = Relocator::default().delete_matching(temp.path(), Some("cookie")).unwrap();
        assert_eq!(removed, 2);
        assert!(temp.path().is_dir());
        assert_eq!(count(temp.path()), 1);
        assert!(temp.child("keep.txt").path().exists());
    }

    #[test]
    fn delete_ignores_subdirectories() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("nested").child("cookie").touch().unwrap();
        temp.child("cookie").touch().unwrap();

        let removed = Relocator::default().delete_matching(temp.path(), None).unwrap();
        assert_eq!(removed, 1);
        assert!(temp.child("nested").child("cookie").path().exists());
    }

    #[test]
    fn hide_onto_itself_is_refused() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("cookie").touch().unwrap();
        let err = Relocator::default().hide(temp.path(), None, temp.path()).unwrap_err();
        assert!(matches!(err, StashError::SamePath(_)));
        assert!(temp.child("cookie").path().exists());
    }

    #[test]
    fn hide_into_a_file_is_refused() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src").child("cookie").touch().unwrap();
        temp.child("blocker").touch().unwrap();
        let err = Relocator::default()
            .hide(temp.child("src").path(), None, temp.child("blocker").path())
            .unwrap_err();
        assert!(matches!(err, StashError::NotADirectory(_)));
    }

    #[test]
    fn hide_from_a_file_leaves_no_hidden_dir() {
        let temp = assert_fs::TempDir::new().unwrap();
        let not_a_dir = temp.child("cookies.sqlite");
        not_a_dir.touch().unwrap();
        let hidden = temp.child("stash").child("cookies");

        let err = Relocator::default().hide(not_a_dir.path(), None, hidden.path()).unwrap_err();
        assert!(matches!(err, StashError::NotADirectory(_)));
        assert!(!hidden.path().exists());
        assert!(!temp.child("stash").path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn newly_created_hidden_dir_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src").child("cookie").touch().unwrap();
        let hidden = temp.child("hidden");
        Relocator::default().hide(temp.child("src").path(), None, hidden.path()).unwrap();
        let mode = fs::metadata(hidden.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("src");
        src.child("cookie").touch().unwrap();
        let hidden = temp.child("hidden");
        let rel = Relocator { dry_run: true, ..Default::default() };

        let moved = rel.hide(src.path(), None, hidden.path()).unwrap();
        assert_eq!(moved, vec![hidden.path().join("cookie")]);
        assert!(!hidden.path().exists());
        assert_eq!(count(src.path()), 1);

        assert_eq!(rel.delete_matching(src.path(), None).unwrap(), 1);
        assert_eq!(count(src.path()), 1);
    }

    #[test]
    fn dry_run_restore_predicts_hidden_removal() {
        let temp = assert_fs::TempDir::new().unwrap();
        let hidden = temp.child("hidden");
        hidden.child("cookie").touch().unwrap();
        let dest = temp.child("dest");
        let rel = Relocator { dry_run: true, ..Default::default() };

        let summary = rel.restore(dest.path(), None, hidden.path()).unwrap();
        assert!(summary.hidden_dir_removed);
        assert!(hidden.child("cookie").path().exists());
        assert!(!dest.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn delete_reports_failures_but_finishes_batch() {
        use std::os::unix::fs::PermissionsExt;
        // Permission bits do not stop root; nothing to observe there.
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let temp = assert_fs::TempDir::new().unwrap();
        let locked = temp.child("locked");
        locked.child("cookie_a").touch().unwrap();
        let open = temp.child("open");
        open.child("cookie_b").touch().unwrap();
        fs::set_permissions(locked.path(), fs::Permissions::from_mode(0o500)).unwrap();

        let err = Relocator::default().delete_matching(locked.path(), None).unwrap_err();
        fs::set_permissions(locked.path(), fs::Permissions::from_mode(0o700)).unwrap();
        match err {
            StashError::DeleteIncomplete { removed, failures, .. } => {
                assert_eq!(removed, 0);
                assert_eq!(failures.len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(Relocator::default().delete_matching(open.path(), None).unwrap(), 1);
    }
}
