//! Single-entry relocation primitive.
//! - Checks the destination name against the collision policy. An entry being
//!   overwritten stays untouched until the new one is renamed over it.
//! - Attempts an atomic rename; on cross-filesystem errors falls back to
//!   copy into a hidden temp sibling, fsync, rename into place, remove source.
//! - On Unix, best-effort fsync of the destination directory after the move.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::CollisionPolicy;
use crate::errors::{StashError, StashResult};

use super::helpers::io_error_with_help;
use super::util;

/// Move `src` into `dest_dir` under the same file name, honouring `policy`.
/// Returns the final destination path. `dest_dir` must already exist.
pub(crate) fn relocate_entry(src: &Path, dest_dir: &Path, policy: CollisionPolicy) -> StashResult<PathBuf> {
    let name = src.file_name().ok_or_else(|| StashError::Io {
        op: "resolve entry name",
        path: src.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    })?;
    let dest = dest_dir.join(name);

    check_collision(&dest, dest_dir, policy)?;

    match fs::rename(src, &dest) {
        Ok(()) => {
            debug!(src = %src.display(), dest = %dest.display(), "renamed entry");
        }
        Err(e) if util::is_cross_device(&e) => {
            warn!(src = %src.display(), dest = %dest.display(), "cross-filesystem move; copying instead");
            copy_then_remove(src, &dest, dest_dir)?;
        }
        Err(e) => return Err(io_error_with_help("move entry", src)(e)),
    }

    #[cfg(unix)]
    {
        // Ignore fsync errors to avoid turning a successful rename into a failure.
        let _ = util::fsync_dir(dest_dir);
    }

    Ok(dest)
}

/// Ok when `dest` is free, or occupied by a non-directory and the policy allows replacing it.
fn check_collision(dest: &Path, dest_dir: &Path, policy: CollisionPolicy) -> StashResult<()> {
    let existing = match fs::symlink_metadata(dest) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(io_error_with_help("inspect destination", dest)(e)),
    };

    let collision = || StashError::NameCollision {
        name: dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        dest_dir: dest_dir.to_path_buf(),
    };

    if existing.is_dir() {
        return Err(collision());
    }
    match policy {
        CollisionPolicy::Reject => Err(collision()),
        CollisionPolicy::Overwrite => {
            // Left in place: the final rename replaces it (std uses MOVEFILE_REPLACE_EXISTING
            // on Windows), so a failed move never costs the existing copy.
            debug!(dest = %dest.display(), "existing entry will be replaced");
            Ok(())
        }
    }
}

fn copy_then_remove(src: &Path, dest: &Path, dest_dir: &Path) -> StashResult<()> {
    let meta = fs::symlink_metadata(src).map_err(io_error_with_help("inspect entry", src))?;
    if meta.file_type().is_symlink() {
        return Err(StashError::Io {
            op: "move symlink across filesystems",
            path: src.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Unsupported, "symlinks are only moved by rename"),
        });
    }

    let tmp = util::unique_temp_path(dest_dir);
    if let Err(e) = copy_durable(src, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error_with_help("copy to temporary file", &tmp)(e));
    }
    let _ = fs::set_permissions(&tmp, meta.permissions());

    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error_with_help("rename temporary file", dest)(e));
    }

    fs::remove_file(src).map_err(io_error_with_help("remove original entry", src))
}

/// Buffered copy into a freshly created file (never clobbers), then fsync.
fn copy_durable(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut reader = BufReader::new(File::open(src)?);
    let out = OpenOptions::new().write(true).create_new(true).open(dst)?;
    let mut writer = BufWriter::new(out);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn relocate_moves_and_keeps_name() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("src").child("cookie.txt");
        src.write_str("session=1").unwrap();
        let dest_dir = temp.child("dest");
        dest_dir.create_dir_all().unwrap();

        let dest = relocate_entry(src.path(), dest_dir.path(), CollisionPolicy::Reject).unwrap();
        assert_eq!(dest, dest_dir.path().join("cookie.txt"));
        assert!(!src.path().exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "session=1");
    }

    #[test]
    fn reject_policy_reports_collision_and_keeps_both() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("src").child("cookie.txt");
        src.write_str("new").unwrap();
        let existing = temp.child("dest").child("cookie.txt");
        existing.write_str("old").unwrap();

        let err = relocate_entry(src.path(), temp.child("dest").path(), CollisionPolicy::Reject).unwrap_err();
        assert!(matches!(err, StashError::NameCollision { ref name, .. } if name == "cookie.txt"));
        assert_eq!(fs::read_to_string(src.path()).unwrap(), "new");
        assert_eq!(fs::read_to_string(existing.path()).unwrap(), "old");
    }

    #[test]
    fn overwrite_policy_replaces_file_but_not_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("src").child("cookie.txt");
        src.write_str("new").unwrap();
        let dest_dir = temp.child("dest");
        dest_dir.child("cookie.txt").write_str("old").unwrap();

        let dest = relocate_entry(src.path(), dest_dir.path(), CollisionPolicy::Overwrite).unwrap();
        assert_eq!(fs::read_to_string(dest).unwrap(), "new");

        let src2 = temp.child("src").child("sub");
        src2.write_str("file").unwrap();
        dest_dir.child("sub").create_dir_all().unwrap();
        let err = relocate_entry(src2.path(), dest_dir.path(), CollisionPolicy::Overwrite).unwrap_err();
        assert!(matches!(err, StashError::NameCollision { .. }));
        assert!(src2.path().exists());
    }

    #[test]
    fn failed_overwrite_keeps_existing_destination() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src").create_dir_all().unwrap();
        // Listed earlier, gone by the time it is moved.
        let vanished = temp.child("src").child("cookie.txt");
        let dest_dir = temp.child("dest");
        dest_dir.child("cookie.txt").write_str("old").unwrap();

        let err = relocate_entry(vanished.path(), dest_dir.path(), CollisionPolicy::Overwrite).unwrap_err();
        assert!(matches!(err, StashError::Io { op: "move entry", .. }));
        assert_eq!(fs::read_to_string(dest_dir.child("cookie.txt").path()).unwrap(), "old");
    }

    #[cfg(unix)]
    #[test]
    fn overwrite_blocked_by_permissions_keeps_existing_destination() {
        use std::os::unix::fs::PermissionsExt;
        // Permission bits do not stop root.
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let temp = assert_fs::TempDir::new().unwrap();
        let src_dir = temp.child("src");
        src_dir.child("cookie.txt").write_str("new").unwrap();
        let dest_dir = temp.child("dest");
        dest_dir.child("cookie.txt").write_str("old").unwrap();
        fs::set_permissions(src_dir.path(), fs::Permissions::from_mode(0o500)).unwrap();

        let res = relocate_entry(&src_dir.path().join("cookie.txt"), dest_dir.path(), CollisionPolicy::Overwrite);
        fs::set_permissions(src_dir.path(), fs::Permissions::from_mode(0o700)).unwrap();

        assert!(res.is_err());
        assert_eq!(fs::read_to_string(dest_dir.child("cookie.txt").path()).unwrap(), "old");
        assert_eq!(fs::read_to_string(src_dir.child("cookie.txt").path()).unwrap(), "new");
    }

    #[test]
    fn copy_fallback_replaces_existing_destination() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("src").child("cookie.txt");
        src.write_str("new").unwrap();
        let dest_dir = temp.child("dest");
        dest_dir.child("cookie.txt").write_str("old").unwrap();
        let dest = dest_dir.path().join("cookie.txt");

        copy_then_remove(src.path(), &dest, dest_dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
        assert!(!src.path().exists());
        assert_eq!(fs::read_dir(dest_dir.path()).unwrap().count(), 1, "temp sibling cleaned up");
    }

    #[test]
    fn copy_durable_never_clobbers() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("a");
        src.write_str("abc").unwrap();
        let dst = temp.child("b");
        assert_eq!(copy_durable(src.path(), dst.path()).unwrap(), 3);
        let again = copy_durable(src.path(), dst.path()).unwrap_err();
        assert_eq!(again.kind(), io::ErrorKind::AlreadyExists);
    }
}
