//! I/O helper utilities.
//!
//! Turns a bare io::Error into a `StashError::Io` carrying the operation and path,
//! and renders platform-aware hints when the error is displayed.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create directory", dir))?;

use std::io;
use std::path::Path;

#[cfg(unix)]
use libc;

use crate::errors::StashError;

/// Format a human-friendly message with op/path plus platform-aware hints.
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str(" — permission denied; check ownership and write permissions.");
                }
                libc::EXDEV => {
                    msg.push_str(" — cross-filesystem; atomic rename not possible.");
                }
                libc::EBUSY => {
                    msg.push_str(" — resource busy; another process may hold the file open.");
                }
                libc::ENOENT => {
                    msg.push_str(" — path not found; verify it exists.");
                }
                libc::EEXIST => {
                    msg.push_str(" — already exists; remove the target or change the collision policy.");
                }
                libc::ENOTEMPTY => {
                    msg.push_str(" — directory not empty.");
                }
                libc::ENOSPC => {
                    msg.push_str(" — insufficient space on device.");
                }
                libc::EROFS => {
                    msg.push_str(" — read-only filesystem; cannot write here.");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str(" — filename or path too long; shorten path segments.");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                5 => msg.push_str(" — access denied; check permissions."),          // ERROR_ACCESS_DENIED
                17 => msg.push_str(" — not same device; cross-filesystem move."),   // ERROR_NOT_SAME_DEVICE
                32 => msg.push_str(" — sharing violation; file is in use."),        // ERROR_SHARING_VIOLATION
                2 | 3 => msg.push_str(" — path not found; verify it exists."),      // FILE/ PATH NOT FOUND
                80 | 183 => msg.push_str(" — already exists; remove the target or change the collision policy."),
                145 => msg.push_str(" — directory not empty."),                     // ERROR_DIR_NOT_EMPTY
                112 => msg.push_str(" — insufficient disk space."),                 // ERROR_DISK_FULL
                19 => msg.push_str(" — write protected / read-only media."),        // ERROR_WRITE_PROTECT
                _ => {}
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str(" — permission denied; check ownership and write permissions.");
            }
            io::ErrorKind::NotFound => {
                msg.push_str(" — path not found; verify it exists.");
            }
            io::ErrorKind::AlreadyExists => {
                msg.push_str(" — already exists; remove the target or change the collision policy.");
            }
            _ => {}
        }
    }

    msg
}

/// Returns a closure suitable for `.map_err(...)` that wraps io::Error into `StashError::Io`.
pub fn io_error_with_help<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> StashError + 'a {
    move |source: io::Error| StashError::Io {
        op,
        path: path.to_path_buf(),
        source,
    }
}
