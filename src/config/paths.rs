//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and detects symlinked ancestors for safety.

use anyhow::{anyhow, Context, Result};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CONFIG_ENV;

/// Config file path.
///
/// - `$DIR_STASH_CONFIG` if set; a directory value means `<dir>/config.xml`,
///   a relative value is resolved against the current directory.
/// - otherwise `<config_dir>/dir_stash/config.xml`.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_ENV) {
        let mut p = PathBuf::from(raw);
        if p.is_relative() {
            p = env::current_dir()
                .context("resolve current directory for relative DIR_STASH_CONFIG")?
                .join(p);
        }
        if p.is_dir() {
            p.push("config.xml");
        }
        return Ok(p);
    }

    let base = config_dir()
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or_else(|| anyhow!("could not determine a config directory for this user"))?;
    Ok(base.join("dir_stash").join("config.xml"))
}

/// Default log file path.
///
/// Lives next to the config file when `$DIR_STASH_CONFIG` is set, otherwise under
/// the OS data dir: `<data_dir>/dir_stash/dir_stash.log`.
pub fn default_log_path() -> Result<PathBuf> {
    if env::var_os(CONFIG_ENV).is_some() {
        let cfg = default_config_path()?;
        let parent = cfg.parent().unwrap_or_else(|| Path::new("."));
        return Ok(parent.join("dir_stash.log"));
    }
    let base = data_dir()
        .or_else(|| {
            env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share"))
        })
        .ok_or_else(|| anyhow!("could not determine a data directory for this user"))?;
    Ok(base.join("dir_stash").join("dir_stash.log"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
