//! Config validation logic.
//! Checks the settings are usable before any directory is touched. Nothing is created here:
//! the stash base appears on demand the first time something is hidden.

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use super::types::Config;

impl Config {
    /// Validate settings that would otherwise fail halfway through an operation.
    pub fn validate(&self) -> Result<()> {
        ensure_dir_or_absent(&self.stash_base, "stash_base")?;

        if self.remove_attempts == 0 {
            error!("remove_attempts must be at least 1");
            bail!("remove_attempts must be at least 1");
        }

        if let Some(log_file) = &self.log_file
            && log_file.is_dir()
        {
            error!("log_file points at a directory: {}", log_file.display());
            bail!("log_file points at a directory: {}", log_file.display());
        }

        info!(
            "Config validated: stash_base='{}' on_collision={} log_file='{}'",
            self.stash_base.display(),
            self.on_collision,
            self.log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into())
        );
        Ok(())
    }
}

/// A path that exists must be a directory; a missing one is fine.
fn ensure_dir_or_absent(path: &Path, name: &str) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if !meta.is_dir() => {
            error!("{name} exists but isn't a directory: {}", path.display());
            bail!("{name} exists but isn't a directory: {}", path.display());
        }
        Ok(_) => debug!("{name} present: {}", path.display()),
        Err(_) => debug!("{name} not created yet: {}", path.display()),
    }
    Ok(())
}
