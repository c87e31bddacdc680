//! CLI definition and parsing.
//! Defines Args (global flags + one subcommand per operation) and parse().
//!
//! Notes:
//! - --hidden takes precedence over --name; without either the stash is <stash_base>/default.
//! - --debug is a shorthand for --log-level debug.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};
use std::path::{Path, PathBuf};

use crate::config::{CollisionPolicy, Config, LogLevel, DEFAULT_STASH_NAME};

/// CLI wrapper for the dir_stash library.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Hide files from a directory and restore them later"
)]
pub struct Args {
    #[command(subcommand)]
    pub action: Option<Action>,

    /// Override the stash base directory (normally configured via XML).
    #[arg(long, global = true, value_hint = ValueHint::DirPath, help = "Override the stash base directory")]
    pub stash_base: Option<PathBuf>,

    /// What to do when a moved file's name already exists at the destination.
    #[arg(long, global = true, value_name = "POLICY", help = "On name collision: reject or overwrite")]
    pub on_collision: Option<CollisionPolicy>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, value_name = "LEVEL", help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<LogLevel>,

    /// Also append logs to this file.
    #[arg(long, global = true, value_hint = ValueHint::FilePath, help = "Append logs to this file")]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Dry-run: log actions but do not modify the filesystem.
    #[arg(long, global = true, help = "Show what would be done, but do not modify files/directories")]
    pub dry_run: bool,

    /// Print where dir_stash will look for the config file, then exit.
    #[arg(long, help = "Print the config file location used by dir_stash and exit")]
    pub print_config: bool,

    /// Write a commented template config to the default location, then exit.
    #[arg(long, help = "Write a template config file and exit")]
    pub init_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Action {
    /// Move matching files from DIR into the stash.
    Hide {
        #[arg(value_name = "DIR", value_hint = ValueHint::DirPath)]
        dir: PathBuf,
        /// Only entries whose name starts with this literal prefix.
        #[arg(long, short = 'p')]
        prefix: Option<String>,
        #[command(flatten)]
        stash: StashTarget,
    },
    /// Move stashed files back into DIR and drop the emptied stash.
    Restore {
        #[arg(value_name = "DIR", value_hint = ValueHint::DirPath)]
        dir: PathBuf,
        #[arg(long, short = 'p')]
        prefix: Option<String>,
        #[command(flatten)]
        stash: StashTarget,
    },
    /// Delete matching files from DIR (the directory itself is kept).
    Delete {
        #[arg(value_name = "DIR", value_hint = ValueHint::DirPath)]
        dir: PathBuf,
        #[arg(long, short = 'p')]
        prefix: Option<String>,
    },
    /// Remove a stash directory and everything in it, retrying on transient failures.
    Purge {
        #[command(flatten)]
        stash: StashTarget,
    },
}

/// Which hidden-storage directory an action works with.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StashTarget {
    /// Explicit hidden-storage directory.
    #[arg(long, value_hint = ValueHint::DirPath, conflicts_with = "name")]
    pub hidden: Option<PathBuf>,
    /// Named stash under the stash base.
    #[arg(long, short = 'n')]
    pub name: Option<String>,
}

impl StashTarget {
    /// `--hidden` if given, else `<stash_base>/<name or "default">`.
    /// Fails for names that would point outside the stash base.
    pub fn resolve(&self, cfg: &Config) -> Result<PathBuf> {
        if let Some(p) = &self.hidden {
            return Ok(sanitize_path(p));
        }
        cfg.hidden_dir_for(self.name.as_deref().unwrap_or(DEFAULT_STASH_NAME))
    }
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.clone()
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(base) = &self.stash_base {
            cfg.stash_base = sanitize_path(base);
        }
        if let Some(policy) = self.on_collision {
            cfg.on_collision = policy;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
    }
}

/// Strip a pair of surrounding quotes left behind by PowerShell/CMD quoting,
/// and one trailing separator. Other paths are returned untouched.
pub fn sanitize_path(p: &Path) -> PathBuf {
    let Some(raw) = p.to_str() else {
        return p.to_path_buf();
    };
    let trimmed = raw.trim();
    let mut inner = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    };

    // Avoid stripping root "/" inadvertently.
    if inner.len() > 1 && (inner.ends_with('\\') || inner.ends_with('/')) {
        inner.pop();
    }
    PathBuf::from(inner)
}

pub fn parse() -> Args {
    Args::parse()
}
