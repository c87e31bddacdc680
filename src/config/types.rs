//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.
//! - CollisionPolicy decides what happens when a moved entry's name is taken.

use anyhow::{bail, Result};
use std::fmt;
use std::path::{is_separator, Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::{DEFAULT_REMOVE_ATTEMPTS, DEFAULT_REMOVE_RETRY_DELAY};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// What to do when the destination already holds an entry with the moved entry's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Fail with a name-collision error and leave both entries untouched.
    #[default]
    Reject,
    /// Replace the existing file. Existing directories are never replaced.
    Overwrite,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollisionPolicy::Reject => "reject",
            CollisionPolicy::Overwrite => "overwrite",
        })
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" | "fail" | "error" => Ok(CollisionPolicy::Reject),
            "overwrite" | "replace" => Ok(CollisionPolicy::Overwrite),
            _ => Err(format!("invalid collision policy: '{s}' (expected reject or overwrite)")),
        }
    }
}

/// Runtime configuration for the stash tool.
#[derive(Debug, Clone)]
pub struct Config {
    /// Scratch root under which named hidden directories live
    pub stash_base: PathBuf,
    /// Behaviour on name collisions while moving
    pub on_collision: CollisionPolicy,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// If true, log actions but do not modify the filesystem
    pub dry_run: bool,
    /// How many times `purge` tries to remove a stash directory
    pub remove_attempts: u32,
    /// Pause between removal attempts
    pub remove_retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stash_base: std::env::temp_dir().join("dir_stash"),
            on_collision: CollisionPolicy::default(),
            log_level: LogLevel::Normal,
            log_file: None,
            dry_run: false,
            remove_attempts: DEFAULT_REMOVE_ATTEMPTS,
            remove_retry_delay: DEFAULT_REMOVE_RETRY_DELAY,
        }
    }
}

impl Config {
    /// Construct a Config with an explicit stash base; other fields use defaults.
    pub fn new(stash_base: impl Into<PathBuf>) -> Self {
        Self {
            stash_base: stash_base.into(),
            ..Default::default()
        }
    }

    /// Hidden-storage directory for a named stash: `<stash_base>/<name>`.
    ///
    /// `name` must be one plain path segment so the result always stays inside
    /// `stash_base` (`purge` removes it recursively).
    pub fn hidden_dir_for(&self, name: &str) -> Result<PathBuf> {
        let mut parts = Path::new(name).components();
        let single_normal = matches!((parts.next(), parts.next()), (Some(Component::Normal(_)), None));
        if !single_normal || name.contains(is_separator) {
            bail!("invalid stash name '{name}': use a single directory name (no separators, '.' or '..')");
        }
        Ok(self.stash_base.join(name))
    }
}
