//! Core library for `dir_stash`.
//!
//! Moves the files of a single flat directory out of the way and back again:
//! `hide` stashes the entries matching an optional name prefix into a side directory,
//! `restore` brings them back and drops the emptied side directory, and
//! `delete_matching` clears matching entries in place. Nothing recurses into
//! subdirectories.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let profile = Path::new("/home/me/.browser/cookies");
//! let hidden = Path::new("/tmp/dir_stash/cookies");
//! dir_stash::hide(profile, Some("cookie"), hidden)?;
//! // ... run an isolated session that writes its own cookies ...
//! dir_stash::delete_matching(profile, Some("cookie"))?;
//! dir_stash::restore(profile, None, hidden)?;
//! # Ok::<(), dir_stash::StashError>(())
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;
pub mod shutdown;

pub use config::{
    default_config_path, default_log_path, load_config, load_config_from_xml_path,
    path_has_symlink_ancestor, CollisionPolicy, Config, LogLevel,
};
pub use errors::{StashError, StashResult};
pub use fs_ops::{
    delete_matching, hide, list_matching, matches_prefix, remove_dir_with_retries, restore,
    Relocator, RestoreSummary,
};
