//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{CollisionPolicy, Config, LogLevel};
pub use xml::{create_template_config, load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file (or a directory holding config.xml).
pub const CONFIG_ENV: &str = "DIR_STASH_CONFIG";
/// Sub-directory of the stash base used when no stash name is given.
pub const DEFAULT_STASH_NAME: &str = "default";
pub const DEFAULT_REMOVE_ATTEMPTS: u32 = 3;
pub const DEFAULT_REMOVE_RETRY_DELAY: std::time::Duration = std::time::Duration::from_millis(250);
