//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Writes a commented template on request (`--init-config`).
//!
//! Notes:
//! - This module only reads/writes the config file; directory validation happens elsewhere.
//! - Unknown XML fields are rejected so typos surface instead of silently using defaults.

use anyhow::{bail, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{CollisionPolicy, Config, LogLevel};
use super::{DEFAULT_REMOVE_ATTEMPTS, DEFAULT_REMOVE_RETRY_DELAY};

use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    stash_base: Option<String>,
    on_collision: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    remove_attempts: Option<u64>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    remove_retry_delay_ms: Option<u64>,
}

// Numbers arrive as element text; tolerate surrounding whitespace, reject garbage.
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<u64>().map(Some).map_err(D::Error::custom),
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|t| !t.is_empty())
}

// Map XmlConfig -> Config, starting from defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = non_empty(parsed.stash_base.as_deref()) {
        cfg.stash_base = PathBuf::from(s);
    }
    if let Some(s) = non_empty(parsed.log_file.as_deref()) {
        cfg.log_file = Some(PathBuf::from(s));
    }
    if let Some(s) = non_empty(parsed.log_level.as_deref()) {
        cfg.log_level = s.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    if let Some(s) = non_empty(parsed.on_collision.as_deref()) {
        cfg.on_collision = s.parse::<CollisionPolicy>().map_err(anyhow::Error::msg)?;
    }
    if let Some(n) = parsed.remove_attempts {
        cfg.remove_attempts = u32::try_from(n).context("remove_attempts out of range")?;
    }
    if let Some(ms) = parsed.remove_retry_delay_ms {
        cfg.remove_retry_delay = Duration::from_millis(ms);
    }

    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in config xml '{}'", path.display()))
}

/// Load the config from `$DIR_STASH_CONFIG` or the platform default location.
/// Returns Ok(None) when the file does not exist (callers fall back to defaults).
pub fn load_config() -> Result<Option<Config>> {
    let path = default_config_path()?;
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(None);
    }
    let cfg = load_config_from_xml_path(&path)?;
    debug!(path = %path.display(), "loaded config");
    Ok(Some(cfg))
}

/// Write a commented template config to `path`. Refuses to replace an existing file
/// or to write through a symlinked ancestor.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        let _ = set_dir_mode_0700(parent);
    }

    let defaults = Config::default();
    let content = format!(
        "<!--\n  dir_stash configuration (XML)\n\n    stash_base             -> scratch root; hidden dirs default to <stash_base>/<name>\n    on_collision           -> reject | overwrite (what to do when a moved file's name is taken)\n    log_level              -> quiet | normal | info | debug\n    log_file               -> path to log file (optional; stdout/stderr still used)\n    remove_attempts        -> how many times `purge` tries to delete a stash dir\n    remove_retry_delay_ms  -> pause between those attempts\n\n  CLI flags override XML values.\n-->\n<config>\n  <stash_base>{}</stash_base>\n  <on_collision>{}</on_collision>\n  <log_level>normal</log_level>\n  <log_file></log_file>\n  <remove_attempts>{}</remove_attempts>\n  <remove_retry_delay_ms>{}</remove_retry_delay_ms>\n</config>\n",
        defaults.stash_base.display(),
        CollisionPolicy::default(),
        DEFAULT_REMOVE_ATTEMPTS,
        DEFAULT_REMOVE_RETRY_DELAY.as_millis()
    );

    write_config_secure_new_0600(path, content.as_bytes())?;
    let _ = set_file_mode_0600(path);

    info!("Created template config at {}", path.display());
    Ok(())
}
