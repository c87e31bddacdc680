//! Verify XML config is parsed and used without touching user state.

use std::fs;
use std::time::Duration;
use tempfile::tempdir;

use dir_stash::{load_config_from_xml_path, CollisionPolicy, LogLevel};

#[test]
fn reads_config_xml_and_applies_values() {
    let td = tempdir().expect("create tempdir");

    let cfg_path = td.path().join("config.xml");
    let stash_base = td.path().join("stash");
    let log_file = td.path().join("dir_stash.log");

    let xml = format!(
        r#"
<config>
  <stash_base>{}</stash_base>
  <on_collision>overwrite</on_collision>
  <log_level>info</log_level>
  <log_file>{}</log_file>
  <remove_attempts> 5 </remove_attempts>
  <remove_retry_delay_ms>10</remove_retry_delay_ms>
</config>
"#,
        stash_base.display(),
        log_file.display()
    );
    fs::write(&cfg_path, xml).expect("write config.xml");

    let cfg = load_config_from_xml_path(&cfg_path).expect("load_config_from_xml_path");

    assert_eq!(cfg.stash_base, stash_base, "stash_base mismatch");
    assert_eq!(cfg.on_collision, CollisionPolicy::Overwrite);
    assert_eq!(cfg.log_file.as_deref(), Some(log_file.as_path()), "log_file mismatch");
    assert_eq!(cfg.log_level, LogLevel::Info, "log_level mismatch");
    assert_eq!(cfg.remove_attempts, 5);
    assert_eq!(cfg.remove_retry_delay, Duration::from_millis(10));
    assert!(!cfg.dry_run, "dry_run is never read from XML");
}

#[test]
fn missing_and_empty_elements_fall_back_to_defaults() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config>\n  <log_file>   </log_file>\n</config>\n").unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    let defaults = dir_stash::Config::default();
    assert!(cfg.log_file.is_none(), "blank log_file means no file logging");
    assert_eq!(cfg.stash_base, defaults.stash_base);
    assert_eq!(cfg.on_collision, CollisionPolicy::Reject);
    assert_eq!(cfg.remove_attempts, defaults.remove_attempts);
}

#[test]
fn unknown_element_is_rejected() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config><stash_bsae>/tmp/x</stash_bsae></config>").unwrap();
    assert!(load_config_from_xml_path(&cfg_path).is_err());
}

#[test]
fn malformed_values_are_rejected() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");

    fs::write(&cfg_path, "<config><on_collision>rename</on_collision></config>").unwrap();
    assert!(load_config_from_xml_path(&cfg_path).is_err());

    fs::write(&cfg_path, "<config><remove_attempts>lots</remove_attempts></config>").unwrap();
    assert!(load_config_from_xml_path(&cfg_path).is_err());

    fs::write(&cfg_path, "<config><stash_base>").unwrap();
    assert!(load_config_from_xml_path(&cfg_path).is_err());
}
