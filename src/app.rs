//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the Ctrl-C handler, validates
//! settings and runs the requested stash action.

use anyhow::{bail, Context, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use dir_stash::cli::{sanitize_path, Action, Args};
use dir_stash::config::create_template_config;
use dir_stash::output as out;
use dir_stash::{
    default_config_path, load_config, remove_dir_with_retries, shutdown, Config, Relocator,
    StashError,
};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Config-file housekeeping happens before logging init.
    if args.print_config {
        let p = default_config_path()?;
        out::print_info(&format!("dir_stash config path:\n  {}\n", p.display()));
        if p.exists() {
            out::print_info("A config file exists at that location.");
        } else {
            out::print_info("No config file there yet; defaults are in use. Run with --init-config to create one.");
        }
        return Ok(());
    }
    if args.init_config {
        let p = default_config_path()?;
        create_template_config(&p)?;
        out::print_success(&format!("Template config written to: {}", p.display()));
        return Ok(());
    }

    let Some(action) = args.action.clone() else {
        bail!("no action given; use one of: hide, restore, delete, purge (see --help)");
    };

    // Defaults < XML < CLI flags.
    let mut cfg = load_config()?.unwrap_or_default();
    args.apply_overrides(&mut cfg);

    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; stopping after the current file...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .context("install Ctrl-C handler")?;
    }

    debug!(?args, "starting dir_stash");

    let result = cfg.validate().and_then(|()| run_action(&cfg, &action));
    if let Err(e) = &result {
        log_failure(e);
    }

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn entries(n: usize) -> String {
    format!("{} entr{}", n, if n == 1 { "y" } else { "ies" })
}

fn run_action(cfg: &Config, action: &Action) -> Result<()> {
    let relocator = Relocator::from_config(cfg);
    let would = |done: &str, plan: &str| if cfg.dry_run { format!("Would {plan}") } else { done.to_string() };

    match action {
        Action::Hide { dir, prefix, stash } => {
            let dir = &sanitize_path(dir);
            let hidden = stash.resolve(cfg)?;
            let moved = relocator.hide(dir, prefix.as_deref(), &hidden)?;
            out::print_success(&format!(
                "{} {} from {} into {}",
                would("Hid", "hide"),
                entries(moved.len()),
                dir.display(),
                hidden.display()
            ));
            out::print_paths(&moved);
        }
        Action::Restore { dir, prefix, stash } => {
            let dir = &sanitize_path(dir);
            let hidden = stash.resolve(cfg)?;
            let summary = relocator.restore(dir, prefix.as_deref(), &hidden)?;
            out::print_success(&format!(
                "{} {} into {}",
                would("Restored", "restore"),
                entries(summary.restored.len()),
                dir.display()
            ));
            out::print_paths(&summary.restored);
            if !summary.hidden_dir_removed && hidden.exists() {
                out::print_info(&format!("Stash directory kept (not empty): {}", hidden.display()));
            }
        }
        Action::Delete { dir, prefix } => {
            let dir = &sanitize_path(dir);
            let removed = relocator.delete_matching(dir, prefix.as_deref())?;
            out::print_success(&format!(
                "{} {} from {}",
                would("Deleted", "delete"),
                entries(removed),
                dir.display()
            ));
        }
        Action::Purge { stash } => {
            let hidden = stash.resolve(cfg)?;
            if cfg.dry_run {
                out::print_info(&format!("Would remove {}", hidden.display()));
                return Ok(());
            }
            remove_dir_with_retries(&hidden, cfg.remove_attempts, cfg.remove_retry_delay)?;
            info!(dir = %hidden.display(), "purged stash directory");
            out::print_success(&format!("Removed {}", hidden.display()));
        }
    }
    Ok(())
}

fn log_failure(e: &anyhow::Error) {
    match e.downcast_ref::<StashError>() {
        Some(se @ StashError::NameCollision { name, dest_dir }) => {
            error!(code = se.code(), kind = se.kind(), name = %name, dest = %dest_dir.display(), "Action failed")
        }
        Some(se @ StashError::DeleteIncomplete { dir, failures, .. }) => {
            for (path, err) in failures {
                error!(path = %path.display(), error = %err, "entry could not be deleted");
            }
            error!(code = se.code(), kind = se.kind(), dir = %dir.display(), failed = failures.len(), "Action failed")
        }
        Some(se) => error!(code = se.code(), kind = se.kind(), error = %se, "Action failed"),
        None => error!(error = ?e, "Action failed"),
    }
}
