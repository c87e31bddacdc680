//! Ctrl-C stop flag shared by the batch operations.
//!
//! The handler installed by the binary only flips the flag; `hide`, `restore` and
//! `purge` poll it between entries so no file is ever left half-moved.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::{StashError, StashResult};

static STOP: AtomicBool = AtomicBool::new(false);

/// Ask running batches to stop after their current entry. Signal-handler safe.
pub fn request() {
    STOP.store(true, Ordering::Relaxed);
}

pub fn is_requested() -> bool {
    STOP.load(Ordering::Relaxed)
}

/// `Err(Interrupted)` once a stop was requested.
pub fn check() -> StashResult<()> {
    if is_requested() { Err(StashError::Interrupted) } else { Ok(()) }
}
