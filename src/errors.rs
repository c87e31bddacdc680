//! Typed error definitions for dir_stash.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::fs_ops::describe_io_error;

#[derive(Debug, Error)]
pub enum StashError {
    #[error("Path exists but is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Source and destination resolve to the same directory: {0}")]
    SamePath(PathBuf),

    #[error("Refusing to overwrite '{name}' in {dest_dir}: an entry with that name already exists")]
    NameCollision { name: String, dest_dir: PathBuf },

    #[error("{}", describe_io_error(op, path, source))]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not delete {} of {} matching entries in {}", failures.len(), removed + failures.len(), dir.display())]
    DeleteIncomplete {
        dir: PathBuf,
        removed: usize,
        failures: Vec<(PathBuf, io::Error)>,
    },

    #[error("Gave up removing {} after {attempts} attempts: {last}", path.display())]
    RemoveRetriesExhausted {
        path: PathBuf,
        attempts: u32,
        last: io::Error,
    },

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl StashError {
    /// Stable numeric code for structured logs and exit reporting.
    pub fn code(&self) -> u16 {
        match self {
            StashError::NotADirectory(_) => 10,
            StashError::SamePath(_) => 11,
            StashError::NameCollision { .. } => 20,
            StashError::Io { .. } => 30,
            StashError::DeleteIncomplete { .. } => 31,
            StashError::RemoveRetriesExhausted { .. } => 32,
            StashError::Interrupted => 130,
        }
    }

    /// Short machine-friendly label matching the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            StashError::NotADirectory(_) => "not_a_directory",
            StashError::SamePath(_) => "same_path",
            StashError::NameCollision { .. } => "name_collision",
            StashError::Io { .. } => "io",
            StashError::DeleteIncomplete { .. } => "delete_incomplete",
            StashError::RemoveRetriesExhausted { .. } => "remove_retries_exhausted",
            StashError::Interrupted => "interrupted",
        }
    }
}

pub type StashResult<T> = Result<T, StashError>;
