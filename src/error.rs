use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. Anything reported through this type aborts the run; per-item
/// problems during the walk are counted as skips instead.
#[derive(Debug, Error)]
pub enum GestureError {
    #[error("gesture map file not found: {0}")]
    MapNotFound(PathBuf),

    #[error("gesture map file {0} is empty or has no valid entries")]
    EmptyMap(PathBuf),

    #[error("class table file not found: {0}")]
    ClassTableNotFound(PathBuf),

    #[error("invalid class table {path}: {message}")]
    ClassTable { path: PathBuf, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GestureError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GestureError::Io {
            path: path.into(),
            source,
        }
    }
}
