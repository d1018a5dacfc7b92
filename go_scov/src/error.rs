use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("failed to read coverage report {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write diagnostics: {0}")]
    Diagnostics(#[source] io::Error),
}

pub type CoverageResult<T> = Result<T, CoverageError>;

impl CoverageError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
