//! Failure kinds for reading the package databases.
//!
//! Neither kind is fatal: the resolver substitutes an empty result for the
//! affected database and keeps the error around as a diagnostic.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    /// The database file does not exist.
    #[error("Could not find {}", .path.display())]
    MissingFile { path: PathBuf },

    /// The file exists but could not be opened or read to the end.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SourceError {
    /// Classify a raw I/O error for `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Classify an error coming out of the runtime layer.
    ///
    /// Errors that do not wrap an [`io::Error`] are reported as
    /// [`SourceError::Io`] with the message preserved.
    pub fn from_runtime(path: &Path, err: anyhow::Error) -> Self {
        match err.downcast::<io::Error>() {
            Ok(source) => Self::from_io(path, source),
            Err(other) => Self::Io {
                path: path.to_path_buf(),
                source: io::Error::other(other.to_string()),
            },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::MissingFile { path } | Self::Io { path, .. } => path,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingFile { .. })
    }
}
