//! Error types for the staging crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while staging files on disk
#[derive(Error, Debug)]
pub enum Error {
    /// Working directory could not be created
    #[error("creating working directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Staged file could not be written
    #[error("writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Relative path could not be made absolute
    #[error("getting absolute path to {}: {source}", .path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Path the failed operation was working on
    pub fn path(&self) -> &std::path::Path {
        match self {
            Error::CreateDir { path, .. } | Error::Write { path, .. } | Error::Resolve { path, .. } => {
                path
            }
        }
    }
}

/// Result type for staging operations
pub type Result<T> = std::result::Result<T, Error>;
