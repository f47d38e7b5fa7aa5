//! Error types for helmfile operations.
//!
//! Errors are categorized so callers can tell a configuration mistake
//! (fail fast) from a transport problem (retry may help) from a business
//! failure reported by helmfile itself (inspect the captured output).

use crate::types::{ExecutionResult, Operation};
use thiserror::Error;

/// Categories of helmfile errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Conflicting or invalid configuration, detected before anything runs
    Validation,
    /// Binary missing, spawn failure, runtime failure or cancellation
    Transport,
    /// helmfile ran and reported failure
    Tool,
    /// Local I/O failure
    Io,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid configuration",
            Self::Transport => "Could not run helmfile",
            Self::Tool => "helmfile reported a failure",
            Self::Io => "I/O error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Validation => "Fix the conflicting settings and run again",
            Self::Transport => "Check that helmfile is installed and on PATH",
            Self::Tool => "Read the helmfile output above for the cause",
            Self::Io => "Check file permissions and free disk space",
        }
    }
}

/// Errors that can occur while running helmfile.
#[derive(Debug, Error)]
pub enum Error {
    /// KUBECONFIG in the variable overlay while a kubeconfig is also supplied
    #[error(
        "KUBECONFIG is set in environment_variables while a kubeconfig is also configured or generated; set only one"
    )]
    KubeconfigConflict,

    /// Other invalid option
    #[error("invalid option: {message}")]
    InvalidOption {
        /// What is wrong with the option
        message: String,
    },

    /// helmfile binary not found
    #[error("helmfile binary not found: {name}")]
    BinaryNotFound {
        /// Name or path that was looked up
        name: String,
    },

    /// helmfile could not be started
    #[error("failed to execute {binary}: {source}")]
    Spawn {
        /// Resolved binary path
        binary: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Operation was cancelled while running
    #[error("helmfile {operation} was cancelled")]
    Cancelled {
        /// Operation that was cancelled
        operation: Operation,
        /// Output captured before cancellation
        output: String,
    },

    /// The in-process runtime failed without an exit status
    #[error("helmfile {operation} failed: {message}")]
    Runtime {
        /// Operation that failed
        operation: Operation,
        /// Runtime error message
        message: String,
        /// Output captured before the failure
        output: String,
    },

    /// helmfile exited with a failure code
    #[error("helmfile {operation} failed with exit code {}", .result.exit_code)]
    Failed {
        /// Operation that failed
        operation: Operation,
        /// Captured output and exit code
        result: ExecutionResult,
    },

    /// `helmfile version` printed nothing usable
    #[error("could not determine helmfile version from output: {output:?}")]
    VersionParse {
        /// Raw version output
        output: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::KubeconfigConflict | Error::InvalidOption { .. } => ErrorCategory::Validation,
            Error::BinaryNotFound { .. }
            | Error::Spawn { .. }
            | Error::Cancelled { .. }
            | Error::Runtime { .. } => ErrorCategory::Transport,
            Error::Failed { .. } | Error::VersionParse { .. } => ErrorCategory::Tool,
            Error::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Output helmfile produced before the error, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Error::Failed { result, .. } => Some(&result.output),
            Error::Cancelled { output, .. } | Error::Runtime { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Result type for helmfile operations.
pub type Result<T> = std::result::Result<T, Error>;
