//! Programmatic entry points of a helmfile runtime.
//!
//! The [`App`] trait is what the in-process executor drives. Implementations
//! read the process environment as it is while they run; the executor takes
//! care of scoping it.

pub mod config;
pub mod forking;

pub use config::{BaseConfig, OperationConfig};
pub use forking::ForkingApp;

use std::io::Write;

/// Failure reported by a runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    /// Exit status the operation ended with, if it got that far
    pub exit_code: Option<i32>,
    /// What went wrong
    pub message: String,
}

impl AppError {
    /// Operation ran and ended with a non-zero status.
    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            message: message.into(),
        }
    }

    /// Operation could not run to completion.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self {
            exit_code: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "{} (exit code {code})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for AppError {}

/// An embedded helmfile runtime.
pub trait App: Send + Sync {
    /// Run one operation, writing its log output to `out`.
    fn run(&self, config: &OperationConfig, out: &mut dyn Write) -> Result<(), AppError>;

    /// Self-reported runtime version.
    fn version(&self) -> Result<String, AppError>;
}
