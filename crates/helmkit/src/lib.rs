//! # helmkit
//!
//! Run helmfile operations behind one contract, either by spawning the
//! helmfile binary or by driving an embedded runtime in-process.
//!
//! This crate provides:
//! - The [`Executor`] trait with `apply`, `diff`, `template`, `destroy`,
//!   `build` and `version`
//! - [`BinaryExecutor`]: one child process per operation, combined output,
//!   cooperative cancellation
//! - [`LibraryExecutor`]: an [`App`] runtime run under a scoped process
//!   environment ([`EnvScope`])
//! - One normalization rule for exit codes, shared by both strategies
//!
//! ## Example
//!
//! ```no_run
//! use helmkit::{DiffOptions, ExecutorKind};
//!
//! let executor = helmkit::executor(ExecutorKind::Binary, "");
//!
//! let mut opts = DiffOptions::default();
//! opts.base.file = "/work/helmfile.yaml".to_string();
//! opts.detailed_exit_code = true;
//!
//! let result = executor.diff(&opts)?;
//! if result.changes_pending {
//!     println!("{}", result.output);
//! }
//! # Ok::<(), helmkit::Error>(())
//! ```
//!
//! ## Exit codes
//!
//! Exit 0 is success. A diff run with `detailed_exit_code` that exits 2 is
//! also success, flagged with [`ExecutionResult::changes_pending`]. Any other
//! non-zero exit is [`Error::Failed`], which carries the captured output.

pub mod app;
pub mod args;
pub mod backend;
pub mod capture;
pub mod env;
pub mod error;
mod process;
pub mod result;
pub mod types;

#[cfg(test)]
mod testutil;

pub use app::{App, AppError, BaseConfig, ForkingApp, OperationConfig};
pub use backend::{BinaryExecutor, Executor, LibraryExecutor, executor};
pub use capture::OutputCapture;
pub use env::{EnvScope, describe_environment, mask_value};
pub use error::{Error, ErrorCategory, Result};
pub use types::{
    ApplyOptions, BaseOptions, BuildOptions, CancelToken, DestroyOptions, DiffOptions,
    ExecutionResult, ExecutorKind, KUBECONFIG_VAR, Operation, TemplateOptions,
};
