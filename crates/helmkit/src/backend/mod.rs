//! Execution strategies for helmfile operations.
//!
//! The [`Executor`] trait is the one contract callers program against,
//! allowing for different implementations:
//! - Spawning the helmfile binary per operation
//! - Driving an embedded runtime in-process
//! - Mock implementations for testing

pub mod binary;
pub mod library;

use crate::app::ForkingApp;
use crate::error::Result;
use crate::types::{
    ApplyOptions, BuildOptions, DestroyOptions, DiffOptions, ExecutionResult, ExecutorKind,
    TemplateOptions,
};

pub use binary::BinaryExecutor;
pub use library::LibraryExecutor;

/// Contract for running helmfile operations.
pub trait Executor: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> ExecutorKind;

    /// Deploy releases.
    fn apply(&self, opts: &ApplyOptions) -> Result<ExecutionResult>;

    /// Show pending changes.
    fn diff(&self, opts: &DiffOptions) -> Result<ExecutionResult>;

    /// Render manifests.
    fn template(&self, opts: &TemplateOptions) -> Result<ExecutionResult>;

    /// Delete releases.
    fn destroy(&self, opts: &DestroyOptions) -> Result<ExecutionResult>;

    /// Validate and print the built state.
    fn build(&self, opts: &BuildOptions) -> Result<ExecutionResult>;

    /// helmfile version.
    ///
    /// Takes no [`BaseOptions`](crate::BaseOptions): only the configured
    /// helmfile runs, with the inherited environment and no flags besides
    /// `version`. Staging and kubeconfig settings do not affect the answer.
    fn version(&self) -> Result<String>;
}

/// Create the executor for `kind`.
///
/// `helmfile_binary` overrides `helmfile` from PATH when non-empty. The
/// library strategy gets the bundled [`ForkingApp`] runtime.
pub fn executor(kind: ExecutorKind, helmfile_binary: &str) -> Box<dyn Executor> {
    match kind {
        ExecutorKind::Binary => {
            if helmfile_binary.is_empty() {
                Box::new(BinaryExecutor::new())
            } else {
                Box::new(BinaryExecutor::with_binary(helmfile_binary))
            }
        }
        ExecutorKind::Library => {
            let app = if helmfile_binary.is_empty() {
                ForkingApp::new()
            } else {
                ForkingApp::with_binary(helmfile_binary)
            };
            Box::new(LibraryExecutor::new(Box::new(app)))
        }
    }
}
