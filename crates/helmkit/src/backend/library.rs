//! Executor that drives an embedded helmfile runtime in-process.

use crate::app::{App, AppError, OperationConfig};
use crate::backend::Executor;
use crate::capture::OutputCapture;
use crate::env::{AWS_DEBUG_KEYS, EnvScope, describe_environment};
use crate::error::{Error, Result};
use crate::result;
use crate::types::{
    ApplyOptions, BaseOptions, BuildOptions, DestroyOptions, DiffOptions, ExecutionResult,
    ExecutorKind, Operation, TemplateOptions,
};

/// Executor backed by an [`App`].
///
/// The runtime shares this process's environment, so each call overlays the
/// configured variables and `KUBECONFIG` inside an [`EnvScope`]. Calls are
/// not cancellable once started.
pub struct LibraryExecutor {
    app: Box<dyn App>,
}

impl LibraryExecutor {
    /// Create an executor around a runtime.
    pub fn new(app: Box<dyn App>) -> Self {
        Self { app }
    }

    fn run(&self, base: &BaseOptions, config: OperationConfig) -> Result<ExecutionResult> {
        base.validate()?;

        let operation = config.operation();
        if base.is_cancelled() {
            return Err(Error::Cancelled {
                operation,
                output: String::new(),
            });
        }

        log::debug!("Running helmfile {operation} in-process");
        let mut capture = OutputCapture::new();
        let (outcome, report) = {
            let scope = EnvScope::enter(&base.exported_environment());
            let report = format!(
                "Environment for helmfile {operation} (overriding {}):\n{}",
                scope.keys().collect::<Vec<_>>().join(", "),
                describe_environment(AWS_DEBUG_KEYS)
            );
            log::debug!("{report}");
            (self.app.run(&config, &mut capture), report)
        };
        let output = capture.contents();

        let raw = match outcome {
            Ok(()) => ExecutionResult::new(output, 0),
            Err(AppError {
                exit_code: Some(code),
                message,
            }) => ExecutionResult::new(output, code).with_error(message),
            Err(AppError {
                exit_code: None,
                message,
            }) => {
                return Err(Error::Runtime {
                    operation,
                    message,
                    output,
                });
            }
        };

        result::normalize(operation, raw.with_diagnostics(report), config.detailed_exit_code())
    }
}

impl Executor for LibraryExecutor {
    fn kind(&self) -> ExecutorKind {
        ExecutorKind::Library
    }

    fn apply(&self, opts: &ApplyOptions) -> Result<ExecutionResult> {
        self.run(&opts.base, OperationConfig::from(opts))
    }

    /// Always requests the detailed exit code so pending changes come back as data.
    fn diff(&self, opts: &DiffOptions) -> Result<ExecutionResult> {
        let mut config = OperationConfig::from(opts);
        if let OperationConfig::Diff {
            detailed_exit_code, ..
        } = &mut config
        {
            *detailed_exit_code = true;
        }
        self.run(&opts.base, config)
    }

    fn template(&self, opts: &TemplateOptions) -> Result<ExecutionResult> {
        self.run(&opts.base, OperationConfig::from(opts))
    }

    fn destroy(&self, opts: &DestroyOptions) -> Result<ExecutionResult> {
        self.run(&opts.base, OperationConfig::from(opts))
    }

    fn build(&self, opts: &BuildOptions) -> Result<ExecutionResult> {
        self.run(&opts.base, OperationConfig::from(opts))
    }

    fn version(&self) -> Result<String> {
        self.app.version().map_err(|e| Error::Runtime {
            operation: Operation::Version,
            message: e.to_string(),
            output: String::new(),
        })
    }
}
