//! Runtime that forks helmfile under the current process environment.

use crate::app::{App, AppError, OperationConfig};
use crate::{args, process, result};
use std::io::Write;
use std::process::Command;

const DEFAULT_BINARY: &str = "helmfile";

/// [`App`] that runs each operation as a helmfile child process.
///
/// Unlike the binary executor it adds nothing to the child's environment:
/// the child sees exactly what the surrounding scope put in place.
#[derive(Debug, Clone, Default)]
pub struct ForkingApp {
    binary: Option<String>,
}

impl ForkingApp {
    /// Use `helmfile` from PATH unless a configuration names another binary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific helmfile binary when a configuration names none.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: Some(binary.into()),
        }
    }

    fn command(&self, configured: &str) -> Result<Command, AppError> {
        let name = if !configured.is_empty() {
            configured
        } else {
            self.binary.as_deref().unwrap_or(DEFAULT_BINARY)
        };
        let path = which::which(name)
            .map_err(|e| AppError::runtime(format!("helmfile binary not found: {name}: {e}")))?;
        Ok(Command::new(path))
    }
}

impl App for ForkingApp {
    fn run(&self, config: &OperationConfig, out: &mut dyn Write) -> Result<(), AppError> {
        let base = config.base();
        let mut command = self.command(&base.helmfile_binary)?;
        command.args(args::render(config));
        if !base.working_dir.as_os_str().is_empty() {
            command.current_dir(&base.working_dir);
        }

        let completed = process::run_combined(command, None)
            .map_err(|e| AppError::runtime(format!("failed to execute helmfile: {e}")))?;

        out.write_all(completed.output.as_bytes())
            .map_err(|e| AppError::runtime(format!("writing captured output: {e}")))?;

        if completed.exit_code == 0 {
            Ok(())
        } else {
            Err(AppError::exit(
                completed.exit_code,
                format!("helmfile {} exited with code {}", config.operation(), completed.exit_code),
            ))
        }
    }

    fn version(&self) -> Result<String, AppError> {
        let mut command = self.command("")?;
        command.arg("version");

        let completed = process::run_combined(command, None)
            .map_err(|e| AppError::runtime(format!("failed to execute helmfile: {e}")))?;
        if completed.exit_code != 0 {
            return Err(AppError::exit(completed.exit_code, completed.output));
        }

        result::parse_version(&completed.output)
            .ok_or_else(|| AppError::runtime(format!("unrecognized version output: {:?}", completed.output)))
    }
}
