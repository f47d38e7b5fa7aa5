//! Executor that runs the helmfile binary as a child process.

use crate::app::OperationConfig;
use crate::backend::Executor;
use crate::error::{Error, Result};
use crate::types::{
    ApplyOptions, BaseOptions, BuildOptions, DestroyOptions, DiffOptions, ExecutionResult,
    ExecutorKind, Operation, TemplateOptions,
};
use crate::{args, process, result};
use std::path::PathBuf;
use std::process::Command;

const DEFAULT_BINARY: &str = "helmfile";

/// Executor that spawns `helmfile` for every operation.
pub struct BinaryExecutor {
    /// Binary used when the options name none
    binary: String,
}

impl BinaryExecutor {
    /// Use `helmfile` from PATH.
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_BINARY)
    }

    /// Use a specific binary when the options name none.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn resolve(&self, configured: &str) -> Result<PathBuf> {
        let name = if configured.is_empty() {
            self.binary.as_str()
        } else {
            configured
        };
        which::which(name).map_err(|_| Error::BinaryNotFound {
            name: name.to_string(),
        })
    }

    fn run(
        &self,
        base: &BaseOptions,
        config: &OperationConfig,
        detailed_exit_code: bool,
    ) -> Result<ExecutionResult> {
        base.validate()?;

        let operation = config.operation();
        let binary = self.resolve(&base.helmfile_binary)?;
        let args = args::render(config);
        log::debug!("Running helmfile {}", args.join(" "));

        let mut command = Command::new(&binary);
        command.args(&args).envs(base.exported_environment());
        if !base.working_dir.as_os_str().is_empty() {
            command.current_dir(&base.working_dir);
        }

        let completed =
            process::run_combined(command, base.cancel.as_ref()).map_err(|source| Error::Spawn {
                binary: binary.display().to_string(),
                source,
            })?;

        if completed.cancelled {
            return Err(Error::Cancelled {
                operation,
                output: completed.output,
            });
        }

        let mut raw = ExecutionResult::new(completed.output, completed.exit_code);
        if completed.exit_code != 0 {
            raw = raw.with_error(format!("exit status {}", completed.exit_code));
        }
        result::normalize(operation, raw, detailed_exit_code)
    }
}

impl Default for BinaryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for BinaryExecutor {
    fn kind(&self) -> ExecutorKind {
        ExecutorKind::Binary
    }

    fn apply(&self, opts: &ApplyOptions) -> Result<ExecutionResult> {
        self.run(&opts.base, &OperationConfig::from(opts), false)
    }

    fn diff(&self, opts: &DiffOptions) -> Result<ExecutionResult> {
        self.run(&opts.base, &OperationConfig::from(opts), opts.detailed_exit_code)
    }

    fn template(&self, opts: &TemplateOptions) -> Result<ExecutionResult> {
        self.run(&opts.base, &OperationConfig::from(opts), false)
    }

    fn destroy(&self, opts: &DestroyOptions) -> Result<ExecutionResult> {
        self.run(&opts.base, &OperationConfig::from(opts), false)
    }

    fn build(&self, opts: &BuildOptions) -> Result<ExecutionResult> {
        self.run(&opts.base, &OperationConfig::from(opts), false)
    }

    fn version(&self) -> Result<String> {
        let binary = self.resolve("")?;
        let mut command = Command::new(&binary);
        command.arg("version");

        let completed = process::run_combined(command, None).map_err(|source| Error::Spawn {
            binary: binary.display().to_string(),
            source,
        })?;
        let raw = ExecutionResult::new(completed.output, completed.exit_code);
        let raw = result::normalize(Operation::Version, raw, false)?;

        result::parse_version(&raw.output).ok_or(Error::VersionParse { output: raw.output })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::testutil::{ECHO_SCRIPT, fake_helmfile, spawn_guard};
    use crate::types::CancelToken;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn base_with(bin: &std::path::Path) -> BaseOptions {
        BaseOptions {
            helmfile_binary: bin.to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_success() {
        let _guard = spawn_guard();
        let tmp = TempDir::new().unwrap();
        let bin = fake_helmfile(tmp.path(), ECHO_SCRIPT);

        let opts = ApplyOptions {
            base: BaseOptions {
                file: "/work/helmfile-abc.yaml".to_string(),
                kubeconfig: "/work/kc".to_string(),
                ..base_with(&bin)
            },
            concurrency: 2,
            ..Default::default()
        };

        let result = BinaryExecutor::new().apply(&opts).unwrap();

        assert_eq!(result.exit_code, 0);
        assert!(
            result
                .output
                .contains("args: apply --no-color --file /work/helmfile-abc.yaml --concurrency 2")
        );
        assert!(result.output.contains("kubeconfig: /work/kc"));
        assert!(result.output.contains("warning from stderr"));
    }

    #[test]
    fn test_environment_overlay_reaches_child() {
        let _guard = spawn_guard();
        let tmp = TempDir::new().unwrap();
        let bin = fake_helmfile(tmp.path(), ECHO_SCRIPT);

        let mut opts = DestroyOptions {
            base: base_with(&bin),
            ..Default::default()
        };
        opts.base
            .environment_variables
            .insert("AWS_PROFILE".to_string(), "deployer".to_string());

        let result = BinaryExecutor::new().destroy(&opts).unwrap();

        assert!(result.output.contains("profile: deployer"));
    }

    #[test]
    fn test_non_zero_exit_is_failed_with_output() {
        let _guard = spawn_guard();
        let tmp = TempDir::new().unwrap();
        let bin = fake_helmfile(tmp.path(), ECHO_SCRIPT);

        let mut opts = ApplyOptions {
            base: base_with(&bin),
            ..Default::default()
        };
        opts.base
            .environment_variables
            .insert("FAKE_EXIT".to_string(), "1".to_string());

        let err = BinaryExecutor::new().apply(&opts).unwrap_err();

        match err {
            Error::Failed { operation, result } => {
                assert_eq!(operation, Operation::Apply);
                assert_eq!(result.exit_code, 1);
                assert!(result.output.contains("args: apply"));
                assert_eq!(result.error.as_deref(), Some("exit status 1"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_diff_changes_detected() {
        let _guard = spawn_guard();
        let tmp = TempDir::new().unwrap();
        let bin = fake_helmfile(tmp.path(), ECHO_SCRIPT);

        let mut opts = DiffOptions {
            base: base_with(&bin),
            detailed_exit_code: true,
            ..Default::default()
        };
        opts.base
            .environment_variables
            .insert("FAKE_EXIT".to_string(), "2".to_string());

        let result = BinaryExecutor::new().diff(&opts).unwrap();

        assert!(result.changes_pending);
        assert!(result.output.contains("--detailed-exitcode"));
    }

    #[test]
    fn test_kubeconfig_conflict_fails_before_spawn() {
        let mut opts = ApplyOptions {
            base: BaseOptions {
                kubeconfig: "/work/kc".to_string(),
                helmfile_binary: "/nonexistent/helmfile".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        opts.base
            .environment_variables
            .insert("KUBECONFIG".to_string(), "/other".to_string());

        let err = BinaryExecutor::new().apply(&opts).unwrap_err();

        assert!(matches!(err, Error::KubeconfigConflict));
    }

    #[test]
    fn test_missing_binary() {
        let opts = BuildOptions {
            base: BaseOptions {
                helmfile_binary: "/nonexistent/helmfile".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let err = BinaryExecutor::new().build(&opts).unwrap_err();

        assert!(matches!(err, Error::BinaryNotFound { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_runs_in_working_dir() {
        let _guard = spawn_guard();
        let tmp = TempDir::new().unwrap();
        let bin = fake_helmfile(tmp.path(), "pwd");
        let work = tmp.path().join("work");
        std::fs::create_dir(&work).unwrap();

        let opts = TemplateOptions {
            base: BaseOptions {
                working_dir: work.clone(),
                ..base_with(&bin)
            },
            ..Default::default()
        };

        let result = BinaryExecutor::new().template(&opts).unwrap();

        let reported = PathBuf::from(result.output.trim()).canonicalize().unwrap();
        assert_eq!(reported, work.canonicalize().unwrap());
    }

    #[test]
    fn test_cancellation_kills_child() {
        let _guard = spawn_guard();
        let tmp = TempDir::new().unwrap();
        let bin = fake_helmfile(tmp.path(), "echo 'Upgrading release=web'\nexec sleep 30");

        let token = CancelToken::new();
        let opts = ApplyOptions {
            base: BaseOptions {
                cancel: Some(token.clone()),
                ..base_with(&bin)
            },
            ..Default::default()
        };

        let trip = token.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            trip.cancel();
        });

        let started = Instant::now();
        let err = BinaryExecutor::new().apply(&opts).unwrap_err();
        canceller.join().unwrap();

        assert!(matches!(err, Error::Cancelled { operation: Operation::Apply, .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_version() {
        let _guard = spawn_guard();
        let tmp = TempDir::new().unwrap();
        let bin = fake_helmfile(tmp.path(), "echo 'helmfile version v0.162.0'");

        let version = BinaryExecutor::with_binary(bin.to_string_lossy())
            .version()
            .unwrap();

        assert_eq!(version, "0.162.0");
    }

    #[test]
    fn test_version_passes_no_base_flags() {
        let _guard = spawn_guard();
        let tmp = TempDir::new().unwrap();
        let bin = fake_helmfile(
            tmp.path(),
            "[ \"$*\" = version ] && echo 'helmfile version v0.162.0'",
        );

        let version = BinaryExecutor::with_binary(bin.to_string_lossy())
            .version()
            .unwrap();

        assert_eq!(version, "0.162.0");
    }
}
