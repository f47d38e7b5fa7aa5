//! Core types for helmfile operations.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable carrying the kubeconfig path to helmfile, helm and kubectl.
pub const KUBECONFIG_VAR: &str = "KUBECONFIG";

/// Default number of diff context lines.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// A helmfile operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `helmfile apply`
    Apply,
    /// `helmfile diff`
    Diff,
    /// `helmfile template`
    Template,
    /// `helmfile destroy`
    Destroy,
    /// `helmfile build`
    Build,
    /// `helmfile version`
    Version,
}

impl Operation {
    /// Subcommand name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Apply => "apply",
            Operation::Diff => "diff",
            Operation::Template => "template",
            Operation::Destroy => "destroy",
            Operation::Build => "build",
            Operation::Version => "version",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which execution strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// Spawn the helmfile binary for each operation
    #[default]
    Binary,
    /// Drive an embedded runtime inside this process
    Library,
}

impl std::fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorKind::Binary => write!(f, "binary"),
            ExecutorKind::Library => write!(f, "library"),
        }
    }
}

/// Cooperative cancellation flag shared between a caller and a running operation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options shared by every operation.
#[derive(Debug, Clone, Default)]
pub struct BaseOptions {
    /// Path to the manifest (or a directory containing one)
    pub file: String,
    /// Directory helmfile runs in
    pub working_dir: PathBuf,
    /// Kubeconfig path, exported as `KUBECONFIG`
    pub kubeconfig: String,
    /// Kubernetes context
    pub kube_context: String,
    /// Kubernetes namespace
    pub namespace: String,
    /// helmfile environment
    pub environment: String,
    /// Label selector as key/value pairs
    pub selector: BTreeMap<String, String>,
    /// Raw label selectors (OR logic)
    pub selectors: Vec<String>,
    /// State values files, in merge order
    pub values_files: Vec<String>,
    /// Extra environment variables for helmfile and its children
    pub environment_variables: BTreeMap<String, String>,
    /// Path to the helm binary
    pub helm_binary: String,
    /// Path to the helmfile binary
    pub helmfile_binary: String,
    /// Whether the manifest is rendered as a Go template
    pub enable_go_template: bool,
    /// Cancellation token
    pub cancel: Option<CancelToken>,
}

impl BaseOptions {
    /// Check for conflicting settings before anything runs.
    pub fn validate(&self) -> Result<()> {
        if !self.kubeconfig.is_empty() && self.environment_variables.contains_key(KUBECONFIG_VAR) {
            return Err(Error::KubeconfigConflict);
        }
        Ok(())
    }

    /// Variables to export to helmfile: the overlay plus `KUBECONFIG`.
    pub fn exported_environment(&self) -> BTreeMap<String, String> {
        let mut vars = self.environment_variables.clone();
        if !self.kubeconfig.is_empty() {
            vars.insert(KUBECONFIG_VAR.to_string(), self.kubeconfig.clone());
        }
        vars
    }

    /// Whether the caller has asked to cancel.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// Options for `helmfile apply`.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Shared options
    pub base: BaseOptions,
    /// Concurrent release operations (0 = helmfile default)
    pub concurrency: usize,
    /// Redact secrets in output
    pub suppress_secrets: bool,
    /// Skip the diff helmfile runs before installing new releases
    pub skip_diff_on_install: bool,
    /// Release values passed with `--set`
    pub release_values: BTreeMap<String, String>,
}

/// Options for `helmfile diff`.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Shared options
    pub base: BaseOptions,
    /// Concurrent release operations (0 = helmfile default)
    pub concurrency: usize,
    /// Exit with 2 when changes are detected
    pub detailed_exit_code: bool,
    /// Redact secrets in output
    pub suppress_secrets: bool,
    /// Context lines around each change (0 = helmfile default)
    pub context: usize,
    /// Release values passed with `--set`
    pub release_values: BTreeMap<String, String>,
    /// Truncate the recorded diff to this many bytes (0 = unlimited)
    pub max_diff_output_len: usize,
}

/// Options for `helmfile template`.
#[derive(Debug, Clone, Default)]
pub struct TemplateOptions {
    /// Shared options
    pub base: BaseOptions,
    /// Concurrent release operations (0 = helmfile default)
    pub concurrency: usize,
    /// Include CRDs in rendered output
    pub include_crds: bool,
    /// Directory to write rendered manifests into
    pub output_dir: String,
    /// Template for per-release output directories
    pub output_dir_template: String,
}

/// Options for `helmfile destroy`.
#[derive(Debug, Clone, Default)]
pub struct DestroyOptions {
    /// Shared options
    pub base: BaseOptions,
    /// Concurrent release operations (0 = helmfile default)
    pub concurrency: usize,
}

/// Options for `helmfile build`.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Shared options
    pub base: BaseOptions,
    /// Embed values inline in the built state
    pub embed_values: bool,
}

/// Snapshot of one helmfile invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Combined stdout and stderr
    pub output: String,
    /// Process exit code
    pub exit_code: i32,
    /// Error message reported alongside a non-zero exit
    pub error: Option<String>,
    /// Diff detected pending changes (detailed exit code 2)
    pub changes_pending: bool,
    /// Masked environment report from an in-process run; empty otherwise
    #[serde(default)]
    pub diagnostics: String,
}

impl ExecutionResult {
    /// Create a result from output and exit code.
    pub fn new(output: impl Into<String>, exit_code: i32) -> Self {
        Self {
            output: output.into(),
            exit_code,
            error: None,
            changes_pending: false,
            diagnostics: String::new(),
        }
    }

    /// Attach an error message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Attach an environment report.
    pub fn with_diagnostics(mut self, report: impl Into<String>) -> Self {
        self.diagnostics = report.into();
        self
    }

    /// Whether the invocation exited cleanly.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
