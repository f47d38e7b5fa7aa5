//! Operation configuration handed to a helmfile runtime.
//!
//! One tagged enum replaces a family of per-operation provider types.
//! Everything a caller cannot set answers with a constant default.

use crate::types::{
    ApplyOptions, BaseOptions, BuildOptions, DEFAULT_CONTEXT_LINES, DestroyOptions, DiffOptions,
    Operation, TemplateOptions,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Settings every operation shares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseConfig {
    /// Manifest path
    pub file: String,
    /// Directory to run in
    pub working_dir: PathBuf,
    /// Kubeconfig path
    pub kubeconfig: String,
    /// Kubernetes context
    pub kube_context: String,
    /// Kubernetes namespace
    pub namespace: String,
    /// helmfile environment
    pub environment: String,
    /// Label selector as key/value pairs
    pub selector: BTreeMap<String, String>,
    /// Raw label selectors
    pub selectors: Vec<String>,
    /// State values files, in merge order
    pub state_values_files: Vec<String>,
    /// Path to the helm binary
    pub helm_binary: String,
    /// Path to the helmfile binary, for runtimes that fork one
    pub helmfile_binary: String,
}

impl BaseConfig {
    /// Selectors in flag form: sorted `k=v` pairs, then raw selectors.
    pub fn selector_strings(&self) -> Vec<String> {
        self.selector
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .chain(self.selectors.iter().cloned())
            .collect()
    }

    /// helmfile output is always captured, never a terminal.
    pub fn no_color(&self) -> bool {
        true
    }
}

impl From<&BaseOptions> for BaseConfig {
    fn from(opts: &BaseOptions) -> Self {
        Self {
            file: opts.file.clone(),
            working_dir: opts.working_dir.clone(),
            kubeconfig: opts.kubeconfig.clone(),
            kube_context: opts.kube_context.clone(),
            namespace: opts.namespace.clone(),
            environment: opts.environment.clone(),
            selector: opts.selector.clone(),
            selectors: opts.selectors.clone(),
            state_values_files: opts.values_files.clone(),
            helm_binary: opts.helm_binary.clone(),
            helmfile_binary: opts.helmfile_binary.clone(),
        }
    }
}

/// Configuration for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationConfig {
    Apply {
        base: BaseConfig,
        concurrency: usize,
        suppress_secrets: bool,
        skip_diff_on_install: bool,
        set: BTreeMap<String, String>,
    },
    Diff {
        base: BaseConfig,
        concurrency: usize,
        detailed_exit_code: bool,
        suppress_secrets: bool,
        context: usize,
        set: BTreeMap<String, String>,
    },
    Template {
        base: BaseConfig,
        concurrency: usize,
        include_crds: bool,
        output_dir: String,
        output_dir_template: String,
    },
    Destroy {
        base: BaseConfig,
        concurrency: usize,
    },
    Build {
        base: BaseConfig,
        embed_values: bool,
    },
}

impl OperationConfig {
    /// Which operation this configures.
    pub fn operation(&self) -> Operation {
        match self {
            Self::Apply { .. } => Operation::Apply,
            Self::Diff { .. } => Operation::Diff,
            Self::Template { .. } => Operation::Template,
            Self::Destroy { .. } => Operation::Destroy,
            Self::Build { .. } => Operation::Build,
        }
    }

    /// Shared settings.
    pub fn base(&self) -> &BaseConfig {
        match self {
            Self::Apply { base, .. }
            | Self::Diff { base, .. }
            | Self::Template { base, .. }
            | Self::Destroy { base, .. }
            | Self::Build { base, .. } => base,
        }
    }

    /// Concurrency limit (0 = runtime default).
    pub fn concurrency(&self) -> usize {
        match self {
            Self::Apply { concurrency, .. }
            | Self::Diff { concurrency, .. }
            | Self::Template { concurrency, .. }
            | Self::Destroy { concurrency, .. } => *concurrency,
            Self::Build { .. } => 0,
        }
    }

    /// Whether the diff exit code distinguishes "changes detected".
    pub fn detailed_exit_code(&self) -> bool {
        matches!(
            self,
            Self::Diff {
                detailed_exit_code: true,
                ..
            }
        )
    }

    pub fn suppress_secrets(&self) -> bool {
        match self {
            Self::Apply {
                suppress_secrets, ..
            }
            | Self::Diff {
                suppress_secrets, ..
            } => *suppress_secrets,
            _ => false,
        }
    }

    /// Diff context lines.
    pub fn context(&self) -> usize {
        match self {
            Self::Diff { context, .. } if *context > 0 => *context,
            _ => DEFAULT_CONTEXT_LINES,
        }
    }

    pub fn include_crds(&self) -> bool {
        match self {
            Self::Template { include_crds, .. } => *include_crds,
            _ => true,
        }
    }

    pub fn embed_values(&self) -> bool {
        matches!(
            self,
            Self::Build {
                embed_values: true,
                ..
            }
        )
    }

    pub fn skip_diff_on_install(&self) -> bool {
        matches!(
            self,
            Self::Apply {
                skip_diff_on_install: true,
                ..
            }
        )
    }

    /// `--set` values for apply and diff.
    pub fn release_values(&self) -> &BTreeMap<String, String> {
        static EMPTY: BTreeMap<String, String> = BTreeMap::new();
        match self {
            Self::Apply { set, .. } | Self::Diff { set, .. } => set,
            _ => &EMPTY,
        }
    }

    /// Template output directory; empty for stdout.
    pub fn output_dir(&self) -> &str {
        match self {
            Self::Template { output_dir, .. } => output_dir,
            _ => "",
        }
    }

    pub fn output_dir_template(&self) -> &str {
        match self {
            Self::Template {
                output_dir_template,
                ..
            } => output_dir_template,
            _ => "",
        }
    }
}

impl From<&ApplyOptions> for OperationConfig {
    fn from(opts: &ApplyOptions) -> Self {
        Self::Apply {
            base: (&opts.base).into(),
            concurrency: opts.concurrency,
            suppress_secrets: opts.suppress_secrets,
            skip_diff_on_install: opts.skip_diff_on_install,
            set: opts.release_values.clone(),
        }
    }
}

impl From<&DiffOptions> for OperationConfig {
    fn from(opts: &DiffOptions) -> Self {
        Self::Diff {
            base: (&opts.base).into(),
            concurrency: opts.concurrency,
            detailed_exit_code: opts.detailed_exit_code,
            suppress_secrets: opts.suppress_secrets,
            context: opts.context,
            set: opts.release_values.clone(),
        }
    }
}

impl From<&TemplateOptions> for OperationConfig {
    fn from(opts: &TemplateOptions) -> Self {
        Self::Template {
            base: (&opts.base).into(),
            concurrency: opts.concurrency,
            include_crds: opts.include_crds,
            output_dir: opts.output_dir.clone(),
            output_dir_template: opts.output_dir_template.clone(),
        }
    }
}

impl From<&DestroyOptions> for OperationConfig {
    fn from(opts: &DestroyOptions) -> Self {
        Self::Destroy {
            base: (&opts.base).into(),
            concurrency: opts.concurrency,
        }
    }
}

impl From<&BuildOptions> for OperationConfig {
    fn from(opts: &BuildOptions) -> Self {
        Self::Build {
            base: (&opts.base).into(),
            embed_values: opts.embed_values,
        }
    }
}
