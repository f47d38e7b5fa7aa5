//! Everything one operation needs: staged files, a kubeconfig, recorded
//! state and an executor.

use anyhow::{Context as AnyhowContext, Result};
use helmkit::{BaseOptions, Executor};
use kubeauth::{AwsCliDescriber, ClusterDescriber, Kubeconfig, Provisioner};
use staging::{StageRequest, Workspace};
use std::path::Path;

use crate::Context;
use crate::config::{SpecFile, validate_configuration};
use crate::progress;
use crate::state::RecordedState;
use crate::ui;

pub struct Session {
    pub spec: SpecFile,
    pub workspace: Workspace,
    pub kubeconfig: Kubeconfig,
    pub state: RecordedState,
    pub executor: Box<dyn Executor>,
}

impl Session {
    /// Load the spec file and prepare a session from it
    pub fn open(ctx: &Context) -> Result<Self> {
        let spec = SpecFile::load(&ctx.spec)?;
        let describer = describer_for(&spec)?;
        Self::open_with(spec, describer)
    }

    /// Prepare a session using a specific cluster describer
    pub fn open_with(spec: SpecFile, describer: Box<dyn ClusterDescriber>) -> Result<Self> {
        validate_configuration(&spec)?;

        let working_dir = spec.working_dir();
        let rs = &spec.release_set;
        let request = StageRequest::new(&rs.content, &working_dir)
            .with_values(&rs.values)
            .with_template(rs.enable_go_template);
        let workspace = staging::materialize(&request).context("Failed to stage release set")?;

        let mut state = RecordedState::load(&workspace.working_dir)?;

        let mut provisioner = Provisioner::new(describer).with_retry(spec.retry_config());
        let kubeconfig = provisioner
            .provision(&spec.credential_settings(), &workspace.working_dir)
            .context("Failed to prepare kubeconfig")?;

        if kubeconfig.generated {
            if let Some(previous) = state.replace_kubeconfig(kubeconfig.path.clone()) {
                discard_kubeconfig(&previous);
            }
            state.save(&workspace.working_dir)?;
        }

        let executor = helmkit::executor(spec.executor.kind, &spec.release_set.bin);
        log::debug!("Using {} executor", executor.kind());

        Ok(Self {
            spec,
            workspace,
            kubeconfig,
            state,
            executor,
        })
    }

    /// Options shared by every operation
    pub fn base_options(&self) -> BaseOptions {
        self.spec.base_options(&self.workspace, &self.kubeconfig.path)
    }

    pub fn concurrency(&self) -> usize {
        self.spec.release_set.concurrency
    }

    /// Persist the recorded state
    pub fn save(&mut self) -> Result<()> {
        self.state.save(&self.workspace.working_dir)
    }
}

/// Cluster describer for a spec
///
/// The AWS CLI is only required when the cluster has to be looked up.
fn describer_for(spec: &SpecFile) -> Result<Box<dyn ClusterDescriber>> {
    let settings = spec.credential_settings();
    let profile = settings.aws_profile.clone();
    if settings.has_explicit_path() || settings.has_manual_cluster() {
        return Ok(Box::new(AwsCliDescriber::with_path("aws", profile)));
    }
    let describer = AwsCliDescriber::new(profile)
        .context("The AWS CLI is required to look up the EKS cluster")?;
    Ok(Box::new(describer))
}

/// Remove a kubeconfig, downgrading failure to a warning
pub fn discard_kubeconfig(path: &Path) {
    if let Err(e) = kubeauth::cleanup(path) {
        ui::warn(&format!("Could not remove kubeconfig: {e}"));
    }
}

/// Run one helmfile operation behind a spinner
///
/// On failure the captured helmfile output is printed under the error.
pub fn run_step<T, F>(ctx: &Context, msg: &str, op: F) -> Result<T>
where
    F: FnOnce() -> helmkit::Result<T>,
{
    let pb = progress::spinner(msg, ctx.quiet);
    match op() {
        Ok(result) => {
            progress::finish_clear(&pb);
            Ok(result)
        }
        Err(e) => {
            progress::finish_error(&pb, &e.to_string());
            if let Some(output) = e.output() {
                ui::output(output);
            }
            ui::dim(e.category().advice());
            Err(e.into())
        }
    }
}
