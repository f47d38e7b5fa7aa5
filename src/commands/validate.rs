use anyhow::Result;
use kubeauth::CredentialSettings;

use crate::Context;
use crate::config::{SpecFile, validate_configuration};
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let spec = SpecFile::load(&ctx.spec)?;
    validate_configuration(&spec)?;

    ui::header("Spec");
    ui::kv("file", &ctx.spec.display().to_string());
    ui::kv("working directory", &spec.working_dir().display().to_string());
    ui::kv("executor", &spec.executor.kind.to_string());
    ui::kv("credentials", &credential_source(&spec.credential_settings()));
    if !spec.release_set.values_files.is_empty() {
        ui::kv("values files", &spec.release_set.values_files.len().to_string());
    }
    ui::success("Spec is valid");
    Ok(())
}

/// Where the kubeconfig will come from
fn credential_source(settings: &CredentialSettings) -> String {
    if settings.has_explicit_path() {
        format!("kubeconfig {}", settings.kubeconfig)
    } else if settings.has_manual_cluster() {
        format!("cluster {} ({})", settings.cluster_name, settings.endpoint)
    } else {
        format!(
            "EKS cluster {} in {}",
            settings.cluster_name,
            settings.resolved_region()
        )
    }
}
