use anyhow::{Context as AnyhowContext, Result};
use std::path::{Path, PathBuf};

use crate::Context;
use crate::config::SpecFile;
use crate::state::RecordedState;
use crate::ui;

pub fn run(ctx: &Context, path: Option<&Path>) -> Result<()> {
    match remove_kubeconfig(ctx, path)? {
        Some(removed) => ui::success(&format!("Removed {}", removed.display())),
        None => ui::info("No generated kubeconfig recorded"),
    }
    Ok(())
}

/// Remove `path`, or the kubeconfig recorded for the spec's working directory
///
/// Forgets the recorded path when it is the one removed.
pub fn remove_kubeconfig(ctx: &Context, path: Option<&Path>) -> Result<Option<PathBuf>> {
    let spec = SpecFile::load_or_default(&ctx.spec)?;
    let working_dir = spec.working_dir();
    let mut state = RecordedState::load(&working_dir)?;

    let target = match path {
        Some(p) => p.to_path_buf(),
        None => match state.kubeconfig.clone() {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    kubeauth::cleanup(&target)
        .with_context(|| format!("Failed to remove kubeconfig {}", target.display()))?;

    if state.kubeconfig.as_deref() == Some(target.as_path()) {
        state.kubeconfig = None;
        state.save(&working_dir)?;
    }

    Ok(Some(target))
}
