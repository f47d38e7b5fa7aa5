//! Helmfile operations against the configured release set.

use anyhow::Result;
use declarative::{RELEASE_SET_INPUT_KEYS, truncate_diff_output};
use helmkit::{
    ApplyOptions, BuildOptions, DestroyOptions, DiffOptions, ExecutionResult, TemplateOptions,
};

use super::session::{Session, discard_kubeconfig, run_step};
use crate::Context;
use crate::cli::{ApplyArgs, BuildArgs, DiffArgs, TemplateArgs};
use crate::config::SpecFile;
use crate::state;
use crate::ui;

/// Print the in-process environment report at `-v` and above
fn show_diagnostics(ctx: &Context, result: &ExecutionResult) {
    if ctx.verbose > 0 && !result.diagnostics.is_empty() {
        ui::dim(result.diagnostics.trim_end());
    }
}

// ============================================================================
// Apply
// ============================================================================

pub fn apply(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let mut session = Session::open(ctx)?;
    let result = apply_release_set(ctx, &mut session, args)?;

    show_diagnostics(ctx, &result);
    ui::output(&result.output);
    ui::success("Release set applied");
    Ok(())
}

/// Apply and record the applied inputs
pub fn apply_release_set(
    ctx: &Context,
    session: &mut Session,
    args: &ApplyArgs,
) -> Result<ExecutionResult> {
    let opts = ApplyOptions {
        base: session.base_options(),
        concurrency: session.concurrency(),
        suppress_secrets: !args.show_secrets,
        skip_diff_on_install: !args.diff_on_install,
        release_values: args.set.iter().cloned().collect(),
    };

    let executor = &session.executor;
    let result = run_step(ctx, "Applying release set", || executor.apply(&opts))?;

    let fingerprints = state::fingerprints(&session.spec, RELEASE_SET_INPUT_KEYS)?;
    session.state.record_apply(fingerprints, &result.output);
    session.state.diff_output.clear();
    session.save()?;

    Ok(result)
}

// ============================================================================
// Diff
// ============================================================================

/// Result of a diff run
pub struct DiffOutcome {
    pub result: ExecutionResult,
    /// Diff text, truncated; empty when nothing is pending
    pub diff_text: String,
}

impl DiffOutcome {
    pub fn has_changes(&self) -> bool {
        !self.diff_text.is_empty()
    }
}

pub fn diff(ctx: &Context, args: &DiffArgs) -> Result<()> {
    let mut session = Session::open(ctx)?;
    let outcome = diff_release_set(ctx, &mut session, args)?;

    show_diagnostics(ctx, &outcome.result);
    if outcome.has_changes() {
        ui::diff(&outcome.diff_text);
        ui::info("Changes pending; run 'helmwright apply' to deploy them");
    } else {
        ui::success("No changes");
    }
    Ok(())
}

/// Diff and record the diff text
pub fn diff_release_set(
    ctx: &Context,
    session: &mut Session,
    args: &DiffArgs,
) -> Result<DiffOutcome> {
    let opts = DiffOptions {
        base: session.base_options(),
        concurrency: session.concurrency(),
        detailed_exit_code: true,
        suppress_secrets: !args.show_secrets,
        context: args.context,
        release_values: args.set.iter().cloned().collect(),
        max_diff_output_len: session.spec.release_set.max_diff_output_len,
    };

    let executor = &session.executor;
    let result = run_step(ctx, "Computing diff", || executor.diff(&opts))?;

    let diff_text = if result.changes_pending {
        truncate_diff_output(&result.output, opts.max_diff_output_len)
    } else {
        String::new()
    };

    session.state.diff_output.clone_from(&diff_text);
    session.save()?;

    Ok(DiffOutcome { result, diff_text })
}

// ============================================================================
// Template / Build
// ============================================================================

pub fn template(ctx: &Context, args: &TemplateArgs) -> Result<()> {
    let session = Session::open(ctx)?;
    let opts = TemplateOptions {
        base: session.base_options(),
        concurrency: session.concurrency(),
        include_crds: !args.skip_crds,
        output_dir: args.output_dir.clone().unwrap_or_default(),
        output_dir_template: args.output_dir_template.clone().unwrap_or_default(),
    };

    let result = run_step(ctx, "Rendering manifests", || session.executor.template(&opts))?;

    match &args.output_dir {
        Some(dir) => ui::success(&format!("Manifests written to {dir}")),
        None => println!("{}", result.output.trim_end()),
    }
    Ok(())
}

pub fn build(ctx: &Context, args: &BuildArgs) -> Result<()> {
    let session = Session::open(ctx)?;
    let opts = BuildOptions {
        base: session.base_options(),
        embed_values: args.embed_values,
    };

    let result = run_step(ctx, "Building helmfile state", || session.executor.build(&opts))?;
    println!("{}", result.output.trim_end());
    Ok(())
}

// ============================================================================
// Destroy
// ============================================================================

pub fn destroy(ctx: &Context) -> Result<()> {
    let mut session = Session::open(ctx)?;
    let result = destroy_release_set(ctx, &mut session)?;

    show_diagnostics(ctx, &result);
    ui::output(&result.output);
    ui::success("Release set destroyed");
    Ok(())
}

/// Destroy, then drop the generated kubeconfig and the recorded state
pub fn destroy_release_set(ctx: &Context, session: &mut Session) -> Result<ExecutionResult> {
    let opts = DestroyOptions {
        base: session.base_options(),
        concurrency: session.concurrency(),
    };

    let executor = &session.executor;
    let result = run_step(ctx, "Destroying release set", || executor.destroy(&opts))?;

    if let Some(path) = session.state.kubeconfig.take() {
        discard_kubeconfig(&path);
    }
    session.state.clear();
    session.save()?;

    Ok(result)
}

// ============================================================================
// Version
// ============================================================================

pub fn version(ctx: &Context) -> Result<()> {
    let spec = SpecFile::load_or_default(&ctx.spec)?;
    let executor = helmkit::executor(spec.executor.kind, &spec.release_set.bin);

    let helmfile = run_step(ctx, "Querying helmfile version", || executor.version())?;

    ui::kv("helmwright", env!("CARGO_PKG_VERSION"));
    ui::kv("helmfile", &helmfile);
    ui::kv("executor", &executor.kind().to_string());
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::state::RecordedState;
    use crate::testutil::{self, Fixture};

    fn apply_args() -> ApplyArgs {
        ApplyArgs {
            set: vec![("replicas".to_string(), "3".to_string())],
            show_secrets: false,
            diff_on_install: false,
        }
    }

    fn diff_args() -> DiffArgs {
        DiffArgs {
            set: Vec::new(),
            context: helmkit::types::DEFAULT_CONTEXT_LINES,
            show_secrets: false,
        }
    }

    #[test]
    fn test_apply_records_fingerprints() {
        let _guard = testutil::spawn_guard();
        let fixture = Fixture::new(testutil::CHANGES_SCRIPT);
        let mut session = fixture.session();

        let result = apply_release_set(&fixture.context(), &mut session, &apply_args()).unwrap();

        assert!(result.output.contains("UPDATED RELEASES"));
        let recorded = RecordedState::load(&fixture.work_dir()).unwrap();
        assert!(recorded.has_applied());
        assert!(recorded.apply_output.contains("UPDATED RELEASES"));
        assert!(recorded.fingerprints.contains_key("content"));
    }

    #[test]
    fn test_apply_failure_leaves_state_untouched() {
        let _guard = testutil::spawn_guard();
        let fixture = Fixture::new(testutil::FAILING_SCRIPT);
        let mut session = fixture.session();

        let err = apply_release_set(&fixture.context(), &mut session, &apply_args()).unwrap_err();

        assert!(err.to_string().contains("apply"));
        let recorded = RecordedState::load(&fixture.work_dir()).unwrap();
        assert!(!recorded.has_applied());
    }

    #[test]
    fn test_diff_records_pending_changes() {
        let _guard = testutil::spawn_guard();
        let fixture = Fixture::new(testutil::CHANGES_SCRIPT);
        let mut session = fixture.session();

        let outcome = diff_release_set(&fixture.context(), &mut session, &diff_args()).unwrap();

        assert!(outcome.has_changes());
        assert!(outcome.diff_text.contains("+ replicas: 3"));
        let recorded = RecordedState::load(&fixture.work_dir()).unwrap();
        assert_eq!(recorded.diff_output, outcome.diff_text);
    }

    #[test]
    fn test_diff_without_changes_is_empty() {
        let _guard = testutil::spawn_guard();
        let fixture = Fixture::new(testutil::CLEAN_SCRIPT);
        let mut session = fixture.session();

        let outcome = diff_release_set(&fixture.context(), &mut session, &diff_args()).unwrap();

        assert!(!outcome.has_changes());
        assert_eq!(outcome.result.exit_code, 0);
    }

    #[test]
    fn test_diff_output_truncated() {
        let _guard = testutil::spawn_guard();
        let fixture = Fixture::new(testutil::CHANGES_SCRIPT);
        let mut spec = fixture.spec();
        spec.release_set.max_diff_output_len = 4;
        let mut session = Session::open_with(spec, fixture.describer()).unwrap();

        let outcome = diff_release_set(&fixture.context(), &mut session, &diff_args()).unwrap();

        assert!(outcome.diff_text.starts_with("+ re"));
        assert!(outcome.diff_text.contains("truncated"));
    }

    #[test]
    fn test_apply_clears_previous_diff() {
        let _guard = testutil::spawn_guard();
        let fixture = Fixture::new(testutil::CHANGES_SCRIPT);
        let mut session = fixture.session();
        let ctx = fixture.context();

        diff_release_set(&ctx, &mut session, &diff_args()).unwrap();
        apply_release_set(&ctx, &mut session, &apply_args()).unwrap();

        let recorded = RecordedState::load(&fixture.work_dir()).unwrap();
        assert!(recorded.diff_output.is_empty());
    }

    #[test]
    fn test_destroy_clears_state() {
        let _guard = testutil::spawn_guard();
        let fixture = Fixture::new(testutil::CHANGES_SCRIPT);
        let mut session = fixture.session();
        let ctx = fixture.context();
        apply_release_set(&ctx, &mut session, &apply_args()).unwrap();

        let generated = fixture.work_dir().join(".helmwright-kubeconfig-prod-test");
        std::fs::write(&generated, "apiVersion: v1\n").unwrap();
        session.state.kubeconfig = Some(generated.clone());

        destroy_release_set(&ctx, &mut session).unwrap();

        assert!(!generated.exists());
        let recorded = RecordedState::load(&fixture.work_dir()).unwrap();
        assert!(!recorded.has_applied());
        assert!(recorded.kubeconfig.is_none());
    }

    #[test]
    fn test_destroy_tolerates_missing_kubeconfig() {
        let _guard = testutil::spawn_guard();
        let fixture = Fixture::new(testutil::CHANGES_SCRIPT);
        let mut session = fixture.session();
        session.state.kubeconfig = Some(fixture.work_dir().join(".helmwright-kubeconfig-gone"));

        assert!(destroy_release_set(&fixture.context(), &mut session).is_ok());
    }
}
