//! Preview of what an apply would change.
//!
//! Runs a diff, compares the tracked inputs with those recorded at the last
//! apply, and reports which outputs are only known after applying.

use anyhow::Result;
use declarative::{
    APPLY_OUTPUT, DIFF_OUTPUT, RELEASE_SET_INPUT_KEYS, Reconciliation, mark_diff_outputs,
};

use super::run::{DiffOutcome, diff_release_set};
use super::session::Session;
use crate::Context;
use crate::cli::DiffArgs;
use crate::state::{self, PlannedChanges};
use crate::ui;

const KNOWN_AFTER_APPLY: &str = "(known after apply)";

pub struct Plan {
    pub diff: DiffOutcome,
    pub reconciliation: Reconciliation,
    /// Outputs an apply would recompute
    pub known_after_apply: Vec<&'static str>,
}

impl Plan {
    pub fn is_known_after_apply(&self, key: &str) -> bool {
        self.known_after_apply.iter().any(|k| *k == key)
    }
}

pub fn run(ctx: &Context) -> Result<()> {
    let mut session = Session::open(ctx)?;
    let plan = plan_release_set(ctx, &mut session)?;

    ui::header("Plan");
    if plan.reconciliation.inputs_changed() {
        ui::kv("changed inputs", &plan.reconciliation.changed_inputs.join(", "));
    } else {
        ui::kv("changed inputs", "none");
    }

    let diff_status = if plan.is_known_after_apply(DIFF_OUTPUT) {
        KNOWN_AFTER_APPLY
    } else if plan.diff.has_changes() {
        "pending changes"
    } else {
        "no changes"
    };
    ui::kv(DIFF_OUTPUT, diff_status);
    ui::kv(
        APPLY_OUTPUT,
        if plan.is_known_after_apply(APPLY_OUTPUT) {
            KNOWN_AFTER_APPLY
        } else {
            "unchanged"
        },
    );

    if plan.diff.has_changes() {
        println!();
        ui::diff(&plan.diff.diff_text);
    }

    if plan.known_after_apply.is_empty() {
        ui::success("Release set is up to date");
    }
    Ok(())
}

/// Diff, then mark which outputs an apply would recompute
pub fn plan_release_set(ctx: &Context, session: &mut Session) -> Result<Plan> {
    let args = DiffArgs {
        set: Vec::new(),
        context: helmkit::types::DEFAULT_CONTEXT_LINES,
        show_secrets: false,
    };
    let diff = diff_release_set(ctx, session, &args)?;

    let current = state::fingerprints(&session.spec, RELEASE_SET_INPUT_KEYS)?;
    let mut planned = PlannedChanges::new(current, &session.state);
    let reconciliation =
        mark_diff_outputs(&mut planned, &diff.diff_text, RELEASE_SET_INPUT_KEYS)?;

    let known_after_apply: Vec<&'static str> = [DIFF_OUTPUT, APPLY_OUTPUT]
        .into_iter()
        .filter(|key| planned.is_computed(key))
        .collect();

    log::debug!(
        "Plan: {} changed input(s), known after apply: {:?}",
        reconciliation.changed_inputs.len(),
        known_after_apply
    );

    Ok(Plan {
        diff,
        reconciliation,
        known_after_apply,
    })
}
