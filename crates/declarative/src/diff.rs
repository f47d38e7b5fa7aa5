//! Diff reconciliation: decide which derived outputs go stale after a diff.

use crate::resource::DiffChecker;
use crate::types::{Reconciliation, Staleness};
use anyhow::{Context, Result};

/// Tracked inputs the checker reports as changed.
///
/// Keys outside `input_keys` are never consulted.
pub fn changed_inputs(checker: &dyn DiffChecker, input_keys: &[&str]) -> Vec<String> {
    input_keys
        .iter()
        .filter(|key| checker.has_change(key))
        .map(|key| (*key).to_string())
        .collect()
}

/// Mark the diff and apply outputs as computed where the diff makes them
/// unknown until apply.
///
/// When a tracked input changed, both outputs are marked: values are
/// re-rendered at apply time, so the current diff text may not be what
/// apply sees. When inputs are stable but the diff found changes, only the
/// apply output is marked. Otherwise nothing is.
pub fn mark_diff_outputs(
    checker: &mut dyn DiffChecker,
    diff_text: &str,
    input_keys: &[&str],
) -> Result<Reconciliation> {
    let changed = changed_inputs(checker, input_keys);
    let diff_present = !diff_text.is_empty();
    let staleness = Staleness::decide(!changed.is_empty(), diff_present);

    for key in staleness.stale_keys() {
        checker
            .set_new_computed(key)
            .with_context(|| format!("Failed to mark {key} as computed"))?;
    }

    Ok(Reconciliation {
        changed_inputs: changed,
        diff_present,
        staleness,
    })
}

/// Cap diff text at `max_len` bytes, cut on a character boundary.
///
/// `0` means unlimited. Truncated text ends with a marker line giving the
/// full length.
pub fn truncate_diff_output(text: &str, max_len: usize) -> String {
    if max_len == 0 || text.len() <= max_len {
        return text.to_string();
    }

    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    format!(
        "{}\n... diff output truncated ({} of {} bytes shown)",
        &text[..end],
        end,
        text.len()
    )
}
