//! Core types for diff reconciliation

use crate::keys::{APPLY_OUTPUT, DIFF_OUTPUT};
use serde::{Deserialize, Serialize};

/// Which derived outputs must be recomputed at apply time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staleness {
    /// Diff preview is unknown until apply
    pub diff_output: bool,
    /// Apply result is unknown until apply
    pub apply_output: bool,
}

impl Staleness {
    /// Decide staleness from whether tracked inputs changed and whether the
    /// diff found pending changes.
    ///
    /// | changed | diff present | diff_output | apply_output |
    /// |---|---|---|---|
    /// | yes | any | stale | stale |
    /// | no  | yes | kept  | stale |
    /// | no  | no  | kept  | kept  |
    pub fn decide(inputs_changed: bool, diff_present: bool) -> Self {
        Self {
            diff_output: inputs_changed,
            apply_output: inputs_changed || diff_present,
        }
    }

    /// Nothing needs recomputing.
    pub fn is_stable(&self) -> bool {
        !self.diff_output && !self.apply_output
    }

    /// Output keys to mark, in a fixed order.
    pub fn stale_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.diff_output {
            keys.push(DIFF_OUTPUT);
        }
        if self.apply_output {
            keys.push(APPLY_OUTPUT);
        }
        keys
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Tracked inputs that changed, in tracking order
    pub changed_inputs: Vec<String>,
    /// Whether the diff text was non-empty
    pub diff_present: bool,
    /// Resulting staleness
    pub staleness: Staleness,
}

impl Reconciliation {
    /// Whether any tracked input changed.
    pub fn inputs_changed(&self) -> bool {
        !self.changed_inputs.is_empty()
    }
}
