//! Normalization of raw invocation results.
//!
//! Both execution strategies funnel their outcome through [`normalize`] so
//! callers see one rule regardless of how helmfile was run.

use crate::error::{Error, Result};
use crate::types::{ExecutionResult, Operation};
use regex::Regex;
use std::sync::LazyLock;

/// Exit code `helmfile diff --detailed-exitcode` uses for "changes detected".
pub const CHANGES_DETECTED_EXIT_CODE: i32 = 2;

static SEMVER_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"v?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.\-]+)?(?:\+[0-9A-Za-z.\-]+)?)").ok()
});

/// Turn a raw result into the uniform outcome.
///
/// - exit 0 is success
/// - diff with a detailed exit code and exit 2 is success with changes pending
/// - anything else is [`Error::Failed`] carrying the output
pub fn normalize(
    operation: Operation,
    mut result: ExecutionResult,
    detailed_exit_code: bool,
) -> Result<ExecutionResult> {
    if result.exit_code == 0 {
        return Ok(result);
    }

    if operation == Operation::Diff
        && detailed_exit_code
        && result.exit_code == CHANGES_DETECTED_EXIT_CODE
    {
        result.changes_pending = true;
        result.error = None;
        return Ok(result);
    }

    Err(Error::Failed { operation, result })
}

/// Extract the version from `helmfile version` output.
///
/// Takes the first semantic version token with any leading `v` removed,
/// falling back to the last whitespace-separated token.
pub fn parse_version(output: &str) -> Option<String> {
    if let Some(re) = SEMVER_RE.as_ref()
        && let Some(caps) = re.captures(output)
    {
        return Some(caps[1].to_string());
    }

    output
        .split_whitespace()
        .last()
        .map(|token| token.trim_start_matches('v').to_string())
        .filter(|token| !token.is_empty())
}
