//! Recorded state of the last run, kept next to the staged files.
//!
//! Holds fingerprints of the tracked inputs as of the last apply, the last
//! diff and apply outputs, and the kubeconfig generated for the working
//! directory.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::{APPLY_OUTPUT, DIFF_OUTPUT, DiffChecker, FieldReader};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

// ============================================================================
// State Structures
// ============================================================================

/// State persisted in `<working_directory>/.helmwright-state.toml`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecordedState {
    /// Last diff text
    #[serde(default)]
    pub diff_output: String,

    /// Output of the last successful apply
    #[serde(default)]
    pub apply_output: String,

    /// Kubeconfig generated for this working directory
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,

    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,

    /// BLAKE3 fingerprints of tracked inputs as of the last apply
    #[serde(default)]
    pub fingerprints: BTreeMap<String, String>,
}

impl Default for RecordedState {
    fn default() -> Self {
        Self {
            diff_output: String::new(),
            apply_output: String::new(),
            kubeconfig: None,
            last_updated: Utc::now(),
            fingerprints: BTreeMap::new(),
        }
    }
}

impl RecordedState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(working_dir: &Path) -> Result<Self> {
        let path = paths::state_file(working_dir);

        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Save state to disk
    pub fn save(&mut self, working_dir: &Path) -> Result<()> {
        self.last_updated = Utc::now();

        fs::create_dir_all(working_dir).with_context(|| {
            format!("Failed to create working directory: {}", working_dir.display())
        })?;

        let path = paths::state_file(working_dir);
        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;

        fs::write(&path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Whether an apply has ever been recorded
    pub fn has_applied(&self) -> bool {
        !self.fingerprints.is_empty()
    }

    /// Record a successful apply
    pub fn record_apply(&mut self, fingerprints: BTreeMap<String, String>, output: &str) {
        self.fingerprints = fingerprints;
        self.apply_output = output.to_string();
    }

    /// Record a new kubeconfig, returning the previous one if it differs
    pub fn replace_kubeconfig(&mut self, path: PathBuf) -> Option<PathBuf> {
        match self.kubeconfig.replace(path) {
            Some(old) if Some(&old) != self.kubeconfig.as_ref() => Some(old),
            _ => None,
        }
    }

    /// Forget everything except the timestamp
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Fingerprints
// ============================================================================

#[derive(Serialize)]
#[serde(tag = "type", content = "value")]
enum FieldValue {
    String(String),
    Bool(bool),
    Int(i64),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

fn read_field(fields: &dyn FieldReader, key: &str) -> Option<FieldValue> {
    fields
        .string(key)
        .map(FieldValue::String)
        .or_else(|| fields.bool(key).map(FieldValue::Bool))
        .or_else(|| fields.int(key).map(FieldValue::Int))
        .or_else(|| fields.string_list(key).map(FieldValue::List))
        .or_else(|| fields.string_map(key).map(FieldValue::Map))
}

/// Fingerprint every set field among `keys`
///
/// Unset fields are left out, so setting or clearing a field shows up as a
/// change.
pub fn fingerprints(fields: &dyn FieldReader, keys: &[&str]) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for key in keys {
        if let Some(value) = read_field(fields, key) {
            let canonical = serde_json::to_vec(&value)
                .with_context(|| format!("Failed to serialize field {key}"))?;
            out.insert(
                (*key).to_string(),
                blake3::hash(&canonical).to_hex().to_string(),
            );
        }
    }
    Ok(out)
}

// ============================================================================
// Planned Changes
// ============================================================================

/// Compares current fingerprints with the recorded ones
///
/// Before the first apply every tracked field counts as changed.
pub struct PlannedChanges<'a> {
    current: BTreeMap<String, String>,
    recorded: &'a RecordedState,
    computed: BTreeSet<String>,
}

impl<'a> PlannedChanges<'a> {
    pub fn new(current: BTreeMap<String, String>, recorded: &'a RecordedState) -> Self {
        Self {
            current,
            recorded,
            computed: BTreeSet::new(),
        }
    }

    /// Whether `key` was marked as known only after apply
    pub fn is_computed(&self, key: &str) -> bool {
        self.computed.contains(key)
    }
}

impl DiffChecker for PlannedChanges<'_> {
    fn has_change(&self, key: &str) -> bool {
        if !self.recorded.has_applied() {
            return true;
        }
        self.current.get(key) != self.recorded.fingerprints.get(key)
    }

    fn set_new_computed(&mut self, key: &str) -> Result<()> {
        if key != DIFF_OUTPUT && key != APPLY_OUTPUT {
            anyhow::bail!("{key} is not a computed output");
        }
        self.computed.insert(key.to_string());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
