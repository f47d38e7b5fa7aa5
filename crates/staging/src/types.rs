//! Types for staging requests and their results

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension for plain manifests
pub const MANIFEST_EXTENSION: &str = ".yaml";

/// Extension under which helmfile renders Go template markers
pub const TEMPLATE_EXTENSION: &str = ".yaml.gotmpl";

/// What to stage for one operation
#[derive(Debug, Clone, Copy)]
pub struct StageRequest<'a> {
    /// Manifest content (helmfile.yaml)
    pub content: &'a str,
    /// Inline values overlays, in merge order
    pub values: &'a [String],
    /// Directory to stage into; empty means the current directory
    pub working_dir: &'a Path,
    /// Whether template markers in the manifest should be rendered
    pub template: bool,
}

impl<'a> StageRequest<'a> {
    /// Request staging of a manifest with no overlays
    pub fn new(content: &'a str, working_dir: &'a Path) -> Self {
        Self {
            content,
            values: &[],
            working_dir,
            template: false,
        }
    }

    /// Attach values overlays
    pub fn with_values(mut self, values: &'a [String]) -> Self {
        self.values = values;
        self
    }

    /// Enable or disable template rendering
    pub fn with_template(mut self, template: bool) -> Self {
        self.template = template;
        self
    }
}

/// Files staged for one operation
///
/// Paths are absolute. Nothing here is deleted when the operation ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Absolute working directory
    pub working_dir: PathBuf,
    /// Manifest path, named by content hash
    pub manifest: PathBuf,
    /// Values overlay paths, in the order they were supplied
    pub values_files: Vec<PathBuf>,
}

impl Workspace {
    /// Manifest path as a string (lossy)
    pub fn manifest_str(&self) -> String {
        self.manifest.to_string_lossy().into_owned()
    }

    /// Values paths as strings (lossy), order preserved
    pub fn values_strs(&self) -> Vec<String> {
        self.values_files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }
}
