//! # Staging
//!
//! Content-addressed staging of helmfile manifests and values overlays.
//!
//! Every staged file is named after the BLAKE3 hash of its content, so:
//! - staging the same content twice yields the same path
//! - distinct contents never collide
//! - concurrent identical stagings race harmlessly (same bytes, same path)
//!
//! ## Example
//!
//! ```no_run
//! use staging::StageRequest;
//! use std::path::Path;
//!
//! let values = vec!["replicas: 2".to_string()];
//! let request = StageRequest::new("releases: []", Path::new(".helmwright"))
//!     .with_values(&values)
//!     .with_template(true);
//!
//! let workspace = staging::materialize(&request)?;
//! println!("manifest at {}", workspace.manifest.display());
//! # Ok::<(), staging::Error>(())
//! ```

mod error;
mod types;

pub use error::{Error, Result};
pub use types::{MANIFEST_EXTENSION, StageRequest, TEMPLATE_EXTENSION, Workspace};

use blake3::Hasher;
use std::fs;
use std::path::{Path, PathBuf};

/// Stage the manifest and its values overlays on disk
///
/// Creates the working directory if needed. Overlays are written in the
/// order given; helmfile lets later files override earlier ones.
pub fn materialize(request: &StageRequest<'_>) -> Result<Workspace> {
    let working_dir = resolve_dir(request.working_dir)?;

    fs::create_dir_all(&working_dir).map_err(|source| Error::CreateDir {
        path: working_dir.clone(),
        source,
    })?;

    let manifest = working_dir.join(manifest_file_name(request.content, request.template));
    write_staged(&manifest, request.content)?;
    log::debug!("Staged manifest at {}", manifest.display());

    let mut values_files = Vec::with_capacity(request.values.len());
    for overlay in request.values {
        let path = working_dir.join(values_file_name(overlay));
        write_staged(&path, overlay)?;
        log::debug!("Staged values overlay at {}", path.display());
        values_files.push(path);
    }

    Ok(Workspace {
        working_dir,
        manifest,
        values_files,
    })
}

/// BLAKE3 hex digest of some content
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize().to_hex().to_string()
}

/// File name a manifest with this content is staged under
pub fn manifest_file_name(content: &str, template: bool) -> String {
    let extension = if template {
        TEMPLATE_EXTENSION
    } else {
        MANIFEST_EXTENSION
    };
    format!("helmfile-{}{}", content_hash(content.as_bytes()), extension)
}

/// File name a values overlay with this content is staged under
pub fn values_file_name(content: &str) -> String {
    format!("temp.values-{}.yaml", content_hash(content.as_bytes()))
}

fn resolve_dir(dir: &Path) -> Result<PathBuf> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    std::path::absolute(dir).map_err(|source| Error::Resolve {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_staged(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
