//! Writing and removing generated kubeconfig files.

use crate::error::{Error, Result};
use rand::RngCore;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Prefix of every generated kubeconfig file name.
pub const FILE_PREFIX: &str = ".helmwright-kubeconfig-";

fn random_suffix() -> String {
    let mut bytes = [0u8; 4];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Cluster name reduced to characters safe in a single file name
fn file_label(cluster: &str) -> String {
    let label: String = cluster
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if label.is_empty() { "cluster".to_string() } else { label }
}

fn target_dir(working_dir: &Path) -> PathBuf {
    if working_dir.as_os_str().is_empty() || working_dir == Path::new(".") {
        std::env::temp_dir()
    } else {
        working_dir.to_path_buf()
    }
}

/// Write a kubeconfig document to a fresh, owner-only file.
///
/// The file lives in `working_dir`, or the system temp directory when that
/// is empty or `.`. Its name carries a random suffix so concurrent runs for
/// the same cluster never collide. Path separators and dots in the cluster
/// name are replaced, keeping the file inside the target directory.
pub fn persist(blob: &str, working_dir: &Path, cluster: &str) -> Result<PathBuf> {
    let name = format!("{FILE_PREFIX}{}-{}", file_label(cluster), random_suffix());
    let path = target_dir(working_dir).join(name);

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let write = |path: &Path| -> io::Result<()> {
        let mut file = options.open(path)?;
        file.write_all(blob.as_bytes())?;
        file.sync_all()
    };
    write(&path).map_err(|source| Error::Write {
        path: path.clone(),
        source,
    })?;

    log::info!("Generated kubeconfig at {}", path.display());
    Ok(path)
}

/// Remove a generated kubeconfig.
///
/// An empty path or a file that is already gone is success, so calling this
/// twice is harmless. Other failures are logged and returned.
pub fn cleanup(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }

    match std::fs::remove_file(path) {
        Ok(()) => {
            log::info!("Cleaned up kubeconfig at {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => {
            log::warn!("Failed to clean up kubeconfig at {}: {source}", path.display());
            Err(Error::Remove {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
