//! Shared helpers for tests that spawn processes.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that write scripts and spawn them.
///
/// A script written by one test while another test forks can fail to exec
/// with ETXTBSY.
pub fn spawn_guard() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Write an executable `/bin/sh` script standing in for helmfile.
#[cfg(unix)]
pub fn fake_helmfile(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("helmfile");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Script body that echoes its arguments and KUBECONFIG, then exits with
/// `$FAKE_EXIT` (default 0).
pub const ECHO_SCRIPT: &str = r#"echo "args: $*"
echo "kubeconfig: ${KUBECONFIG:-unset}"
echo "profile: ${AWS_PROFILE:-unset}"
echo "warning from stderr" 1>&2
exit ${FAKE_EXIT:-0}"#;
