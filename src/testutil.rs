//! Fixtures for command tests.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;

use crate::Context;
use crate::commands::session::Session;
use crate::config::SpecFile;
use kubeauth::{AwsCliDescriber, ClusterDescriber};

static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that write scripts and spawn them (ETXTBSY).
pub fn spawn_guard() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Echoes its arguments and KUBECONFIG.
pub const ECHO_SCRIPT: &str = r#"echo "args: $*"
echo "kubeconfig: ${KUBECONFIG:-unset}""#;

/// Reports a pending change on diff and succeeds on everything else.
pub const CHANGES_SCRIPT: &str = r#"case "$1" in
  diff) echo "+ replicas: 3"; exit 2 ;;
  apply) echo "UPDATED RELEASES"; exit 0 ;;
  version) echo "Version: v0.169.1"; exit 0 ;;
  *) echo "ok $*"; exit 0 ;;
esac"#;

/// Reports no changes on diff.
pub const CLEAN_SCRIPT: &str = r#"case "$1" in
  diff) exit 0 ;;
  *) echo "ok $*"; exit 0 ;;
esac"#;

/// Fails every operation.
pub const FAILING_SCRIPT: &str = r#"echo "Error: release web failed" 1>&2
exit 1"#;

#[cfg(unix)]
fn fake_helmfile(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("helmfile");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A spec directory with a fake helmfile and an explicit kubeconfig
pub struct Fixture {
    pub tmp: TempDir,
    pub helmfile: PathBuf,
}

impl Fixture {
    pub fn new(script: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let helmfile = fake_helmfile(tmp.path(), script);
        Self { tmp, helmfile }
    }

    pub fn spec(&self) -> SpecFile {
        let mut spec = SpecFile {
            source_dir: self.tmp.path().to_path_buf(),
            ..Default::default()
        };
        let rs = &mut spec.release_set;
        rs.content = "releases:\n- name: web\n  chart: bitnami/nginx\n".to_string();
        rs.values = vec!["replicas: 2".to_string()];
        rs.working_directory = "work".to_string();
        rs.kubeconfig = "kubeconfig".to_string();
        rs.bin = self.helmfile.to_string_lossy().into_owned();
        spec
    }

    /// Write the spec to `helmwright.toml`
    pub fn write_spec(&self, spec: &SpecFile) {
        std::fs::write(self.spec_path(), toml::to_string_pretty(spec).unwrap()).unwrap();
    }

    pub fn spec_path(&self) -> PathBuf {
        self.tmp.path().join("helmwright.toml")
    }

    pub fn kubeconfig(&self) -> PathBuf {
        self.tmp.path().join("kubeconfig")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.tmp.path().join("work")
    }

    /// Describer that must never be reached
    pub fn describer(&self) -> Box<dyn ClusterDescriber> {
        Box::new(AwsCliDescriber::with_path(
            self.tmp.path().join("no-aws").to_string_lossy(),
            "",
        ))
    }

    pub fn session(&self) -> Session {
        Session::open_with(self.spec(), self.describer()).unwrap()
    }

    pub fn context(&self) -> Context {
        Context {
            verbose: 0,
            quiet: true,
            spec: self.spec_path(),
        }
    }
}
