//! Spec file: what to deploy and how to reach the cluster.

use anyhow::{Context, Result, bail};
use declarative::keys;
use declarative::{FieldReader, FieldReaderExt};
use helmkit::{BaseOptions, ExecutorKind, KUBECONFIG_VAR};
use kubeauth::{CredentialSettings, RetryConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;

// ============================================================================
// Spec Structures
// ============================================================================

/// Parsed `helmwright.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecFile {
    #[serde(default)]
    pub release_set: ReleaseSetSpec,

    #[serde(default)]
    pub cluster: ClusterSpec,

    #[serde(default)]
    pub executor: ExecutorSpec,

    #[serde(default)]
    pub describe_retry: RetrySpec,

    /// Directory relative paths resolve against
    #[serde(skip)]
    pub source_dir: PathBuf,
}

/// The helmfile release set to run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseSetSpec {
    /// Inline helmfile.yaml content
    pub content: String,
    /// File to read the content from when `content` is empty
    pub content_file: String,
    /// Inline values overlays, in merge order
    pub values: Vec<String>,
    /// Existing values files, merged after the overlays
    pub values_files: Vec<String>,
    pub working_directory: String,
    pub environment: String,
    pub selector: BTreeMap<String, String>,
    pub selectors: Vec<String>,
    pub concurrency: usize,
    pub environment_variables: BTreeMap<String, String>,
    /// helmfile binary
    pub bin: String,
    /// helm binary
    pub helm_bin: String,
    pub enable_go_template: bool,
    /// Explicit kubeconfig; wins over `[cluster]`
    pub kubeconfig: String,
    pub kube_context: String,
    pub namespace: String,
    /// Cap on recorded diff text, 0 for unlimited
    pub max_diff_output_len: usize,
}

/// EKS cluster to generate a kubeconfig for
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSpec {
    pub name: String,
    pub region: String,
    /// Fallback when `region` is empty
    pub aws_region: String,
    pub endpoint: String,
    pub ca: String,
    pub aws_profile: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSpec {
    pub kind: ExecutorKind,
}

/// Retry policy for cluster lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySpec {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
    pub backoff_factor: f64,
    pub max_delay_secs: u64,
}

impl Default for RetrySpec {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 2,
            backoff_factor: 2.0,
            max_delay_secs: 30,
        }
    }
}

// ============================================================================
// SpecFile Implementation
// ============================================================================

impl SpecFile {
    /// Load a spec file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read spec file: {}", path.display()))?;
        let spec = Self::parse(&content, &paths::spec_dir(path))
            .with_context(|| format!("Invalid spec file: {}", path.display()))?;
        log::debug!("Loaded spec from {}", path.display());
        Ok(spec)
    }

    /// Load a spec file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Spec file {} not found, using defaults", path.display());
            return Ok(Self {
                source_dir: paths::spec_dir(path),
                ..Default::default()
            });
        }
        Self::load(path)
    }

    /// Parse spec text; relative paths resolve against `source_dir`
    pub fn parse(text: &str, source_dir: &Path) -> Result<Self> {
        let mut spec: Self = toml::from_str(text)?;
        spec.source_dir = source_dir.to_path_buf();

        let rs = &mut spec.release_set;
        if rs.content.is_empty() && !rs.content_file.is_empty() {
            let path = paths::resolve(source_dir, &rs.content_file);
            rs.content = fs::read_to_string(&path)
                .with_context(|| format!("Could not read content file: {}", path.display()))?;
        }

        Ok(spec)
    }

    /// Working directory for staged files, generated kubeconfigs and state
    pub fn working_dir(&self) -> PathBuf {
        paths::resolve(&self.source_dir, &self.release_set.working_directory)
    }

    /// Pre-existing values files, expanded and anchored
    pub fn values_file_paths(&self) -> Vec<String> {
        self.release_set
            .values_files
            .iter()
            .map(|f| {
                paths::resolve(&self.source_dir, f)
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    /// Explicit kubeconfig path, expanded; empty when unset
    pub fn kubeconfig_path(&self) -> String {
        if self.release_set.kubeconfig.is_empty() {
            return String::new();
        }
        paths::resolve(&self.source_dir, &self.release_set.kubeconfig)
            .to_string_lossy()
            .into_owned()
    }

    /// Cluster access settings for the credential provisioner
    pub fn credential_settings(&self) -> CredentialSettings {
        credential_settings(self, self.kubeconfig_path())
    }

    /// Retry policy for cluster lookups
    pub fn retry_config(&self) -> RetryConfig {
        let retry = &self.describe_retry;
        RetryConfig {
            max_attempts: retry.max_attempts.max(1),
            base_delay: Duration::from_secs(retry.base_delay_secs),
            backoff_factor: retry.backoff_factor,
            max_delay: Duration::from_secs(retry.max_delay_secs),
        }
    }

    /// Options shared by every operation
    ///
    /// Values files are the staged overlays first, then the configured
    /// files, so configured files win in helmfile's merge.
    pub fn base_options(&self, workspace: &staging::Workspace, kubeconfig: &Path) -> BaseOptions {
        let rs = &self.release_set;
        let mut values_files = workspace.values_strs();
        values_files.extend(self.values_file_paths());

        BaseOptions {
            file: workspace.manifest_str(),
            working_dir: workspace.working_dir.clone(),
            kubeconfig: kubeconfig.to_string_lossy().into_owned(),
            kube_context: rs.kube_context.clone(),
            namespace: rs.namespace.clone(),
            environment: rs.environment.clone(),
            selector: rs.selector.clone(),
            selectors: rs.selectors.clone(),
            values_files,
            environment_variables: rs.environment_variables.clone(),
            helm_binary: rs.helm_bin.clone(),
            helmfile_binary: rs.bin.clone(),
            enable_go_template: rs.enable_go_template,
            cancel: None,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl FieldReader for SpecFile {
    fn string(&self, key: &str) -> Option<String> {
        let rs = &self.release_set;
        let cluster = &self.cluster;
        match key {
            keys::CONTENT => non_empty(&rs.content),
            keys::PATH => non_empty(&rs.content_file),
            keys::WORKING_DIRECTORY => non_empty(&rs.working_directory),
            keys::ENVIRONMENT => non_empty(&rs.environment),
            keys::BIN => non_empty(&rs.bin),
            keys::HELM_BIN => non_empty(&rs.helm_bin),
            keys::KUBECONFIG => non_empty(&rs.kubeconfig),
            keys::KUBECONTEXT => non_empty(&rs.kube_context),
            keys::NAMESPACE => non_empty(&rs.namespace),
            keys::EKS_CLUSTER_NAME => non_empty(&cluster.name),
            keys::EKS_CLUSTER_REGION => non_empty(&cluster.region),
            keys::AWS_REGION => non_empty(&cluster.aws_region),
            keys::EKS_CLUSTER_ENDPOINT => non_empty(&cluster.endpoint),
            keys::EKS_CLUSTER_CA => non_empty(&cluster.ca),
            keys::AWS_PROFILE => non_empty(&cluster.aws_profile),
            _ => None,
        }
    }

    fn bool(&self, key: &str) -> Option<bool> {
        match key {
            keys::ENABLE_GO_TEMPLATE => Some(self.release_set.enable_go_template),
            _ => None,
        }
    }

    fn int(&self, key: &str) -> Option<i64> {
        let rs = &self.release_set;
        match key {
            keys::CONCURRENCY => Some(rs.concurrency as i64),
            keys::MAX_DIFF_OUTPUT_LEN => Some(rs.max_diff_output_len as i64),
            _ => None,
        }
    }

    fn string_list(&self, key: &str) -> Option<Vec<String>> {
        let rs = &self.release_set;
        let list = match key {
            keys::VALUES => &rs.values,
            keys::VALUES_FILES => &rs.values_files,
            keys::SELECTORS => &rs.selectors,
            _ => return None,
        };
        (!list.is_empty()).then(|| list.clone())
    }

    fn string_map(&self, key: &str) -> Option<BTreeMap<String, String>> {
        let rs = &self.release_set;
        let map = match key {
            keys::SELECTOR => &rs.selector,
            keys::ENVIRONMENT_VARIABLES => &rs.environment_variables,
            _ => return None,
        };
        (!map.is_empty()).then(|| map.clone())
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Cluster access settings as a host reads them from the schema
fn credential_settings(fields: &dyn FieldReader, kubeconfig: String) -> CredentialSettings {
    CredentialSettings {
        kubeconfig,
        cluster_name: fields.string_or_empty(keys::EKS_CLUSTER_NAME),
        cluster_region: fields.string_or_empty(keys::EKS_CLUSTER_REGION),
        aws_region: fields.string_or_empty(keys::AWS_REGION),
        endpoint: fields.string_or_empty(keys::EKS_CLUSTER_ENDPOINT),
        ca: fields.string_or_empty(keys::EKS_CLUSTER_CA),
        aws_profile: fields.string_or_empty(keys::AWS_PROFILE),
    }
}

/// Check a release set configuration before any I/O
pub fn validate_configuration(fields: &dyn FieldReader) -> Result<()> {
    if fields.string(keys::CONTENT).is_none() && fields.string(keys::PATH).is_none() {
        bail!("either 'content' or 'path' must be provided");
    }

    let settings = credential_settings(fields, fields.string_or_empty(keys::KUBECONFIG));

    // Explicit or generated, the kubeconfig is exported as KUBECONFIG.
    let supplies_kubeconfig = settings.has_explicit_path() || !settings.cluster_name.is_empty();
    if supplies_kubeconfig
        && fields
            .string_map(keys::ENVIRONMENT_VARIABLES)
            .is_some_and(|vars| vars.contains_key(KUBECONFIG_VAR))
    {
        bail!(helmkit::Error::KubeconfigConflict);
    }

    kubeauth::validate(&settings)?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = r#"
[release_set]
content = "releases: []"
values = ["replicas: 2"]
values_files = ["base.yaml", "/etc/shared.yaml"]
working_directory = ".helmwright"
environment = "staging"
selector = { tier = "web" }
selectors = ["name=api"]
concurrency = 4
environment_variables = { AWS_PROFILE = "dev" }
helm_bin = "helm3"

[cluster]
name = "prod"
region = "us-west-2"

[executor]
kind = "library"

[describe_retry]
max_attempts = 3
base_delay_secs = 1
"#;

    fn full() -> SpecFile {
        SpecFile::parse(FULL, Path::new("/srv/stack")).unwrap()
    }

    #[test]
    fn test_parse_full_spec() {
        let spec = full();
        assert_eq!(spec.release_set.content, "releases: []");
        assert_eq!(spec.release_set.concurrency, 4);
        assert_eq!(spec.cluster.name, "prod");
        assert_eq!(spec.executor.kind, ExecutorKind::Library);
        assert_eq!(spec.working_dir(), PathBuf::from("/srv/stack/.helmwright"));
    }

    #[test]
    fn test_defaults() {
        let spec = SpecFile::parse("", Path::new(".")).unwrap();
        assert_eq!(spec.executor.kind, ExecutorKind::Binary);
        assert_eq!(spec.retry_config().max_attempts, 1);
        assert_eq!(spec.working_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_retry_config() {
        let retry = full().retry_config();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.base_delay, Duration::from_secs(1));
        assert_eq!(retry.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn test_content_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("helmfile.yaml"), "releases:\n- name: api\n").unwrap();

        let spec = SpecFile::parse(
            "[release_set]\ncontent_file = \"helmfile.yaml\"\n",
            tmp.path(),
        )
        .unwrap();

        assert_eq!(spec.release_set.content, "releases:\n- name: api\n");
    }

    #[test]
    fn test_missing_content_file() {
        let tmp = TempDir::new().unwrap();
        let err = SpecFile::parse("[release_set]\ncontent_file = \"nope.yaml\"\n", tmp.path())
            .unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));
    }

    #[test]
    fn test_load_or_default_missing() {
        let tmp = TempDir::new().unwrap();
        let spec = SpecFile::load_or_default(&tmp.path().join("helmwright.toml")).unwrap();
        assert!(spec.release_set.content.is_empty());
        assert_eq!(spec.source_dir, tmp.path());
    }

    #[test]
    fn test_field_reader() {
        let spec = full();
        assert_eq!(spec.string(keys::ENVIRONMENT).as_deref(), Some("staging"));
        assert_eq!(spec.string(keys::BIN), None);
        assert_eq!(spec.int(keys::CONCURRENCY), Some(4));
        assert_eq!(spec.string_list(keys::VALUES), Some(vec!["replicas: 2".to_string()]));
        assert_eq!(
            spec.string_map(keys::SELECTOR),
            Some(BTreeMap::from([("tier".to_string(), "web".to_string())]))
        );
        assert_eq!(spec.string(keys::EKS_CLUSTER_NAME).as_deref(), Some("prod"));
        assert_eq!(spec.string("unknown"), None);
    }

    #[test]
    fn test_base_options_values_order() {
        let spec = full();
        let workspace = staging::Workspace {
            working_dir: PathBuf::from("/srv/stack/.helmwright"),
            manifest: PathBuf::from("/srv/stack/.helmwright/helmfile-abc.yaml"),
            values_files: vec![PathBuf::from("/srv/stack/.helmwright/temp.values-1.yaml")],
        };

        let base = spec.base_options(&workspace, Path::new("/tmp/kc"));

        assert_eq!(
            base.values_files,
            vec![
                "/srv/stack/.helmwright/temp.values-1.yaml",
                "/srv/stack/base.yaml",
                "/etc/shared.yaml"
            ]
        );
        assert_eq!(base.kubeconfig, "/tmp/kc");
        assert_eq!(base.helm_binary, "helm3");
        assert_eq!(base.environment, "staging");
    }

    #[test]
    fn test_validate_ok() {
        assert!(validate_configuration(&full()).is_ok());
    }

    #[test]
    fn test_validate_requires_content() {
        let spec = SpecFile::parse("[cluster]\nname = \"prod\"\nregion = \"x\"\n", Path::new("."))
            .unwrap();
        let err = validate_configuration(&spec).unwrap_err();
        assert!(err.to_string().contains("'content' or 'path'"));
    }

    #[test]
    fn test_validate_requires_credential_source() {
        let spec = SpecFile::parse("[release_set]\ncontent = \"x\"\n", Path::new(".")).unwrap();
        let err = validate_configuration(&spec).unwrap_err();
        assert!(err.to_string().contains("must be provided"));
    }

    #[test]
    fn test_validate_kubeconfig_conflict() {
        let spec = SpecFile::parse(
            r#"
[release_set]
content = "x"
kubeconfig = "/home/me/.kube/config"
environment_variables = { KUBECONFIG = "/other" }
"#,
            Path::new("."),
        )
        .unwrap();
        let err = validate_configuration(&spec).unwrap_err();
        assert!(err.to_string().contains("KUBECONFIG"));
    }

    #[test]
    fn test_validate_generated_kubeconfig_conflict() {
        let spec = SpecFile::parse(
            r#"
[release_set]
content = "x"
environment_variables = { KUBECONFIG = "/tmp/x" }

[cluster]
name = "prod"
region = "us-west-2"
endpoint = "https://example"
ca = "Q0E="
"#,
            Path::new("."),
        )
        .unwrap();
        let err = validate_configuration(&spec).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<helmkit::Error>(),
            Some(helmkit::Error::KubeconfigConflict)
        ));
    }

    #[test]
    fn test_validate_lookup_cluster_conflict() {
        let mut spec = full();
        spec.release_set
            .environment_variables
            .insert(KUBECONFIG_VAR.to_string(), "/tmp/x".to_string());
        assert!(validate_configuration(&spec).is_err());
    }

    #[test]
    fn test_validate_half_manual_cluster() {
        let spec = SpecFile::parse(
            r#"
[release_set]
content = "x"

[cluster]
name = "prod"
aws_region = "us-east-1"
endpoint = "https://example"
"#,
            Path::new("."),
        )
        .unwrap();
        let err = validate_configuration(&spec).unwrap_err();
        assert!(err.to_string().contains("must be provided together"));
    }

    #[test]
    fn test_credential_settings() {
        let spec = full();
        let settings = spec.credential_settings();
        assert_eq!(settings.cluster_name, "prod");
        assert_eq!(settings.resolved_region(), "us-west-2");
        assert!(!settings.has_explicit_path());
    }
}
