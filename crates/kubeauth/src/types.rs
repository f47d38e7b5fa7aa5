//! Core types for cluster credential provisioning.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Cluster access settings as the host configures them.
///
/// Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSettings {
    /// Explicit kubeconfig path; wins over everything else
    #[serde(default)]
    pub kubeconfig: String,
    /// EKS cluster name
    #[serde(default)]
    pub cluster_name: String,
    /// Region of the cluster
    #[serde(default)]
    pub cluster_region: String,
    /// General AWS region, used when `cluster_region` is empty
    #[serde(default)]
    pub aws_region: String,
    /// Manually supplied API server endpoint
    #[serde(default)]
    pub endpoint: String,
    /// Manually supplied base64 CA data
    #[serde(default)]
    pub ca: String,
    /// AWS profile for the token helper
    #[serde(default)]
    pub aws_profile: String,
}

impl CredentialSettings {
    /// Region to use: cluster-specific first, then the general default.
    pub fn resolved_region(&self) -> &str {
        if self.cluster_region.is_empty() {
            &self.aws_region
        } else {
            &self.cluster_region
        }
    }

    /// Whether an explicit kubeconfig path is set.
    pub fn has_explicit_path(&self) -> bool {
        !self.kubeconfig.is_empty()
    }

    /// Whether endpoint and CA were both supplied, so no lookup is needed.
    pub fn has_manual_cluster(&self) -> bool {
        !self.endpoint.is_empty() && !self.ca.is_empty()
    }
}

/// Everything needed to reach and authenticate to one EKS cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCredential {
    /// Cluster name
    pub cluster_name: String,
    /// Cluster region
    pub region: String,
    /// API server endpoint
    pub endpoint: String,
    /// Base64 CA data
    pub ca_data: String,
    /// AWS profile for `aws eks get-token`, empty for the ambient default
    pub aws_profile: String,
}

/// Lifecycle of a generated credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionState {
    /// Nothing generated
    NoCredential,
    /// Looking up the cluster
    Discovering,
    /// Credential file written
    Generated(PathBuf),
    /// Credential file removed
    CleanedUp,
}

/// Kubeconfig to hand to helmfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kubeconfig {
    /// Path to the file
    pub path: PathBuf,
    /// Whether the file was generated here and must be cleaned up
    pub generated: bool,
}

/// Configuration for retry behavior of cluster lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_factor: f64,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    /// Lookups are not retried unless configured.
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryConfig {
    /// Create a new retry config with custom settings.
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff_factor,
            max_delay: Duration::from_secs(30),
        }
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Create a config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_secs(2),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}
