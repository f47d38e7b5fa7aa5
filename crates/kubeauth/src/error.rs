//! Error types for credential provisioning.
//!
//! Errors are categorized so configuration mistakes fail fast, lookups that
//! hit a transient problem can be retried, and teardown failures can be
//! downgraded to warnings by the caller.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for credential operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of credential errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Settings are incomplete or contradictory.
    Validation,
    /// The cluster does not exist.
    NotFound,
    /// The cluster description lacks required fields or could not be parsed.
    InvalidResponse,
    /// AWS rejected the credentials or denied access.
    Auth,
    /// The lookup failed on the way (transient, retryable).
    Transport,
    /// The `aws` CLI is not installed.
    ToolMissing,
    /// Local file operation failed.
    Io,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid cluster access settings",
            Self::NotFound => "Cluster not found",
            Self::InvalidResponse => "Incomplete cluster description",
            Self::Auth => "AWS credentials rejected",
            Self::Transport => "Cluster lookup failed",
            Self::ToolMissing => "AWS CLI not installed",
            Self::Io => "File operation failed",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Validation => "Set either a kubeconfig path or an EKS cluster name and region",
            Self::NotFound => "Check the cluster name, region and AWS account",
            Self::InvalidResponse => "Supply eks_cluster_endpoint and eks_cluster_ca manually",
            Self::Auth => "Refresh the AWS credentials or check the IAM permissions for eks:DescribeCluster",
            Self::Transport => "Check AWS credentials and network access, then try again",
            Self::ToolMissing => "Install the AWS CLI v2 and make sure `aws` is on PATH",
            Self::Io => "Check directory permissions and free disk space",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while provisioning cluster credentials.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither an explicit kubeconfig nor a cluster name.
    #[error("either 'kubeconfig' or 'eks_cluster_name' must be provided")]
    MissingCredentialSource,

    /// Cluster name given without any region.
    #[error("either eks_cluster_region or aws_region must be provided")]
    MissingRegion,

    /// Only one half of a manual endpoint/CA pair.
    #[error("eks_cluster_endpoint and eks_cluster_ca must be provided together")]
    IncompleteManualCluster,

    /// Cluster does not exist in the region.
    #[error("EKS cluster {cluster} not found in region {region}")]
    NotFound {
        /// Cluster name.
        cluster: String,
        /// Region searched.
        region: String,
    },

    /// Cluster description lacks a required field.
    #[error("EKS cluster {cluster} has no {field}")]
    MissingField {
        /// Cluster name.
        cluster: String,
        /// Human-readable field name.
        field: &'static str,
    },

    /// AWS denied the lookup or the credentials are missing or expired.
    #[error("not authorized to describe EKS cluster {cluster}: {message}")]
    Unauthorized {
        /// Cluster name.
        cluster: String,
        /// Cause.
        message: String,
    },

    /// Cluster lookup failed.
    #[error("describing EKS cluster {cluster}: {message}")]
    Describe {
        /// Cluster name.
        cluster: String,
        /// Cause.
        message: String,
    },

    /// Cluster description could not be parsed.
    #[error("parsing description of EKS cluster {cluster}: {source}")]
    Parse {
        /// Cluster name.
        cluster: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// `aws` not found on PATH.
    #[error("aws CLI not found: {0}")]
    AwsCliNotFound(String),

    /// Kubeconfig document could not be serialized.
    #[error("marshaling kubeconfig to YAML: {0}")]
    Render(#[from] serde_yaml::Error),

    /// Kubeconfig file could not be written.
    #[error("writing kubeconfig to {}: {source}", .path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Kubeconfig file could not be removed.
    #[error("removing kubeconfig at {}: {source}", .path.display())]
    Remove {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredentialSource | Self::MissingRegion | Self::IncompleteManualCluster => {
                ErrorCategory::Validation
            }
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MissingField { .. } | Self::Parse { .. } => ErrorCategory::InvalidResponse,
            Self::Unauthorized { .. } => ErrorCategory::Auth,
            Self::Describe { .. } => ErrorCategory::Transport,
            Self::AwsCliNotFound(_) => ErrorCategory::ToolMissing,
            Self::Render(_) | Self::Write { .. } | Self::Remove { .. } => ErrorCategory::Io,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Cluster this error concerns, if any.
    #[must_use]
    pub fn cluster(&self) -> Option<&str> {
        match self {
            Self::NotFound { cluster, .. }
            | Self::MissingField { cluster, .. }
            | Self::Unauthorized { cluster, .. }
            | Self::Describe { cluster, .. }
            | Self::Parse { cluster, .. } => Some(cluster),
            _ => None,
        }
    }
}
