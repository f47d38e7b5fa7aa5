//! Cluster lookup through `aws eks describe-cluster`.

use crate::describe::{ClusterDescriber, ClusterDescription};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::process::Command;

/// Describer that shells out to the AWS CLI.
pub struct AwsCliDescriber {
    /// Path or name of the aws executable
    aws_path: String,
    /// Profile passed with `--profile`, empty for the ambient default
    profile: String,
}

impl AwsCliDescriber {
    /// Create a describer using `aws` from PATH.
    ///
    /// Returns an error if the AWS CLI is not installed.
    pub fn new(profile: impl Into<String>) -> Result<Self> {
        let aws_path = which::which("aws")
            .map_err(|e| Error::AwsCliNotFound(e.to_string()))?
            .to_string_lossy()
            .into_owned();
        Ok(Self {
            aws_path,
            profile: profile.into(),
        })
    }

    /// Create a describer using a specific aws executable.
    pub fn with_path(aws_path: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            aws_path: aws_path.into(),
            profile: profile.into(),
        }
    }

    fn args(&self, cluster: &str, region: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "eks",
            "describe-cluster",
            "--name",
            cluster,
            "--region",
            region,
            "--output",
            "json",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
        if !self.profile.is_empty() {
            args.push("--profile".to_string());
            args.push(self.profile.clone());
        }
        args
    }
}

impl ClusterDescriber for AwsCliDescriber {
    fn describe(&self, cluster: &str, region: &str) -> Result<ClusterDescription> {
        let output = Command::new(&self.aws_path)
            .args(self.args(cluster, region))
            .output()
            .map_err(|e| Error::Describe {
                cluster: cluster.to_string(),
                message: format!("failed to execute aws: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr, cluster, region));
        }

        parse_description(&output.stdout, cluster, region)
    }
}

#[derive(Deserialize)]
struct DescribeClusterOutput {
    cluster: Option<ClusterPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterPayload {
    endpoint: Option<String>,
    certificate_authority: Option<CertificateAuthority>,
}

#[derive(Deserialize)]
struct CertificateAuthority {
    data: Option<String>,
}

fn parse_description(stdout: &[u8], cluster: &str, region: &str) -> Result<ClusterDescription> {
    let parsed: DescribeClusterOutput =
        serde_json::from_slice(stdout).map_err(|source| Error::Parse {
            cluster: cluster.to_string(),
            source,
        })?;

    let payload = parsed.cluster.ok_or_else(|| Error::NotFound {
        cluster: cluster.to_string(),
        region: region.to_string(),
    })?;

    Ok(ClusterDescription {
        endpoint: payload.endpoint,
        ca_data: payload.certificate_authority.and_then(|ca| ca.data),
    })
}

/// Stderr markers of failures that retrying cannot fix
const AUTH_FAILURES: &[&str] = &[
    "AccessDenied",
    "UnauthorizedOperation",
    "UnrecognizedClientException",
    "InvalidClientTokenId",
    "ExpiredToken",
    "SignatureDoesNotMatch",
    "Unable to locate credentials",
    "The SSO session associated with this profile has expired",
];

fn classify_failure(stderr: &str, cluster: &str, region: &str) -> Error {
    if stderr.contains("ResourceNotFoundException") {
        return Error::NotFound {
            cluster: cluster.to_string(),
            region: region.to_string(),
        };
    }
    let message = stderr.trim().to_string();
    if AUTH_FAILURES.iter().any(|marker| stderr.contains(marker)) {
        return Error::Unauthorized {
            cluster: cluster.to_string(),
            message,
        };
    }
    Error::Describe {
        cluster: cluster.to_string(),
        message,
    }
}
