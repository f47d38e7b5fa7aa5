//! Cluster lookup.
//!
//! The [`ClusterDescriber`] trait is the one call made to the cloud control
//! plane, allowing for different implementations (AWS CLI, mock for testing).

pub mod aws_cli;

pub use aws_cli::AwsCliDescriber;

use crate::error::{Error, Result};
use crate::retry::{self, RetryCallback};
use crate::types::{ClusterCredential, RetryConfig};

/// Raw cluster description; fields may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterDescription {
    /// API server endpoint
    pub endpoint: Option<String>,
    /// Base64 CA data
    pub ca_data: Option<String>,
}

/// Describes a cluster by name and region.
pub trait ClusterDescriber: Send + Sync {
    /// Look up a cluster. Returns [`Error::NotFound`] when it does not exist.
    fn describe(&self, cluster: &str, region: &str) -> Result<ClusterDescription>;
}

/// Look up a cluster and turn its description into a credential.
///
/// Transient lookup failures are retried according to `retry`.
pub fn discover(
    describer: &dyn ClusterDescriber,
    cluster: &str,
    region: &str,
    aws_profile: &str,
    retry: &RetryConfig,
    callback: Option<&dyn RetryCallback>,
) -> Result<ClusterCredential> {
    log::debug!("Fetching EKS cluster info for cluster: {cluster} in region: {region}");

    let description = retry::with_retry(retry, callback, || describer.describe(cluster, region))?;

    let endpoint = description
        .endpoint
        .filter(|e| !e.is_empty())
        .ok_or_else(|| Error::MissingField {
            cluster: cluster.to_string(),
            field: "endpoint",
        })?;
    let ca_data = description
        .ca_data
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::MissingField {
            cluster: cluster.to_string(),
            field: "certificate authority data",
        })?;

    log::debug!("Fetched EKS cluster info: endpoint={endpoint}");

    Ok(ClusterCredential {
        cluster_name: cluster.to_string(),
        region: region.to_string(),
        endpoint,
        ca_data,
        aws_profile: aws_profile.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Describer that replays queued outcomes and counts calls.
    pub struct MockDescriber {
        outcomes: Mutex<Vec<Result<ClusterDescription>>>,
        pub calls: Mutex<u32>,
    }

    impl MockDescriber {
        pub fn new(outcomes: Vec<Result<ClusterDescription>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().rev().collect()),
                calls: Mutex::new(0),
            }
        }

        pub fn found(endpoint: &str, ca: &str) -> Self {
            Self::new(vec![Ok(ClusterDescription {
                endpoint: Some(endpoint.to_string()),
                ca_data: Some(ca.to_string()),
            })])
        }

        pub fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl ClusterDescriber for MockDescriber {
        fn describe(&self, cluster: &str, region: &str) -> Result<ClusterDescription> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes.lock().unwrap().pop().unwrap_or_else(|| {
                Err(Error::NotFound {
                    cluster: cluster.to_string(),
                    region: region.to_string(),
                })
            })
        }
    }
}
