//! Credential lifecycle: validate, discover, render, persist, tear down.

use crate::describe::{self, ClusterDescriber};
use crate::error::Result;
use crate::kubeconfig;
use crate::persist;
use crate::retry::LogCallback;
use crate::types::{ClusterCredential, CredentialSettings, Kubeconfig, ProvisionState, RetryConfig};
use crate::validate::validate;
use std::path::{Path, PathBuf};

/// Produces the kubeconfig a deployment runs with and removes it afterwards.
pub struct Provisioner {
    describer: Box<dyn ClusterDescriber>,
    retry: RetryConfig,
    state: ProvisionState,
}

impl Provisioner {
    /// Create a provisioner that looks clusters up through `describer`.
    pub fn new(describer: Box<dyn ClusterDescriber>) -> Self {
        Self {
            describer,
            retry: RetryConfig::default(),
            state: ProvisionState::NoCredential,
        }
    }

    /// Retry transient lookup failures.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &ProvisionState {
        &self.state
    }

    /// Resolve the kubeconfig for `settings`.
    ///
    /// An explicit path is returned as-is and nothing is generated. With a
    /// manual endpoint and CA the lookup is skipped. Otherwise the cluster is
    /// described and a credential file is written into `working_dir`.
    pub fn provision(
        &mut self,
        settings: &CredentialSettings,
        working_dir: &Path,
    ) -> Result<Kubeconfig> {
        validate(settings)?;

        if settings.has_explicit_path() {
            return Ok(Kubeconfig {
                path: PathBuf::from(&settings.kubeconfig),
                generated: false,
            });
        }

        let region = settings.resolved_region();
        let credential = if settings.has_manual_cluster() {
            log::debug!(
                "Using manually supplied endpoint for EKS cluster {}",
                settings.cluster_name
            );
            ClusterCredential {
                cluster_name: settings.cluster_name.clone(),
                region: region.to_string(),
                endpoint: settings.endpoint.clone(),
                ca_data: settings.ca.clone(),
                aws_profile: settings.aws_profile.clone(),
            }
        } else {
            self.state = ProvisionState::Discovering;
            let discovered = describe::discover(
                self.describer.as_ref(),
                &settings.cluster_name,
                region,
                &settings.aws_profile,
                &self.retry,
                Some(&LogCallback),
            );
            match discovered {
                Ok(credential) => credential,
                Err(e) => {
                    self.state = ProvisionState::NoCredential;
                    return Err(e);
                }
            }
        };

        let blob = kubeconfig::render(&credential)?;
        let path = persist::persist(&blob, working_dir, &credential.cluster_name)?;
        self.state = ProvisionState::Generated(path.clone());

        Ok(Kubeconfig {
            path,
            generated: true,
        })
    }

    /// Remove the generated credential, if any.
    pub fn teardown(&mut self) -> Result<()> {
        if let ProvisionState::Generated(path) = &self.state {
            persist::cleanup(path)?;
            self.state = ProvisionState::CleanedUp;
        }
        Ok(())
    }
}
