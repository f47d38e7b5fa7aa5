//! Short-lived kubeconfig files for EKS clusters.
//!
//! Given either an explicit kubeconfig path or an EKS cluster reference,
//! produce a kubeconfig file helmfile can run against, and remove it when the
//! deployment is done.
//!
//! # Example
//!
//! ```no_run
//! use kubeauth::{AwsCliDescriber, CredentialSettings, Provisioner};
//! use std::path::Path;
//!
//! let settings = CredentialSettings {
//!     cluster_name: "prod".to_string(),
//!     cluster_region: "us-west-2".to_string(),
//!     ..Default::default()
//! };
//! let describer = AwsCliDescriber::new("")?;
//! let mut provisioner = Provisioner::new(Box::new(describer));
//! let kubeconfig = provisioner.provision(&settings, Path::new("."))?;
//! println!("KUBECONFIG={}", kubeconfig.path.display());
//! provisioner.teardown()?;
//! # Ok::<(), kubeauth::Error>(())
//! ```
//!
//! The generated user authenticates through `aws eks get-token`, so the AWS
//! CLI must be installed wherever the kubeconfig is used.

pub mod describe;
pub mod error;
pub mod kubeconfig;
pub mod persist;
pub mod provisioner;
pub mod retry;
pub mod types;
pub mod validate;

pub use describe::{AwsCliDescriber, ClusterDescriber, ClusterDescription, discover};
pub use error::{Error, ErrorCategory, Result};
pub use kubeconfig::render;
pub use persist::{cleanup, persist};
pub use provisioner::Provisioner;
pub use retry::{LogCallback, RetryCallback, with_retry};
pub use types::{ClusterCredential, CredentialSettings, Kubeconfig, ProvisionState, RetryConfig};
pub use validate::validate;
