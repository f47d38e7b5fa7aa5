//! Settings validation, run before any I/O.

use crate::error::{Error, Result};
use crate::types::CredentialSettings;

/// Check that the settings can produce a kubeconfig.
///
/// An explicit kubeconfig path is always enough. Otherwise a cluster name
/// and a region are required, and a manual endpoint needs its CA and vice
/// versa.
pub fn validate(settings: &CredentialSettings) -> Result<()> {
    if settings.has_explicit_path() {
        return Ok(());
    }

    if settings.cluster_name.is_empty() {
        return Err(Error::MissingCredentialSource);
    }

    if settings.resolved_region().is_empty() {
        return Err(Error::MissingRegion);
    }

    if settings.endpoint.is_empty() != settings.ca.is_empty() {
        return Err(Error::IncompleteManualCluster);
    }

    Ok(())
}
