//! Cluster client resolution.
//!
//! Tries the local kubeconfig first, then the in-cluster service account.
//! Failing both is fatal for the process.

use kube::Client;
use kube::config::{Config, KubeConfigOptions};
use thiserror::Error;
use tracing::info;

use crate::catalog::BoxError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no usable kubeconfig ({kubeconfig}) and no in-cluster identity ({in_cluster})")]
    NoConfig {
        kubeconfig: BoxError,
        #[source]
        in_cluster: BoxError,
    },

    #[error("failed to build cluster client: {0}")]
    Build(#[from] kube::Error),
}

/// Build a client from kubeconfig, falling back to in-cluster config.
pub async fn resolve_client() -> Result<Client, ClientError> {
    let kubeconfig = Config::from_kubeconfig(&KubeConfigOptions::default()).await;
    let config = select_config(kubeconfig, Config::incluster)?;
    Ok(Client::try_from(config)?)
}

/// Pick the kubeconfig result if it loaded, otherwise try `in_cluster`.
///
/// `in_cluster` is only called when the kubeconfig failed.
pub fn select_config<K, I>(
    kubeconfig: Result<Config, K>,
    in_cluster: impl FnOnce() -> Result<Config, I>,
) -> Result<Config, ClientError>
where
    K: Into<BoxError> + std::fmt::Display,
    I: Into<BoxError>,
{
    match kubeconfig {
        Ok(config) => {
            info!(cluster_url = %config.cluster_url, "using kubeconfig");
            Ok(config)
        }
        Err(kubeconfig) => {
            info!(error = %kubeconfig, "no kubeconfig found, using in-cluster config");
            let config = in_cluster().map_err(|in_cluster| ClientError::NoConfig {
                kubeconfig: kubeconfig.into(),
                in_cluster: in_cluster.into(),
            })?;
            info!(cluster_url = %config.cluster_url, "using in-cluster config");
            Ok(config)
        }
    }
}
