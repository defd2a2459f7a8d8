//! Kubernetes client construction

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::info;

/// Connect using an explicit kubeconfig, a named context, or standard discovery
pub async fn connect(kubeconfig: Option<&str>, context: Option<String>) -> Result<Client> {
    let options = KubeConfigOptions {
        context,
        ..Default::default()
    };

    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig {}", path))?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .context("Failed to load kubeconfig")?
        }
        None if options.context.is_some() => Config::from_kubeconfig(&options)
            .await
            .context("Failed to load kubeconfig context")?,
        None => Config::infer()
            .await
            .context("Failed to infer cluster configuration")?,
    };

    info!(cluster_url = %config.cluster_url, "Connecting to cluster");
    Client::try_from(config).context("Failed to create Kubernetes client")
}
