//! `kube`-backed implementation of the cluster data sources

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::{Api, ListParams};
use kube::Client;
use tracing::debug;

use super::{NodeDirectory, PodMetrics, WorkloadSource};
use crate::error::SourceError;

/// Node directory and workload source backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeDirectory for KubeCluster {
    async fn list_nodes(&self) -> Result<Vec<Node>, SourceError> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = nodes.list(&ListParams::default()).await?;
        debug!(count = list.items.len(), "Listed nodes");
        Ok(list.items)
    }
}

#[async_trait]
impl WorkloadSource for KubeCluster {
    async fn pods_on_node(&self, node: &str) -> Result<Vec<Pod>, SourceError> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let params = ListParams::default().fields(&format!("spec.nodeName={}", node));
        let list = pods.list(&params).await?;
        debug!(node = %node, count = list.items.len(), "Listed pods");
        Ok(list.items)
    }

    async fn pod_metrics(&self, namespace: &str, pod: &str) -> Result<PodMetrics, SourceError> {
        let metrics: Api<PodMetrics> = Api::namespaced(self.client.clone(), namespace);
        Ok(metrics.get(pod).await?)
    }
}
