//! Cluster data sources
//!
//! The sampler and report driver only talk to the cluster through the
//! [`NodeDirectory`] and [`WorkloadSource`] traits. [`KubeCluster`]
//! implements both on top of a `kube` client.

mod cluster;
mod metrics;

pub use cluster::KubeCluster;
pub use metrics::{ContainerUsage, PodMetrics};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod};

use crate::error::SourceError;

/// Lists the nodes of the cluster
#[async_trait]
pub trait NodeDirectory: Send + Sync {
    /// All nodes, in the order the API returns them
    async fn list_nodes(&self) -> Result<Vec<Node>, SourceError>;
}

/// Pods bound to a node and their live usage
#[async_trait]
pub trait WorkloadSource: Send + Sync {
    /// Pods whose spec binds them to `node`
    async fn pods_on_node(&self, node: &str) -> Result<Vec<Pod>, SourceError>;

    /// Current per-container usage of one pod
    async fn pod_metrics(&self, namespace: &str, pod: &str) -> Result<PodMetrics, SourceError>;
}
