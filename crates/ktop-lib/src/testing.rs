//! In-memory cluster used by the sampler and report tests

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    Container, Node, NodeStatus, Pod, PodSpec, ResourceRequirements, Toleration,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::api::ObjectMeta;

use crate::error::SourceError;
use crate::progress::Progress;
use crate::source::{ContainerUsage, NodeDirectory, PodMetrics, WorkloadSource};

pub fn quantities(cpu: &str, memory: &str) -> BTreeMap<String, Quantity> {
    BTreeMap::from([
        ("cpu".to_string(), Quantity(cpu.to_string())),
        ("memory".to_string(), Quantity(memory.to_string())),
    ])
}

pub fn node(name: &str, capacity: (&str, &str), allocatable: (&str, &str)) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        status: Some(NodeStatus {
            capacity: Some(quantities(capacity.0, capacity.1)),
            allocatable: Some(quantities(allocatable.0, allocatable.1)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Container spec; `None` leaves the resources block empty
pub fn container(
    name: &str,
    requests: Option<(&str, &str)>,
    limits: Option<(&str, &str)>,
) -> Container {
    let resources = if requests.is_none() && limits.is_none() {
        None
    } else {
        Some(ResourceRequirements {
            requests: requests.map(|(cpu, mem)| quantities(cpu, mem)),
            limits: limits.map(|(cpu, mem)| quantities(cpu, mem)),
            ..Default::default()
        })
    };
    Container {
        name: name.to_string(),
        resources,
        ..Default::default()
    }
}

pub fn pod(namespace: &str, name: &str, containers: Vec<Container>) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers,
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn with_toleration(mut pod: Pod, key: &str, value: &str) -> Pod {
    if let Some(spec) = pod.spec.as_mut() {
        spec.tolerations.get_or_insert_with(Vec::new).push(Toleration {
            key: Some(key.to_string()),
            value: Some(value.to_string()),
            operator: Some("Equal".to_string()),
            effect: Some("NoSchedule".to_string()),
            ..Default::default()
        });
    }
    pod
}

pub fn metrics(namespace: &str, name: &str, usage: &[(&str, &str, &str)]) -> PodMetrics {
    PodMetrics {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        timestamp: Some("2024-03-01T10:00:00Z".to_string()),
        window: Some("15s".to_string()),
        containers: usage
            .iter()
            .map(|(container, cpu, memory)| ContainerUsage {
                name: container.to_string(),
                usage: quantities(cpu, memory),
            })
            .collect(),
    }
}

/// Cluster held entirely in memory
#[derive(Default)]
pub struct FakeCluster {
    pub nodes: Vec<Node>,
    pub fail_nodes: bool,
    pub pods: HashMap<String, Vec<Pod>>,
    pub fail_pods_on: Vec<String>,
    pub metrics: HashMap<(String, String), PodMetrics>,
}

impl FakeCluster {
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_pod(mut self, node: &str, pod: Pod, metrics: Option<PodMetrics>) -> Self {
        if let Some(metrics) = metrics {
            let key = (
                pod.metadata.namespace.clone().unwrap_or_default(),
                pod.metadata.name.clone().unwrap_or_default(),
            );
            self.metrics.insert(key, metrics);
        }
        self.pods.entry(node.to_string()).or_default().push(pod);
        self
    }
}

#[async_trait]
impl NodeDirectory for FakeCluster {
    async fn list_nodes(&self) -> Result<Vec<Node>, SourceError> {
        if self.fail_nodes {
            return Err(SourceError::Unavailable("connection refused".to_string()));
        }
        Ok(self.nodes.clone())
    }
}

#[async_trait]
impl WorkloadSource for FakeCluster {
    async fn pods_on_node(&self, node: &str) -> Result<Vec<Pod>, SourceError> {
        if self.fail_pods_on.iter().any(|n| n == node) {
            return Err(SourceError::Unavailable("pods are forbidden".to_string()));
        }
        Ok(self.pods.get(node).cloned().unwrap_or_default())
    }

    async fn pod_metrics(&self, namespace: &str, pod: &str) -> Result<PodMetrics, SourceError> {
        self.metrics
            .get(&(namespace.to_string(), pod.to_string()))
            .cloned()
            .ok_or_else(|| {
                SourceError::Unavailable(format!(
                    "podmetrics.metrics.k8s.io \"{}\" not found",
                    pod
                ))
            })
    }
}

/// Records every progress notification
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Progress for RecordingProgress {
    fn start(&self, total: u64) {
        self.events.lock().unwrap().push(format!("start {}", total));
    }

    fn advance(&self) {
        self.events.lock().unwrap().push("advance".to_string());
    }

    fn finish(&self) {
        self.events.lock().unwrap().push("finish".to_string());
    }
}
