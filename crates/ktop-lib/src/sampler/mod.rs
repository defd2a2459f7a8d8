//! Per-node resource sampling
//!
//! Pairs the live usage of every container on a node with the requests and
//! limits declared in its pod spec. Failures for a single pod are recorded
//! and sampling moves on to the next pod.


use std::sync::Arc;

use k8s_openapi::api::core::v1::{Container, Pod};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SampleError;
use crate::models::{ContainerSample, ResourceAmount};
use crate::progress::Progress;
use crate::source::{ContainerUsage, WorkloadSource};
use crate::units::{cpu_millis, memory_bytes};

/// Toleration key marking pods allowed on spot instances
pub const SPOT_TOLERATION_KEY: &str = "kubernetes.azure.com/scalesetpriority";
/// Toleration value marking pods allowed on spot instances
pub const SPOT_TOLERATION_VALUE: &str = "spot";

/// Key/value pair a pod toleration must carry to count as spot tolerant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TolerationMatch {
    pub key: String,
    pub value: String,
}

impl Default for TolerationMatch {
    fn default() -> Self {
        Self {
            key: SPOT_TOLERATION_KEY.to_string(),
            value: SPOT_TOLERATION_VALUE.to_string(),
        }
    }
}

impl TolerationMatch {
    /// Whether any toleration of the pod carries this key and value
    pub fn matches(&self, pod: &Pod) -> bool {
        pod.spec
            .as_ref()
            .and_then(|spec| spec.tolerations.as_ref())
            .map(|tolerations| {
                tolerations.iter().any(|t| {
                    t.key.as_deref() == Some(self.key.as_str())
                        && t.value.as_deref() == Some(self.value.as_str())
                })
            })
            .unwrap_or(false)
    }
}

/// What to do with usage reported for a container missing from the pod spec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Skip the entry; it is only counted and logged at debug level
    #[default]
    Drop,
    /// Skip the entry and add it to the report's error list
    Report,
}

/// Sampler settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplerConfig {
    pub spot_toleration: TolerationMatch,
    pub unmatched: UnmatchedPolicy,
}

/// Everything sampled for one node
#[derive(Debug, Default)]
pub struct NodeSamples {
    pub node: String,
    /// Pod listing order, then container order within the usage sample
    pub samples: Vec<ContainerSample>,
    pub errors: Vec<SampleError>,
    /// Usage entries skipped because no container in the spec matched
    pub unmatched: usize,
}

impl NodeSamples {
    fn new(node: &str) -> Self {
        Self {
            node: node.to_string(),
            ..Self::default()
        }
    }
}

/// Collects container samples for one node at a time
pub struct ResourceSampler {
    source: Arc<dyn WorkloadSource>,
    config: SamplerConfig,
}

impl ResourceSampler {
    pub fn new(source: Arc<dyn WorkloadSource>, config: SamplerConfig) -> Self {
        Self { source, config }
    }

    /// Sample every pod bound to `node`
    pub async fn sample_node(&self, node: &str, progress: &dyn Progress) -> NodeSamples {
        let mut result = NodeSamples::new(node);

        let pods = match self.source.pods_on_node(node).await {
            Ok(pods) => pods,
            Err(source) => {
                warn!(node = %node, error = %source, "Failed to list pods");
                result.errors.push(SampleError::ListPods {
                    node: node.to_string(),
                    source,
                });
                return result;
            }
        };

        progress.start(pods.len() as u64);
        for pod in &pods {
            progress.advance();
            self.sample_pod(pod, &mut result).await;
        }
        progress.finish();

        info!(
            node = %node,
            pods = pods.len(),
            samples = result.samples.len(),
            errors = result.errors.len(),
            unmatched = result.unmatched,
            "Sampled node"
        );
        result
    }

    async fn sample_pod(&self, pod: &Pod, result: &mut NodeSamples) {
        let name = pod.metadata.name.as_deref().unwrap_or_default();
        let namespace = pod.metadata.namespace.as_deref().unwrap_or("default");

        let metrics = match self.source.pod_metrics(namespace, name).await {
            Ok(metrics) => metrics,
            Err(source) => {
                warn!(namespace = %namespace, pod = %name, error = %source, "No metrics for pod");
                result.errors.push(SampleError::PodMetrics {
                    namespace: namespace.to_string(),
                    pod: name.to_string(),
                    source,
                });
                return;
            }
        };

        let spot_tolerant = self.config.spot_toleration.matches(pod);
        let containers = pod
            .spec
            .as_ref()
            .map(|spec| spec.containers.as_slice())
            .unwrap_or_default();

        for usage in &metrics.containers {
            let spec = containers
                .iter()
                .find(|c| !usage.name.is_empty() && c.name == usage.name);

            match spec {
                Some(spec) => result.samples.push(pair_container(
                    namespace,
                    name,
                    spec,
                    usage,
                    spot_tolerant,
                )),
                None => {
                    result.unmatched += 1;
                    debug!(
                        namespace = %namespace,
                        pod = %name,
                        container = %usage.name,
                        "Usage without matching container spec"
                    );
                    if self.config.unmatched == UnmatchedPolicy::Report {
                        result.errors.push(SampleError::UnmatchedContainer {
                            namespace: namespace.to_string(),
                            pod: name.to_string(),
                            container: usage.name.clone(),
                        });
                    }
                }
            }
        }
    }
}

/// Combine a usage entry with its container spec
fn pair_container(
    namespace: &str,
    pod: &str,
    spec: &Container,
    usage: &ContainerUsage,
    spot_tolerant: bool,
) -> ContainerSample {
    let resources = spec.resources.as_ref();
    let requests = resources.and_then(|r| r.requests.as_ref());
    let limits = resources.and_then(|r| r.limits.as_ref());

    ContainerSample {
        pod_name: pod.to_string(),
        namespace: namespace.to_string(),
        container_name: usage.name.clone(),
        usage: ResourceAmount::new(cpu_millis(usage.cpu()), memory_bytes(usage.memory())),
        request: ResourceAmount::new(
            cpu_millis(requests.and_then(|r| r.get("cpu"))),
            memory_bytes(requests.and_then(|r| r.get("memory"))),
        ),
        limit: ResourceAmount::new(
            cpu_millis(limits.and_then(|l| l.get("cpu"))),
            memory_bytes(limits.and_then(|l| l.get("memory"))),
        ),
        spot_tolerant,
    }
}
