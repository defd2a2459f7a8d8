//! Roll container samples up into table rows
//!
//! All folds are plain integer sums, so the result does not depend on the
//! order of the samples.

use tabled::Tabled;

use crate::models::{AggregateRow, ContainerSample, NodeResourceSnapshot};
use crate::units::{bytes_human, format_millis};

/// Label of the row summing a node's containers
pub const TOTAL_LABEL: &str = "Total";

/// Row of the pod detail table
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct PodRow {
    #[tabled(rename = "Pod")]
    pub pod: String,
    #[tabled(rename = "Container")]
    pub container: String,
    #[tabled(rename = "CPU Usage")]
    pub cpu_usage: String,
    #[tabled(rename = "CPU Request")]
    pub cpu_request: String,
    #[tabled(rename = "CPU Limit")]
    pub cpu_limit: String,
    #[tabled(rename = "Mem Usage")]
    pub memory_usage: String,
    #[tabled(rename = "Mem Request")]
    pub memory_request: String,
    #[tabled(rename = "Mem Limit")]
    pub memory_limit: String,
    #[tabled(rename = "Spot Tolerance")]
    pub spot_tolerance: String,
}

/// Row of the condensed per-node usage table
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct NodeUsageRow {
    #[tabled(rename = "Node")]
    pub node: String,
    #[tabled(rename = "CPU Usage")]
    pub cpu_usage: String,
    #[tabled(rename = "CPU Request")]
    pub cpu_request: String,
    #[tabled(rename = "Mem Usage")]
    pub memory_usage: String,
    #[tabled(rename = "Mem Request")]
    pub memory_request: String,
}

/// Row of the node capacity table
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct CapacityRow {
    #[tabled(rename = "Node")]
    pub node: String,
    #[tabled(rename = "CPU Capacity")]
    pub cpu_capacity: String,
    #[tabled(rename = "CPU Allocatable")]
    pub cpu_allocatable: String,
    #[tabled(rename = "Mem Capacity")]
    pub memory_capacity: String,
    #[tabled(rename = "Mem Allocatable")]
    pub memory_allocatable: String,
}

/// One detail row per sample, in sample order
pub fn pod_rows(samples: &[ContainerSample]) -> Vec<PodRow> {
    samples
        .iter()
        .map(|s| PodRow {
            pod: s.pod_name.clone(),
            container: s.container_name.clone(),
            cpu_usage: format_millis(s.usage.cpu_millicores),
            cpu_request: format_millis(s.request.cpu_millicores),
            cpu_limit: format_millis(s.limit.cpu_millicores),
            memory_usage: bytes_human(s.usage.memory_bytes),
            memory_request: bytes_human(s.request.memory_bytes),
            memory_limit: bytes_human(s.limit.memory_bytes),
            spot_tolerance: if s.spot_tolerant {
                "true".to_string()
            } else {
                String::new()
            },
        })
        .collect()
}

/// Sum usage, request and limit over all samples of a node
pub fn node_total(name: &str, samples: &[ContainerSample]) -> AggregateRow {
    AggregateRow {
        name: name.to_string(),
        ..samples.iter().sum::<AggregateRow>()
    }
}

/// Sum several totals under a new label
pub fn combine_totals<'a>(
    name: &str,
    totals: impl IntoIterator<Item = &'a AggregateRow>,
) -> AggregateRow {
    totals
        .into_iter()
        .fold(AggregateRow::empty(name), |mut combined, total| {
            combined.merge(total);
            combined
        })
}

/// Closing row of the pod detail table
pub fn total_pod_row(total: &AggregateRow) -> PodRow {
    PodRow {
        pod: TOTAL_LABEL.to_string(),
        container: String::new(),
        cpu_usage: format_millis(total.usage.cpu_millicores),
        cpu_request: format_millis(total.request.cpu_millicores),
        cpu_limit: format_millis(total.limit.cpu_millicores),
        memory_usage: bytes_human(total.usage.memory_bytes),
        memory_request: bytes_human(total.request.memory_bytes),
        memory_limit: bytes_human(total.limit.memory_bytes),
        spot_tolerance: String::new(),
    }
}

/// Condensed row carrying the total's own label
pub fn node_usage_row(total: &AggregateRow) -> NodeUsageRow {
    NodeUsageRow {
        node: total.name.clone(),
        cpu_usage: format_millis(total.usage.cpu_millicores),
        cpu_request: format_millis(total.request.cpu_millicores),
        memory_usage: bytes_human(total.usage.memory_bytes),
        memory_request: bytes_human(total.request.memory_bytes),
    }
}

/// Capacity and allocatable of a node, unchanged apart from formatting
pub fn capacity_row(snapshot: &NodeResourceSnapshot) -> CapacityRow {
    CapacityRow {
        node: snapshot.name.clone(),
        cpu_capacity: format_millis(snapshot.capacity.cpu_millicores),
        cpu_allocatable: format_millis(snapshot.allocatable.cpu_millicores),
        memory_capacity: bytes_human(snapshot.capacity.memory_bytes),
        memory_allocatable: bytes_human(snapshot.allocatable.memory_bytes),
    }
}
