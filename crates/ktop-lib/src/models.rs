//! Core data models for node and container resource reports

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use k8s_openapi::api::core::v1::Node;
use serde::{Deserialize, Serialize};

use crate::units::{cpu_millis, memory_bytes};

/// CPU and memory amount pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAmount {
    pub cpu_millicores: u64,
    pub memory_bytes: u64,
}

impl ResourceAmount {
    pub fn new(cpu_millicores: u64, memory_bytes: u64) -> Self {
        Self {
            cpu_millicores,
            memory_bytes,
        }
    }
}

impl Add for ResourceAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cpu_millicores: self.cpu_millicores.saturating_add(rhs.cpu_millicores),
            memory_bytes: self.memory_bytes.saturating_add(rhs.memory_bytes),
        }
    }
}

impl AddAssign for ResourceAmount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Capacity and allocatable resources of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResourceSnapshot {
    pub name: String,
    pub capacity: ResourceAmount,
    pub allocatable: ResourceAmount,
}

impl NodeResourceSnapshot {
    /// Project a node object onto its CPU and memory capacity/allocatable
    pub fn from_node(node: &Node) -> Self {
        let name = node.metadata.name.clone().unwrap_or_default();
        let status = node.status.as_ref();
        let capacity = status.and_then(|s| s.capacity.as_ref());
        let allocatable = status.and_then(|s| s.allocatable.as_ref());

        Self {
            name,
            capacity: ResourceAmount::new(
                cpu_millis(capacity.and_then(|c| c.get("cpu"))),
                memory_bytes(capacity.and_then(|c| c.get("memory"))),
            ),
            allocatable: ResourceAmount::new(
                cpu_millis(allocatable.and_then(|a| a.get("cpu"))),
                memory_bytes(allocatable.and_then(|a| a.get("memory"))),
            ),
        }
    }
}

/// Usage paired with the declared request and limit of one container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSample {
    pub pod_name: String,
    pub namespace: String,
    pub container_name: String,
    pub usage: ResourceAmount,
    pub request: ResourceAmount,
    pub limit: ResourceAmount,
    pub spot_tolerant: bool,
}

/// Summed usage, request and limit under a row label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub name: String,
    pub usage: ResourceAmount,
    pub request: ResourceAmount,
    pub limit: ResourceAmount,
}

impl AggregateRow {
    /// Zero-valued row with the given label
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Fold one container sample into the totals
    pub fn add_sample(&mut self, sample: &ContainerSample) {
        self.usage += sample.usage;
        self.request += sample.request;
        self.limit += sample.limit;
    }

    /// Fold another total into this one, keeping this row's label
    pub fn merge(&mut self, other: &AggregateRow) {
        self.usage += other.usage;
        self.request += other.request;
        self.limit += other.limit;
    }
}

impl<'a> Sum<&'a ContainerSample> for AggregateRow {
    fn sum<I: Iterator<Item = &'a ContainerSample>>(iter: I) -> Self {
        iter.fold(AggregateRow::default(), |mut total, sample| {
            total.add_sample(sample);
            total
        })
    }
}
