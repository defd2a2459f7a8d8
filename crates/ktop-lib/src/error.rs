//! Error taxonomy for report generation
//!
//! [`SampleError`]s are recoverable: they are collected into the report's
//! error list while sampling continues. [`ReportError`]s abort the report
//! before anything is rendered.

use thiserror::Error;

pub use crate::table::TableError;
pub use crate::units::QuantityError;

/// A call to the cluster failed
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Kube(#[from] kube::Error),
    #[error("{0}")]
    Unavailable(String),
}

/// Per-node or per-pod failure recorded in the error list
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("listing pods on node {node}: {source}")]
    ListPods {
        node: String,
        #[source]
        source: SourceError,
    },
    #[error("fetching metrics for pod {namespace}/{pod}: {source}")]
    PodMetrics {
        namespace: String,
        pod: String,
        #[source]
        source: SourceError,
    },
    #[error("container {container} in pod {namespace}/{pod} reports usage but is not in the pod spec")]
    UnmatchedContainer {
        namespace: String,
        pod: String,
        container: String,
    },
}

/// Fatal error that stops the report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("listing nodes: {0}")]
    ListNodes(#[source] SourceError),
    #[error("writing report: {0}")]
    Output(#[from] std::io::Error),
    #[error("encoding report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Table(#[from] TableError),
}
