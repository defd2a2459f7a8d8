//! Node and pod resource reporting for Kubernetes clusters
//!
//! This crate provides:
//! - Quantity parsing and unit formatting
//! - Per-node sampling of container usage, requests and limits
//! - Aggregation into pod, node and cluster totals
//! - Fixed-width box-drawing table rendering
//! - The report driver tying them together

pub mod aggregate;
pub mod console;
pub mod error;
pub mod models;
pub mod progress;
pub mod report;
pub mod sampler;
pub mod source;
pub mod table;
pub mod units;

#[cfg(test)]
mod testing;

pub use console::Console;
pub use error::{ReportError, SampleError, SourceError};
pub use models::*;
pub use progress::{Progress, Silent};
pub use report::{ReportDriver, ReportFormat, ReportSummary, Scope};
pub use sampler::{ResourceSampler, SamplerConfig, TolerationMatch, UnmatchedPolicy};
pub use source::{KubeCluster, NodeDirectory, WorkloadSource};
pub use table::{TableModel, TableRenderer};
