//! Report driver
//!
//! Processes nodes one at a time: sample, aggregate, render, emit. A node's
//! tables are written only after all of its samples are in, and the error
//! list gathered along the way is printed once after the last table.


use std::io::Write;
use std::sync::Arc;

use k8s_openapi::api::core::v1::Node;
use serde::Serialize;
use tabled::Tabled;
use tracing::{info, warn};

use crate::aggregate::{
    capacity_row, combine_totals, node_total, node_usage_row, pod_rows, total_pod_row,
    TOTAL_LABEL,
};
use crate::console::Console;
use crate::error::{ReportError, SampleError};
use crate::models::{AggregateRow, ContainerSample, NodeResourceSnapshot};
use crate::progress::Progress;
use crate::sampler::ResourceSampler;
use crate::source::NodeDirectory;
use crate::table::{TableModel, TableRenderer};

/// Which nodes the report covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every node, summarized
    AllNodes,
    /// One node, with a row per container
    ///
    /// A name matching no node falls back to every node, still in detail.
    Node(String),
}

impl From<Option<String>> for Scope {
    fn from(node: Option<String>) -> Self {
        match node {
            Some(name) if !name.is_empty() => Scope::Node(name),
            _ => Scope::AllNodes,
        }
    }
}

/// How the report is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

/// Everything gathered for one node
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub node: NodeResourceSnapshot,
    pub containers: Vec<ContainerSample>,
    pub total: AggregateRow,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    nodes: &'a [NodeReport],
    #[serde(skip_serializing_if = "Option::is_none")]
    cluster_total: Option<&'a AggregateRow>,
    errors: Vec<String>,
}

/// Recoverable errors accumulated across all nodes
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<SampleError>,
}

impl ErrorList {
    pub fn extend(&mut self, errors: impl IntoIterator<Item = SampleError>) {
        self.errors.extend(errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Numbered summary printed after the last table
    pub fn render(&self) -> String {
        let mut out = String::from("\nError(s) :\n");
        for (i, error) in self.errors.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, error));
        }
        out
    }
}

/// Outcome of a completed report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub nodes: usize,
    pub errors: usize,
}

/// Drives sampling, aggregation and rendering for the selected nodes
pub struct ReportDriver<W> {
    nodes: Arc<dyn NodeDirectory>,
    sampler: ResourceSampler,
    console: Console<W>,
    renderer: TableRenderer,
    format: ReportFormat,
}

impl<W: Write + Send> ReportDriver<W> {
    pub fn new(
        nodes: Arc<dyn NodeDirectory>,
        sampler: ResourceSampler,
        console: Console<W>,
        renderer: TableRenderer,
        format: ReportFormat,
    ) -> Self {
        Self {
            nodes,
            sampler,
            console,
            renderer,
            format,
        }
    }

    /// Run the full report
    ///
    /// Fails before writing anything when nodes cannot be listed.
    pub async fn run(
        &self,
        scope: &Scope,
        progress: &dyn Progress,
    ) -> Result<ReportSummary, ReportError> {
        let nodes = self.select_nodes(scope).await?;
        info!(nodes = nodes.len(), ?scope, "Starting report");

        let mut errors = ErrorList::default();
        let mut reports = Vec::with_capacity(nodes.len());

        for node in &nodes {
            let snapshot = NodeResourceSnapshot::from_node(node);
            let sampled = self.sampler.sample_node(&snapshot.name, progress).await;
            errors.extend(sampled.errors);

            let report = NodeReport {
                total: node_total(&snapshot.name, &sampled.samples),
                node: snapshot,
                containers: sampled.samples,
            };

            if self.format == ReportFormat::Table {
                let block = self.render_node(scope, &report)?;
                self.console.emit(&block).await?;
            }
            reports.push(report);
        }

        let cluster_total = match scope {
            Scope::AllNodes => Some(combine_totals(
                TOTAL_LABEL,
                reports.iter().map(|r| &r.total),
            )),
            Scope::Node(_) => None,
        };

        match self.format {
            ReportFormat::Table => {
                let mut tail = String::new();
                if let Some(total) = &cluster_total {
                    let table = TableModel::from_rows(&[node_usage_row(total)]);
                    tail.push_str("\nCluster\n");
                    tail.push_str(&self.renderer.render(&table));
                }
                if !errors.is_empty() {
                    tail.push_str(&errors.render());
                }
                if !tail.is_empty() {
                    self.console.emit(&tail).await?;
                }
            }
            ReportFormat::Json => {
                let document = JsonReport {
                    nodes: &reports,
                    cluster_total: cluster_total.as_ref(),
                    errors: errors.messages(),
                };
                let mut json = serde_json::to_string_pretty(&document)?;
                json.push('\n');
                self.console.emit(&json).await?;
            }
        }

        Ok(ReportSummary {
            nodes: reports.len(),
            errors: errors.len(),
        })
    }

    async fn select_nodes(&self, scope: &Scope) -> Result<Vec<Node>, ReportError> {
        let mut nodes = self
            .nodes
            .list_nodes()
            .await
            .map_err(ReportError::ListNodes)?;

        let Scope::Node(name) = scope else {
            return Ok(nodes);
        };
        let found = nodes
            .iter()
            .position(|n| n.metadata.name.as_deref() == Some(name.as_str()));
        match found {
            Some(index) => Ok(vec![nodes.swap_remove(index)]),
            None => {
                warn!(node = %name, "Node not found, reporting every node");
                Ok(nodes)
            }
        }
    }

    /// Usage table followed by the capacity table of one node
    fn render_node(&self, scope: &Scope, report: &NodeReport) -> Result<String, ReportError> {
        let mut block = String::new();

        match scope {
            Scope::Node(_) => {
                let mut detail = TableModel::from_rows(&pod_rows(&report.containers));
                detail.push_row(total_pod_row(&report.total).fields())?;
                block.push_str(&self.renderer.render(&detail));
            }
            Scope::AllNodes => {
                let summary = TableModel::from_rows(&[node_usage_row(&report.total)]);
                block.push('\n');
                block.push_str(&self.renderer.render(&summary));
            }
        }

        let capacity = TableModel::from_rows(&[capacity_row(&report.node)]);
        block.push_str(&self.renderer.render(&capacity));
        Ok(block)
    }
}
