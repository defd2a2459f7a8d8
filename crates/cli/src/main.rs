//! ktop
//!
//! Shows CPU and memory capacity of Kubernetes nodes together with the
//! usage, requests and limits of the pods scheduled on them.

mod cluster;
mod config;
mod output;
mod spinner;

use std::io::{self, IsTerminal, Stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ktop_lib::{Console, KubeCluster, ReportDriver, ResourceSampler, Scope, TableRenderer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use output::OutputFormat;
use spinner::Spinner;

/// Display node capacity and pod metrics; spot tolerations are shown when set
#[derive(Parser)]
#[command(name = "ktop")]
#[command(author, version, long_about = None)]
#[command(after_help = "Examples:\n  ktop            Show all nodes and pods metrics\n  ktop my-node    Show specified node and pods metrics")]
pub struct Cli {
    /// Node name (all nodes are summarized when omitted)
    pub node: Option<String>,

    /// Path to kubeconfig file (standard discovery if not specified)
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Disable alternating row backgrounds
    #[arg(long)]
    pub no_color: bool,

    /// List usage of containers missing from their pod spec as errors
    #[arg(long)]
    pub report_unmatched: bool,

    /// Configuration file (defaults to ~/.config/ktop/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging on stderr
    #[arg(long, short)]
    pub verbose: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("warn,ktop={level},ktop_lib={level}"))),
        )
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let interactive = cli.format == OutputFormat::Table && io::stdout().is_terminal();
    let console = Console::new(io::stdout(), interactive);
    let spinner = Spinner::spawn(console.clone());

    let outcome = run(cli, console, &spinner).await;
    spinner.stop().await;

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            output::print_error(&format!("{:#}", error));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, console: Console<Stdout>, spinner: &Spinner<Stdout>) -> Result<()> {
    let config = match &cli.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };

    let colorize = output::should_colorize(cli.no_color, config.color, io::stdout().is_terminal());
    colored::control::set_override(colorize);

    let client = cluster::connect(cli.kubeconfig.as_deref(), cli.context.clone())
        .await
        .context("Failed to establish cluster access")?;
    let cluster = Arc::new(KubeCluster::new(client));

    let sampler = ResourceSampler::new(cluster.clone(), config.sampler_config(cli.report_unmatched));
    let driver = ReportDriver::new(
        cluster,
        sampler,
        console,
        TableRenderer::new(colorize),
        cli.format.into(),
    );

    let summary = driver.run(&Scope::from(cli.node), spinner).await?;
    info!(nodes = summary.nodes, errors = summary.errors, "Report complete");

    Ok(())
}
