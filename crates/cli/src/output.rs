//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use ktop_lib::ReportFormat;

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => ReportFormat::Table,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Shade table rows only on a terminal, unless turned off by flag or config
pub fn should_colorize(no_color: bool, configured: Option<bool>, is_terminal: bool) -> bool {
    !no_color && configured.unwrap_or(true) && is_terminal
}
