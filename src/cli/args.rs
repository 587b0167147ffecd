//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    base::BaseCommands, catalog::CatalogCommands, completions::CompletionsArgs,
    init::InitArgs, model::ModelCommands, report::ReportCommands, variant::VariantCommands,
};

#[derive(Parser)]
#[command(name = "lpt")]
#[command(author, version, about = "Lastline Production Toolkit")]
#[command(
    long_about = "A command-line tool for managing shoe model catalogs and bill-of-material specifications, from base parameters to costed production variants."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .lpt/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new LPT project
    Init(InitArgs),

    /// Shoe model management
    #[command(subcommand)]
    Model(ModelCommands),

    /// Base specification editing (allowed options, parts, hardware, soles)
    #[command(subcommand)]
    Base(BaseCommands),

    /// Variant specification management
    #[command(subcommand)]
    Variant(VariantCommands),

    /// Reference catalog maintenance
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Generate production reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for list/show commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
