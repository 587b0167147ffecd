//! `lpt report` command - Generate production reports

mod cost;

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::GlobalOpts;

pub use cost::CostArgs;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Material cost breakdown for a variant
    Cost(CostArgs),
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Cost(args) => cost::run(args, global),
    }
}

/// Write report content to stdout or a file
fn write_output(content: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            println!("Report written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
