//! `lpt init` command - Initialize a new LPT project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::Project;
use crate::store::SqliteStore;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .lpt/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            // create the database up front so the first command that
            // reads it does not race schema creation
            SqliteStore::open(&project.db_path()).into_diagnostic()?;

            println!(
                "{} Initialized LPT project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!(
                "  {} Fill the reference catalogs",
                style("lpt catalog add material --name \"Calf leather brown\" --price 120").yellow()
            );
            println!(
                "  {} Create your first model",
                style("lpt model new --article A-1027 --name \"Oxford Classic\"").yellow()
            );
            println!(
                "  {} Derive a costed production variant",
                style("lpt variant new A-1027 --name \"Brogue Tan\"").yellow()
            );
            Ok(())
        }
        Err(err) => {
            println!(
                "{} {}",
                style("!").yellow(),
                style(format!("{err}")).white()
            );
            println!(
                "  Use {} to re-initialize",
                style("lpt init --force").yellow()
            );
            Ok(())
        }
    }
}
