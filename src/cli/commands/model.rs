//! `lpt model` command - Shoe model management

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::escape_csv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::{Model, Specification};
use crate::store::SpecRepository;

use super::utils::{effective_format, open_store, require_model};

#[derive(clap::Subcommand, Debug)]
pub enum ModelCommands {
    /// Create a new model (with its empty base specification)
    New(NewArgs),

    /// List models with filtering
    List(ListArgs),

    /// Show a model's details and specifications
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Factory article number (unique)
    #[arg(long, short = 'a')]
    pub article: String,

    /// Model name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Last (shoe form) code
    #[arg(long)]
    pub last_code: Option<String>,

    /// Last type description
    #[arg(long)]
    pub last_type: Option<String>,

    /// Producible size range as MIN-MAX (default: 36-46)
    #[arg(long, value_parser = parse_size_range)]
    pub sizes: Option<(u32, u32)>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in article and name
    #[arg(long)]
    pub search: Option<String>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Model id or article
    pub model: String,
}

/// Run a model subcommand
pub fn run(cmd: ModelCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ModelCommands::New(args) => run_new(args, global),
        ModelCommands::List(args) => run_list(args, global),
        ModelCommands::Show(args) => run_show(args, global),
    }
}

fn parse_size_range(raw: &str) -> Result<(u32, u32), String> {
    let (min, max) = raw
        .split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got '{}'", raw))?;
    let min: u32 = min.trim().parse().map_err(|_| format!("invalid size '{}'", min))?;
    let max: u32 = max.trim().parse().map_err(|_| format!("invalid size '{}'", max))?;
    if min > max {
        return Err(format!("size range '{}' is inverted", raw));
    }
    Ok((min, max))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;

    let mut model = Model::new(args.article, args.name);
    model.last_code = args.last_code;
    model.last_type = args.last_type;
    if let Some((min, max)) = args.sizes {
        model = model.with_size_range(min, max);
    }

    store.save_model(&mut model).into_diagnostic()?;
    let model_id = model.id.unwrap_or_default();

    // every model owns exactly one base specification from birth
    let mut base = Specification::new_base(model_id);
    store.save_specification(&mut base).into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Created model {} ({})",
            style("✓").green(),
            style(&model.article).cyan(),
            style(&model.name).white()
        );
        println!(
            "   Base specification {} ready; edit it with {}",
            style(base.id.unwrap_or_default()).cyan(),
            style(format!("lpt base show {}", model.article)).yellow()
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;

    let mut models = store.list_models().into_diagnostic()?;

    if let Some(ref search) = args.search {
        let needle = search.to_lowercase();
        models.retain(|m| {
            m.article.to_lowercase().contains(&needle) || m.name.to_lowercase().contains(&needle)
        });
    }

    if let Some(limit) = args.limit {
        models.truncate(limit);
    }

    if args.count {
        println!("{}", models.len());
        return Ok(());
    }

    if models.is_empty() {
        println!("No models found.");
        return Ok(());
    }

    let format = effective_format(global, OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&models).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&models).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("id,article,name,last_code,sizes");
            for m in &models {
                println!(
                    "{},{},{},{},{}",
                    m.id.unwrap_or_default(),
                    escape_csv(&m.article),
                    escape_csv(&m.name),
                    escape_csv(m.last_code.as_deref().unwrap_or("")),
                    m.size_range()
                );
            }
        }
        OutputFormat::Id => {
            for m in &models {
                println!("{}", m.id.unwrap_or_default());
            }
        }
        _ => {
            println!("ID\tARTICLE\tNAME\tLAST\tSIZES");
            for m in &models {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    m.id.unwrap_or_default(),
                    m.article,
                    m.name,
                    m.last_code.as_deref().unwrap_or("-"),
                    m.size_range()
                );
            }
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;
    let model = require_model(&store, &args.model)?;
    let model_id = model.id.unwrap_or_default();
    let specs = store.list_specifications(Some(model_id)).into_diagnostic()?;

    let format = effective_format(global, OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&model).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&model).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            println!(
                "{} {} ({})",
                style("Model").bold(),
                style(&model.article).cyan(),
                model.name
            );
            println!("  id:    {}", model_id);
            if let Some(ref code) = model.last_code {
                println!("  last:  {} {}", code, model.last_type.as_deref().unwrap_or(""));
            }
            println!("  sizes: {}", model.size_range());
            println!();
            println!("Specifications:");
            for spec in &specs {
                if spec.is_base() {
                    println!(
                        "  {} base ({} parts)",
                        style(spec.id.unwrap_or_default()).cyan(),
                        spec.cutting_parts.len()
                    );
                } else {
                    println!(
                        "  {} {} [{}] ({} parts, total {:.2})",
                        style(spec.id.unwrap_or_default()).cyan(),
                        spec.variant_name,
                        spec.variant_code,
                        spec.cutting_parts.len(),
                        spec.total_material_cost
                    );
                }
            }
        }
    }

    Ok(())
}
