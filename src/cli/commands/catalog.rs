//! `lpt catalog` command - Reference catalog maintenance

use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::catalog::{CatalogKind, CatalogRecord};
use crate::cli::helpers::escape_csv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::store::SpecRepository;

use super::utils::{effective_format, open_store};

#[derive(clap::Subcommand, Debug)]
pub enum CatalogCommands {
    /// List catalog records
    List(ListArgs),

    /// Add a catalog record
    Add(AddArgs),

    /// Mark a record inactive (records are never deleted)
    Deactivate(DeactivateArgs),

    /// Import material prices from a CSV file (name,category,price)
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Catalog kind
    pub kind: CatalogKind,

    /// Include inactive records
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Catalog kind
    pub kind: CatalogKind,

    /// Record name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Short code
    #[arg(long)]
    pub code: Option<String>,

    /// Category (e.g. leather, lining, sole)
    #[arg(long)]
    pub category: Option<String>,

    /// Unit price per dm² (materials only)
    #[arg(long)]
    pub price: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct DeactivateArgs {
    /// Catalog kind
    pub kind: CatalogKind,

    /// Record id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file with name,category,price columns
    #[arg(long, short = 'F')]
    pub file: PathBuf,
}

/// Run a catalog subcommand
pub fn run(cmd: CatalogCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CatalogCommands::List(args) => run_list(args, global),
        CatalogCommands::Add(args) => run_add(args, global),
        CatalogCommands::Deactivate(args) => run_deactivate(args, global),
        CatalogCommands::Import(args) => run_import(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;

    let records = if args.all {
        store.list_catalog(args.kind).into_diagnostic()?
    } else {
        store.list_active_catalog(args.kind).into_diagnostic()?
    };

    if records.is_empty() {
        println!("No {} records found.", args.kind);
        return Ok(());
    }

    let format = effective_format(global, OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&records).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("id,code,name,category,price,active");
            for r in &records {
                println!(
                    "{},{},{},{},{},{}",
                    r.id.unwrap_or_default(),
                    escape_csv(r.code.as_deref().unwrap_or("")),
                    escape_csv(&r.name),
                    escape_csv(r.category.as_deref().unwrap_or("")),
                    r.price.map(|p| format!("{:.2}", p)).unwrap_or_default(),
                    r.is_active
                );
            }
        }
        OutputFormat::Id => {
            for r in &records {
                println!("{}", r.id.unwrap_or_default());
            }
        }
        _ => {
            println!("ID\tCODE\tNAME\tCATEGORY\tPRICE");
            for r in &records {
                let mut name = r.name.clone();
                if !r.is_active {
                    name.push_str(" (inactive)");
                }
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    r.id.unwrap_or_default(),
                    r.code.as_deref().unwrap_or("-"),
                    name,
                    r.category.as_deref().unwrap_or("-"),
                    r.price.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "-".to_string())
                );
            }
        }
    }

    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;

    let mut record = CatalogRecord::new(args.name);
    record.code = args.code;
    record.category = args.category;
    record.price = args.price;

    store
        .add_catalog_record(args.kind, &mut record)
        .into_diagnostic()?;

    println!(
        "{} Added {} record {} ({})",
        style("✓").green(),
        args.kind,
        style(record.id.unwrap_or_default()).cyan(),
        record.name
    );
    Ok(())
}

fn run_deactivate(args: DeactivateArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;

    store
        .deactivate_catalog_record(args.kind, args.id)
        .into_diagnostic()?;

    println!(
        "{} Deactivated {} record {}",
        style("✓").green(),
        args.kind,
        style(args.id).cyan()
    );
    Ok(())
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;

    let mut reader = csv::Reader::from_path(&args.file).into_diagnostic()?;
    let headers = reader.headers().into_diagnostic()?.clone();

    let name_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("name"))
        .ok_or_else(|| miette::miette!("CSV file has no 'name' column"))?;
    let price_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("price"))
        .ok_or_else(|| miette::miette!("CSV file has no 'price' column"))?;
    let category_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("category"));

    let mut imported = 0usize;
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record.into_diagnostic()?;
        let name = record.get(name_idx).unwrap_or("").trim();
        let price_raw = record.get(price_idx).unwrap_or("").trim();

        if name.is_empty() {
            skipped += 1;
            continue;
        }

        let price: f64 = match price_raw.parse() {
            Ok(price) => price,
            Err(_) => {
                println!(
                    "{} Skipping '{}': unreadable price '{}'",
                    style("!").yellow(),
                    name,
                    price_raw
                );
                skipped += 1;
                continue;
            }
        };

        let category = category_idx
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|c| !c.is_empty());

        store
            .upsert_material_price(name, category, price)
            .into_diagnostic()?;
        imported += 1;
    }

    println!(
        "{} Imported {} material price(s) from {} ({} skipped)",
        style("✓").green(),
        imported,
        style(args.file.display()).cyan(),
        skipped
    );
    Ok(())
}
