//! `lpt base` command - Base specification editing
//!
//! The base record enumerates what a model's variants may choose from:
//! allowed perforation/lining sets, the cutting-part list with default
//! quantities, hardware and soles.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::catalog::{CatalogKind, OptionCatalog};
use crate::cli::GlobalOpts;
use crate::entities::{CuttingPartEntry, HardwareEntry, HardwareUnit, Model, SoleEntry, Specification};
use crate::store::{SpecRepository, SqliteStore};

use super::utils::{open_store, require_model};

#[derive(clap::Subcommand, Debug)]
pub enum BaseCommands {
    /// Show a model's base specification
    Show(ShowArgs),

    /// Set the allowed option sets for variants
    Allow(AllowArgs),

    /// Set the lasting type
    Lasting(LastingArgs),

    /// Add a cutting part
    PartAdd(PartAddArgs),

    /// Remove a cutting part
    PartRm(PartRmArgs),

    /// Add a hardware item
    HardwareAdd(HardwareAddArgs),

    /// Remove a hardware item
    HardwareRm(HardwareRmArgs),

    /// Add a sole configuration
    SoleAdd(SoleAddArgs),

    /// Remove a sole configuration
    SoleRm(SoleRmArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Model id or article
    pub model: String,
}

#[derive(clap::Args, Debug)]
pub struct AllowArgs {
    /// Model id or article
    pub model: String,

    /// Allowed perforation type ids (replaces the current set)
    #[arg(long, value_delimiter = ',')]
    pub perforations: Option<Vec<i64>>,

    /// Allowed lining type ids (replaces the current set)
    #[arg(long, value_delimiter = ',')]
    pub linings: Option<Vec<i64>>,
}

#[derive(clap::Args, Debug)]
pub struct LastingArgs {
    /// Model id or article
    pub model: String,

    /// Lasting type id (omit to clear)
    pub lasting_type: Option<i64>,
}

#[derive(clap::Args, Debug)]
pub struct PartAddArgs {
    /// Model id or article
    pub model: String,

    /// Part name (unique within the specification)
    #[arg(long, short = 'n', required_unless_present = "template")]
    pub name: Option<String>,

    /// Seed the name from a cutting-part template (id or name)
    #[arg(long)]
    pub template: Option<String>,

    /// Pieces cut per pair
    #[arg(long, short = 'Q', default_value_t = 1)]
    pub quantity: u32,

    /// Material consumption per pair, dm²
    #[arg(long, short = 'c', default_value_t = 0.0)]
    pub consumption: f64,

    /// Material description (free text on a base record)
    #[arg(long, short = 'm')]
    pub material: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PartRmArgs {
    /// Model id or article
    pub model: String,

    /// Part name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct HardwareAddArgs {
    /// Model id or article
    pub model: String,

    /// Hardware item name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Quantity in unit terms
    #[arg(long, short = 'Q', default_value_t = 1.0)]
    pub quantity: f64,

    /// Counting unit
    #[arg(long, default_value = "pcs")]
    pub unit: String,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct HardwareRmArgs {
    /// Model id or article
    pub model: String,

    /// Hardware item name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct SoleAddArgs {
    /// Model id or article
    pub model: String,

    /// Sole material description
    #[arg(long, short = 'm')]
    pub material: String,

    /// Catalog material id
    #[arg(long)]
    pub material_id: Option<i64>,

    /// Sole thickness, mm
    #[arg(long, default_value_t = 0.0)]
    pub thickness: f64,

    /// Color
    #[arg(long, default_value = "")]
    pub color: String,

    /// Heel height, mm
    #[arg(long, default_value_t = 0.0)]
    pub heel_height: f64,

    /// Platform height, mm
    #[arg(long, default_value_t = 0.0)]
    pub platform_height: f64,
}

#[derive(clap::Args, Debug)]
pub struct SoleRmArgs {
    /// Model id or article
    pub model: String,

    /// Sole material description
    pub material: String,
}

/// Run a base subcommand
pub fn run(cmd: BaseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BaseCommands::Show(args) => run_show(args, global),
        BaseCommands::Allow(args) => run_allow(args, global),
        BaseCommands::Lasting(args) => run_lasting(args, global),
        BaseCommands::PartAdd(args) => run_part_add(args, global),
        BaseCommands::PartRm(args) => run_part_rm(args, global),
        BaseCommands::HardwareAdd(args) => run_hardware_add(args, global),
        BaseCommands::HardwareRm(args) => run_hardware_rm(args, global),
        BaseCommands::SoleAdd(args) => run_sole_add(args, global),
        BaseCommands::SoleRm(args) => run_sole_rm(args, global),
    }
}

fn load_base(store: &SqliteStore, model_ref: &str) -> Result<(Model, Specification)> {
    let model = require_model(store, model_ref)?;
    let base = store
        .base_specification(model.id.unwrap_or_default())
        .into_diagnostic()?
        .ok_or_else(|| {
            miette::miette!(
                "model '{}' has no base specification; re-create it with 'lpt model new'",
                model.article
            )
        })?;
    Ok((model, base))
}

fn save_base(store: &mut SqliteStore, model: &Model, base: &mut Specification) -> Result<()> {
    store.save_specification(base).into_diagnostic()?;
    println!(
        "{} Updated base specification of {}",
        style("✓").green(),
        style(&model.article).cyan()
    );
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;
    let (model, base) = load_base(&store, &args.model)?;
    let catalog = OptionCatalog::load(&store).into_diagnostic()?;

    println!(
        "{} for {} ({})",
        style("Base specification").bold(),
        style(&model.article).cyan(),
        model.name
    );

    let perforations = catalog.resolve_names(CatalogKind::Perforation, &base.perforation_ids);
    let linings = catalog.resolve_names(CatalogKind::Lining, &base.lining_ids);

    if perforations.is_empty() {
        println!("  perforations: any active type");
    } else {
        let names: Vec<String> = perforations
            .iter()
            .map(|o| format!("{} ({})", o.name, o.id))
            .collect();
        println!("  perforations: {}", names.join(", "));
    }
    if linings.is_empty() {
        println!("  linings:      any active type");
    } else {
        let names: Vec<String> = linings
            .iter()
            .map(|o| format!("{} ({})", o.name, o.id))
            .collect();
        println!("  linings:      {}", names.join(", "));
    }
    match base
        .lasting_type_id
        .and_then(|id| catalog.find(CatalogKind::Lasting, id))
    {
        Some(record) => println!("  lasting:      {}", record.name),
        None => println!("  lasting:      (unset)"),
    }

    println!();
    println!("Cutting parts:");
    if base.cutting_parts.is_empty() {
        println!("  (none)");
    }
    for part in &base.cutting_parts {
        println!(
            "  {} x{} {:.2} dm²  {}",
            style(&part.name).white(),
            part.quantity,
            part.consumption,
            part.material.as_deref().unwrap_or("-")
        );
    }

    if !base.hardware.is_empty() {
        println!();
        println!("Hardware:");
        for hw in &base.hardware {
            println!("  {} {} {}", hw.name, hw.quantity, hw.unit);
        }
    }

    if !base.soles.is_empty() {
        println!();
        println!("Soles:");
        for sole in &base.soles {
            println!(
                "  {} {}mm heel {}mm {}",
                sole.material, sole.thickness_mm, sole.heel_height_mm, sole.color
            );
        }
    }

    Ok(())
}

fn run_allow(args: AllowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let (model, mut base) = load_base(&store, &args.model)?;
    let catalog = OptionCatalog::load(&store).into_diagnostic()?;

    if let Some(ids) = args.perforations {
        warn_unknown_ids(&catalog, CatalogKind::Perforation, &ids);
        base.perforation_ids = ids;
    }
    if let Some(ids) = args.linings {
        warn_unknown_ids(&catalog, CatalogKind::Lining, &ids);
        base.lining_ids = ids;
    }

    save_base(&mut store, &model, &mut base)
}

fn warn_unknown_ids(catalog: &OptionCatalog, kind: CatalogKind, ids: &[i64]) {
    for id in ids {
        if catalog.find(kind, *id).is_none() {
            println!(
                "{} {} id {} is not an active catalog record; variants will not be offered it",
                style("!").yellow(),
                kind,
                id
            );
        }
    }
}

fn run_lasting(args: LastingArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let (model, mut base) = load_base(&store, &args.model)?;
    base.lasting_type_id = args.lasting_type;
    save_base(&mut store, &model, &mut base)
}

fn run_part_add(args: PartAddArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let (model, mut base) = load_base(&store, &args.model)?;

    let name = match (&args.name, &args.template) {
        (Some(name), _) => name.clone(),
        (None, Some(template)) => resolve_template_name(&store, template)?,
        (None, None) => {
            return Err(miette::miette!("either --name or --template is required"));
        }
    };

    if base.find_part(&name).is_some() {
        return Err(miette::miette!(
            "a cutting part named '{}' already exists on this specification",
            name
        ));
    }

    let mut part = CuttingPartEntry::new(name, args.quantity, args.consumption);
    part.material = args.material;
    part.notes = args.notes.unwrap_or_default();
    base.cutting_parts.push(part);

    save_base(&mut store, &model, &mut base)
}

fn resolve_template_name(store: &SqliteStore, reference: &str) -> Result<String> {
    let templates = store
        .list_active_catalog(CatalogKind::PartTemplate)
        .into_diagnostic()?;

    let found = if let Ok(id) = reference.parse::<i64>() {
        templates.iter().find(|t| t.id == Some(id))
    } else {
        templates.iter().find(|t| t.name == reference)
    };

    found.map(|t| t.name.clone()).ok_or_else(|| {
        miette::miette!(
            "no cutting-part template matches '{}' ('lpt catalog list part-template' shows them)",
            reference
        )
    })
}

fn run_part_rm(args: PartRmArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let (model, mut base) = load_base(&store, &args.model)?;

    let before = base.cutting_parts.len();
    base.cutting_parts.retain(|p| p.name != args.name);
    if base.cutting_parts.len() == before {
        return Err(miette::miette!("no cutting part named '{}'", args.name));
    }

    save_base(&mut store, &model, &mut base)
}

fn run_hardware_add(args: HardwareAddArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let (model, mut base) = load_base(&store, &args.model)?;

    let unit: HardwareUnit = args
        .unit
        .parse()
        .map_err(|e: String| miette::miette!("{}", e))?;

    base.hardware.push(HardwareEntry {
        name: args.name,
        quantity: args.quantity,
        unit,
        notes: args.notes.unwrap_or_default(),
    });

    save_base(&mut store, &model, &mut base)
}

fn run_hardware_rm(args: HardwareRmArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let (model, mut base) = load_base(&store, &args.model)?;

    let before = base.hardware.len();
    base.hardware.retain(|h| h.name != args.name);
    if base.hardware.len() == before {
        return Err(miette::miette!("no hardware item named '{}'", args.name));
    }

    save_base(&mut store, &model, &mut base)
}

fn run_sole_add(args: SoleAddArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let (model, mut base) = load_base(&store, &args.model)?;

    base.soles.push(SoleEntry {
        material: args.material,
        material_id: args.material_id,
        thickness_mm: args.thickness,
        color: args.color,
        heel_height_mm: args.heel_height,
        platform_height_mm: args.platform_height,
    });

    save_base(&mut store, &model, &mut base)
}

fn run_sole_rm(args: SoleRmArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let (model, mut base) = load_base(&store, &args.model)?;

    let before = base.soles.len();
    base.soles.retain(|s| s.material != args.material);
    if base.soles.len() == before {
        return Err(miette::miette!(
            "no sole with material '{}'",
            args.material
        ));
    }

    save_base(&mut store, &model, &mut base)
}
