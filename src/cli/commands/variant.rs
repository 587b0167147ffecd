//! `lpt variant` command - Variant specification management
//!
//! Drives the resolution state machine: seed an editor from the base
//! specification, apply flag or interactive edits, validate, save.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::catalog::{CatalogKind, OptionCatalog};
use crate::cli::helpers::{escape_csv, format_money, parse_key_value, parse_part_spec};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::entities::CuttingPartEntry;
use crate::resolve::{SpecificationResolver, ValidationIssue, VariantEditor};
use crate::store::SpecRepository;

use super::utils::{effective_format, open_store, require_model};

#[derive(clap::Subcommand, Debug)]
pub enum VariantCommands {
    /// Create a variant from a model's base specification
    New(NewArgs),

    /// Edit an existing variant
    Edit(EditArgs),

    /// Show a variant's details
    Show(ShowArgs),

    /// List variants
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Model id or article
    pub model: String,

    #[command(flatten)]
    pub edits: EditFlags,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Specification id of the variant
    pub spec_id: i64,

    #[command(flatten)]
    pub edits: EditFlags,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Specification id of the variant
    pub spec_id: i64,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Narrow to one model (id or article)
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

/// Edits shared by `variant new` and `variant edit`
#[derive(clap::Args, Debug)]
pub struct EditFlags {
    /// Variant display name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Variant production code (blank = generated on save)
    #[arg(long)]
    pub code: Option<String>,

    /// Chosen perforation type id
    #[arg(long)]
    pub perforation: Option<i64>,

    /// Chosen lining type id
    #[arg(long)]
    pub lining: Option<i64>,

    /// Lasting type id
    #[arg(long)]
    pub lasting: Option<i64>,

    /// Append a cutting part: NAME[:QUANTITY[:CONSUMPTION]] (repeatable)
    #[arg(long = "add-part", value_name = "NAME:QTY:DM2")]
    pub add_parts: Vec<String>,

    /// Assign a catalog material to a part: PART=MATERIAL (name or id,
    /// repeatable)
    #[arg(long = "material", value_name = "PART=MATERIAL")]
    pub materials: Vec<String>,

    /// Override a part quantity: PART=N (repeatable)
    #[arg(long = "qty", value_name = "PART=N")]
    pub quantities: Vec<String>,

    /// Override a part consumption in dm²: PART=DM2 (repeatable)
    #[arg(long = "consumption", value_name = "PART=DM2")]
    pub consumptions: Vec<String>,

    /// Prompt for name, options and materials interactively
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

/// Run a variant subcommand
pub fn run(cmd: VariantCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        VariantCommands::New(args) => run_new(args, global),
        VariantCommands::Edit(args) => run_edit(args, global),
        VariantCommands::Show(args) => run_show(args, global),
        VariantCommands::List(args) => run_list(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let model = require_model(&store, &args.model)?;
    let model_id = model.id.unwrap_or_default();

    let mut resolver = SpecificationResolver::new(&mut store).into_diagnostic()?;
    let mut editor = resolver.begin_variant(model_id).into_diagnostic()?;

    apply_flags(&mut editor, &args.edits, resolver.catalog())?;
    if args.edits.interactive {
        run_interactive(&mut editor, resolver.catalog())?;
    }

    let warnings = resolver.validate(&mut editor).into_diagnostic()?;
    print_warnings(&warnings, global);

    let spec = resolver.save(&mut editor).into_diagnostic()?;
    let config = Config::load();

    if !global.quiet {
        println!(
            "{} Created variant {} [{}] for {}",
            style("✓").green(),
            style(&spec.variant_name).cyan(),
            style(&spec.variant_code).white(),
            style(&model.article).cyan()
        );
        println!(
            "   id {} | total material cost {}",
            style(spec.id.unwrap_or_default()).cyan(),
            style(format_money(spec.total_material_cost, &config.currency())).yellow()
        );
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;

    let mut resolver = SpecificationResolver::new(&mut store).into_diagnostic()?;
    let mut editor = resolver.open_variant(args.spec_id).into_diagnostic()?;

    apply_flags(&mut editor, &args.edits, resolver.catalog())?;
    if args.edits.interactive {
        run_interactive(&mut editor, resolver.catalog())?;
    }

    let warnings = resolver.validate(&mut editor).into_diagnostic()?;
    print_warnings(&warnings, global);

    let spec = resolver.save(&mut editor).into_diagnostic()?;
    let config = Config::load();

    if !global.quiet {
        println!(
            "{} Saved variant {} [{}]",
            style("✓").green(),
            style(&spec.variant_name).cyan(),
            style(&spec.variant_code).white()
        );
        println!(
            "   total material cost {}",
            style(format_money(spec.total_material_cost, &config.currency())).yellow()
        );
    }
    Ok(())
}

fn apply_flags(
    editor: &mut VariantEditor,
    flags: &EditFlags,
    catalog: &OptionCatalog,
) -> Result<()> {
    if let Some(ref name) = flags.name {
        editor.variant_name = name.clone();
    }
    if let Some(ref code) = flags.code {
        editor.variant_code = code.clone();
    }

    // append parts before the per-part overrides so they can be targeted
    for raw in &flags.add_parts {
        let (name, quantity, consumption) =
            parse_part_spec(raw).map_err(|e| miette::miette!("{}", e))?;
        editor
            .add_part(CuttingPartEntry::new(name, quantity, consumption))
            .into_diagnostic()?;
    }

    if flags.perforation.is_some() {
        editor.choose_perforation(flags.perforation);
    }
    if flags.lining.is_some() {
        editor.choose_lining(flags.lining);
    }
    if flags.lasting.is_some() {
        editor.set_lasting(flags.lasting);
    }

    for raw in &flags.materials {
        let (part, material) = parse_key_value(raw).map_err(|e| miette::miette!("{}", e))?;
        let record = resolve_material(catalog, &material)?;
        editor
            .set_part_material(&part, record.0, record.1)
            .into_diagnostic()?;
    }

    for raw in &flags.quantities {
        let (part, value) = parse_key_value(raw).map_err(|e| miette::miette!("{}", e))?;
        let quantity: u32 = value
            .parse()
            .map_err(|_| miette::miette!("invalid quantity '{}' for part '{}'", value, part))?;
        editor.set_part_quantity(&part, quantity).into_diagnostic()?;
    }

    for raw in &flags.consumptions {
        let (part, value) = parse_key_value(raw).map_err(|e| miette::miette!("{}", e))?;
        let consumption: f64 = value
            .parse()
            .map_err(|_| miette::miette!("invalid consumption '{}' for part '{}'", value, part))?;
        editor
            .set_part_consumption(&part, consumption)
            .into_diagnostic()?;
    }

    Ok(())
}

/// Resolve a material reference (catalog id or exact name) to (id, name)
fn resolve_material(catalog: &OptionCatalog, reference: &str) -> Result<(i64, String)> {
    if let Ok(id) = reference.parse::<i64>() {
        if let Some(record) = catalog.find(CatalogKind::Material, id) {
            return Ok((id, record.name.clone()));
        }
    }
    if let Some(record) = catalog.find_material_by_name(reference) {
        if let Some(id) = record.id {
            return Ok((id, record.name.clone()));
        }
    }
    Err(miette::miette!(
        "no active material matches '{}' ('lpt catalog list material' shows them)",
        reference
    ))
}

fn run_interactive(editor: &mut VariantEditor, catalog: &OptionCatalog) -> Result<()> {
    let theme = ColorfulTheme::default();

    if editor.variant_name.trim().is_empty() {
        editor.variant_name = Input::<String>::with_theme(&theme)
            .with_prompt("Variant name")
            .interact_text()
            .into_diagnostic()?;
    }

    editor.perforation_id = prompt_option(&theme, "Perforation", &editor.perforation_options)?;
    editor.lining_id = prompt_option(&theme, "Lining", &editor.lining_options)?;
    if editor.lasting_type_id.is_none() {
        editor.lasting_type_id = prompt_option(&theme, "Lasting type", &editor.lasting_options)?;
    }

    let materials = catalog.cutting_materials();
    if materials.is_empty() {
        println!(
            "{} No active materials in the catalog; skipping material choices",
            style("!").yellow()
        );
        return Ok(());
    }

    let mut items: Vec<String> = vec!["(skip)".to_string()];
    items.extend(materials.iter().map(|m| match m.price {
        Some(price) => format!("{} ({:.2}/dm²)", m.name, price),
        None => m.name.clone(),
    }));

    let part_names: Vec<String> = editor.cutting_parts.iter().map(|p| p.name.clone()).collect();
    for name in part_names {
        let chosen = Select::with_theme(&theme)
            .with_prompt(format!("Material for '{}'", name))
            .items(&items)
            .default(0)
            .interact()
            .into_diagnostic()?;
        if chosen > 0 {
            let record = materials[chosen - 1];
            if let Some(id) = record.id {
                editor
                    .set_part_material(&name, id, record.name.clone())
                    .into_diagnostic()?;
            }
        }
    }

    Ok(())
}

fn prompt_option(
    theme: &ColorfulTheme,
    prompt: &str,
    options: &[crate::catalog::CatalogOption],
) -> Result<Option<i64>> {
    if options.is_empty() {
        return Ok(None);
    }

    let mut items: Vec<String> = vec!["(leave unset)".to_string()];
    items.extend(options.iter().map(|o| o.name.clone()));

    let chosen = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()
        .into_diagnostic()?;

    Ok(if chosen == 0 {
        None
    } else {
        Some(options[chosen - 1].id)
    })
}

fn print_warnings(warnings: &[ValidationIssue], global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    for warning in warnings {
        println!(
            "{} {}: {}",
            style("!").yellow(),
            style(&warning.field).white(),
            warning.message
        );
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;

    let spec = store
        .specification(args.spec_id)
        .into_diagnostic()?
        .ok_or_else(|| miette::miette!("specification {} not found", args.spec_id))?;

    if spec.is_base() {
        return Err(miette::miette!(
            "specification {} is a base record; use 'lpt base show'",
            args.spec_id
        ));
    }

    let format = effective_format(global, OutputFormat::Yaml);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&spec).into_diagnostic()?;
            println!("{}", json);
            return Ok(());
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&spec).into_diagnostic()?;
            print!("{}", yaml);
            return Ok(());
        }
        _ => {}
    }

    let catalog = OptionCatalog::load(&store).into_diagnostic()?;
    let config = Config::load();

    println!(
        "{} {} [{}]",
        style("Variant").bold(),
        style(&spec.variant_name).cyan(),
        spec.variant_code
    );
    println!("  model id: {}", spec.model_id);
    print_choice(&catalog, "perforation", CatalogKind::Perforation, spec.perforation_id);
    print_choice(&catalog, "lining", CatalogKind::Lining, spec.lining_id);
    print_choice(&catalog, "lasting", CatalogKind::Lasting, spec.lasting_type_id);

    println!();
    println!("Cutting parts:");
    for part in &spec.cutting_parts {
        println!(
            "  {} x{} {:.2} dm²  {}",
            part.name,
            part.quantity,
            part.consumption,
            part.material.as_deref().unwrap_or("(no material)")
        );
    }

    if !spec.hardware.is_empty() {
        println!();
        println!("Hardware:");
        for hw in &spec.hardware {
            println!("  {} {} {}", hw.name, hw.quantity, hw.unit);
        }
    }

    if !spec.soles.is_empty() {
        println!();
        println!("Soles:");
        for sole in &spec.soles {
            println!(
                "  {} {}mm heel {}mm {}",
                sole.material, sole.thickness_mm, sole.heel_height_mm, sole.color
            );
        }
    }

    println!();
    println!(
        "Total material cost: {}",
        style(format_money(spec.total_material_cost, &config.currency())).yellow()
    );

    Ok(())
}

fn print_choice(
    catalog: &OptionCatalog,
    label: &str,
    kind: CatalogKind,
    id: Option<i64>,
) {
    match id {
        Some(id) => match catalog.find(kind, id) {
            Some(record) => println!("  {}: {} ({})", label, record.name, id),
            None => println!("  {}: {} (inactive or unknown)", label, id),
        },
        None => println!("  {}: (unset)", label),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;

    let model_id = match args.model {
        Some(ref reference) => Some(require_model(&store, reference)?.id.unwrap_or_default()),
        None => None,
    };

    let variants: Vec<_> = store
        .list_specifications(model_id)
        .into_diagnostic()?
        .into_iter()
        .filter(|s| !s.is_base())
        .collect();

    if args.count {
        println!("{}", variants.len());
        return Ok(());
    }

    if variants.is_empty() {
        println!("No variants found.");
        return Ok(());
    }

    let format = effective_format(global, OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&variants).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&variants).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("id,model_id,name,code,parts,total_material_cost");
            for v in &variants {
                println!(
                    "{},{},{},{},{},{:.2}",
                    v.id.unwrap_or_default(),
                    v.model_id,
                    escape_csv(&v.variant_name),
                    escape_csv(&v.variant_code),
                    v.cutting_parts.len(),
                    v.total_material_cost
                );
            }
        }
        OutputFormat::Id => {
            for v in &variants {
                println!("{}", v.id.unwrap_or_default());
            }
        }
        _ => {
            println!("ID\tMODEL\tNAME\tCODE\tPARTS\tTOTAL");
            for v in &variants {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{:.2}",
                    v.id.unwrap_or_default(),
                    v.model_id,
                    v.variant_name,
                    v.variant_code,
                    v.cutting_parts.len(),
                    v.total_material_cost
                );
            }
        }
    }

    Ok(())
}
