//! Material cost report for a variant specification

use std::collections::HashMap;
use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::catalog::{CatalogKind, OptionCatalog};
use crate::cli::helpers::format_money;
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::cost::{self, PricedPart};
use crate::store::SpecRepository;

use super::super::utils::open_store;
use super::write_output;

#[derive(clap::Args, Debug)]
pub struct CostArgs {
    /// Specification id of the variant
    pub spec_id: i64,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: CostArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;
    let config = Config::load();
    let currency = config.currency();

    let spec = store
        .specification(args.spec_id)
        .into_diagnostic()?
        .ok_or_else(|| miette::miette!("specification {} not found", args.spec_id))?;

    if spec.is_base() {
        return Err(miette::miette!(
            "specification {} is a base record; cost reports only apply to variants",
            args.spec_id
        ));
    }

    let catalog = OptionCatalog::load(&store).into_diagnostic()?;

    // Re-attach the persisted material text to the catalog to price the
    // parts; parts without a resolvable material stay uncosted.
    let mut priced = Vec::new();
    let mut uncosted: Vec<&str> = Vec::new();
    for part in &spec.cutting_parts {
        let record = part
            .material
            .as_deref()
            .and_then(|name| catalog.find_material_by_name(name));
        match record.and_then(|r| r.id.map(|id| (id, r))) {
            Some((material_id, record)) => priced.push(PricedPart {
                name: part.name.clone(),
                material_id,
                consumption: part.consumption,
                unit_price: record.price,
            }),
            None => uncosted.push(&part.name),
        }
    }

    let breakdown = cost::aggregate(&priced);

    let material_names: HashMap<i64, String> = catalog
        .active(CatalogKind::Material)
        .iter()
        .filter_map(|r| r.id.map(|id| (id, r.name.clone())))
        .collect();

    let mut output = String::new();
    output.push_str(&format!(
        "# Material Cost: {} [{}]\n\n",
        spec.variant_name, spec.variant_code
    ));
    output.push_str(&format!("Specification ID: {}\n\n", args.spec_id));

    let mut table = Builder::default();
    table.push_record(["Material", "Consumption (dm²)", "Unit price", "Cost"]);
    for (material_id, total) in &breakdown.per_material {
        let name = material_names
            .get(material_id)
            .cloned()
            .unwrap_or_else(|| format!("material {material_id}"));
        let unit_price = catalog
            .material_price(*material_id)
            .map(|p| format_money(p, &currency))
            .unwrap_or_else(|| "-".to_string());
        table.push_record([
            name,
            format!("{:.2}", total.consumption),
            unit_price,
            format_money(total.cost, &currency),
        ]);
    }
    output.push_str(&table.build().with(Style::markdown()).to_string());
    output.push('\n');

    output.push_str(&format!(
        "\n**Grand total:** {}\n",
        format_money(breakdown.grand_total, &currency)
    ));

    if (breakdown.grand_total - spec.total_material_cost).abs() > 0.005 {
        output.push_str(&format!(
            "\n*Persisted total is {}; catalog prices changed since the last save. Re-save the variant to refresh it.*\n",
            format_money(spec.total_material_cost, &currency)
        ));
    }

    if !uncosted.is_empty() {
        output.push_str(&format!(
            "\n*{} part(s) without a catalog material: {}*\n",
            uncosted.len(),
            uncosted.join(", ")
        ));
    }

    write_output(&output, args.output)
}
