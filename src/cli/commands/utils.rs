//! Shared plumbing for command implementations

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Project};
use crate::entities::Model;
use crate::store::SqliteStore;

/// Locate the project and open its production store
pub fn open_store(global: &GlobalOpts) -> Result<(Project, SqliteStore)> {
    let project =
        Project::locate(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))?;
    let store = SqliteStore::open(&project.db_path()).into_diagnostic()?;
    Ok((project, store))
}

/// Resolve the effective output format: an explicit `--format` wins,
/// then the configured `default_format`, then the per-command fallback
pub fn effective_format(global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }

    Config::load()
        .default_format
        .as_deref()
        .and_then(|name| OutputFormat::from_str(name, true).ok())
        .filter(|f| *f != OutputFormat::Auto)
        .unwrap_or(fallback)
}

/// Resolve a model reference (id or article), failing with a helpful
/// message when nothing matches
pub fn require_model(store: &SqliteStore, reference: &str) -> Result<Model> {
    store
        .resolve_model(reference)
        .into_diagnostic()?
        .ok_or_else(|| {
            miette::miette!(
                "no model matches '{}'. Use an id or an article ('lpt model list' shows both)",
                reference
            )
        })
}
