//! Persistence layer
//!
//! The resolution engine performs no I/O of its own: everything goes
//! through the [`SpecRepository`] trait, injected into the resolver.
//! [`SqliteStore`] is the production implementation over the project's
//! `factory.db`.

pub mod sqlite;

use thiserror::Error;

use crate::catalog::{CatalogKind, CatalogRecord};
use crate::entities::Specification;

pub use sqlite::SqliteStore;

/// The repository surface consumed by the resolution engine
pub trait SpecRepository {
    /// Fetch a model's base specification (`is_default = true`)
    fn base_specification(&self, model_id: i64) -> Result<Option<Specification>, StoreError>;

    /// Fetch a specification by id
    fn specification(&self, spec_id: i64) -> Result<Option<Specification>, StoreError>;

    /// Insert or update a specification in a single transaction,
    /// assigning `spec.id` on first save
    fn save_specification(&mut self, spec: &mut Specification) -> Result<(), StoreError>;

    /// List the active records of a catalog kind
    fn list_active_catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogRecord>, StoreError>;

    /// Unit price of a material, when the catalog carries one
    fn material_price(&self, material_id: i64) -> Result<Option<f64>, StoreError>;
}

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("article '{0}' is already in use by another model")]
    DuplicateArticle(String),

    #[error("model {0} already has a base specification")]
    BaseAlreadyExists(i64),

    #[error("cannot delete the base specification of model {model_id}: {variant_count} variant(s) still depend on it")]
    BaseInUse { model_id: i64, variant_count: i64 },

    #[error("specification {0} not found")]
    SpecificationNotFound(i64),
}
