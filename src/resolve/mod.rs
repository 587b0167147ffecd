//! Base/variant specification resolution
//!
//! Turns a model's base specification plus user edits into a
//! persistable variant specification, and re-opens persisted variants
//! as editable view-models. The pieces:
//!
//! - [`legacy`]: reconciles the schema's dual scalar/array option
//!   representation into the canonical list form
//! - [`inherit`]: seeds a variant's cutting-part table from the base
//! - [`resolver`]: the state machine orchestrating load, edit,
//!   validation and save

pub mod inherit;
pub mod legacy;
pub mod resolver;

use thiserror::Error;

use crate::store::StoreError;

pub use inherit::{append_part, inherit, VariantCuttingPart};
pub use resolver::{ResolvePhase, SpecificationResolver, ValidationIssue, VariantEditor};

/// A list of field-level validation problems, rendered one per line
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssues(pub Vec<ValidationIssue>);

impl std::fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed:")?;
        for issue in &self.0 {
            write!(f, "\n  {}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

/// Errors that can occur while resolving a variant specification
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("model {model_id} has no base specification; save the model's base parameters first")]
    NoBaseSpecification { model_id: i64 },

    #[error("specification {0} not found")]
    SpecificationNotFound(i64),

    #[error("specification {0} is a base record, not a variant")]
    NotAVariant(i64),

    #[error("a cutting part named '{0}' already exists in this specification")]
    DuplicatePartName(String),

    #[error("no cutting part named '{0}' in this specification")]
    UnknownPart(String),

    #[error("cutting part '{0}' is inherited from the base specification and cannot be removed")]
    InheritedPart(String),

    #[error("{0}")]
    Validation(ValidationIssues),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
