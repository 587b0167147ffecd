//! Domain record types persisted by the toolkit

pub mod model;
pub mod specification;

pub use model::Model;
pub use specification::{
    CuttingPartEntry, HardwareEntry, HardwareUnit, SoleEntry, Specification,
};
