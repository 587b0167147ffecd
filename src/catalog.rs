//! Option catalog - read-only reference data lookup
//!
//! The resolution engine consults the catalog tables (perforation,
//! lining and lasting types, cutting-part templates, materials) but
//! never mutates them; catalog maintenance happens through the
//! `lpt catalog` commands.

use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::store::{SpecRepository, StoreError};

/// The reference tables consulted by the resolution engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogKind {
    Perforation,
    Lining,
    Lasting,
    PartTemplate,
    Material,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Perforation => "perforation",
            CatalogKind::Lining => "lining",
            CatalogKind::Lasting => "lasting",
            CatalogKind::PartTemplate => "part-template",
            CatalogKind::Material => "material",
        }
    }

    /// Get all catalog kinds
    pub fn all() -> &'static [CatalogKind] {
        &[
            CatalogKind::Perforation,
            CatalogKind::Lining,
            CatalogKind::Lasting,
            CatalogKind::PartTemplate,
            CatalogKind::Material,
        ]
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "perforation" => Ok(CatalogKind::Perforation),
            "lining" => Ok(CatalogKind::Lining),
            "lasting" => Ok(CatalogKind::Lasting),
            "part-template" | "template" => Ok(CatalogKind::PartTemplate),
            "material" => Ok(CatalogKind::Material),
            _ => Err(format!(
                "Unknown catalog kind: {}. Use perforation, lining, lasting, part-template or material",
                s
            )),
        }
    }
}

/// One reference record. `price` is populated for materials only;
/// `category` groups materials (leather, lining, sole, ...) and
/// cutting-part templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Unit price per dm² (materials only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl CatalogRecord {
    /// Create a new active record with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            code: None,
            name: name.into(),
            category: None,
            price: None,
            is_active: true,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}

/// An id/name pair offered to the presentation layer as a choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogOption {
    pub id: i64,
    pub name: String,
}

/// In-memory snapshot of the active catalog records, loaded once per
/// resolve operation.
#[derive(Debug, Default)]
pub struct OptionCatalog {
    records: HashMap<CatalogKind, Vec<CatalogRecord>>,
}

impl OptionCatalog {
    /// Load the active records of every catalog kind from the repository
    pub fn load(repo: &dyn SpecRepository) -> Result<Self, StoreError> {
        let mut records = HashMap::new();
        for kind in CatalogKind::all() {
            records.insert(*kind, repo.list_active_catalog(*kind)?);
        }
        Ok(Self { records })
    }

    /// Build a catalog from in-memory records (used by tests)
    pub fn from_records(records: HashMap<CatalogKind, Vec<CatalogRecord>>) -> Self {
        Self { records }
    }

    /// All active records of a kind
    pub fn active(&self, kind: CatalogKind) -> &[CatalogRecord] {
        self.records.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find an active record by id
    pub fn find(&self, kind: CatalogKind, id: i64) -> Option<&CatalogRecord> {
        self.active(kind).iter().find(|r| r.id == Some(id))
    }

    /// Resolve ids to (id, name) options, preserving input order.
    /// Ids missing from the catalog are dropped, never fabricated.
    pub fn resolve_names(&self, kind: CatalogKind, ids: &[i64]) -> Vec<CatalogOption> {
        ids.iter()
            .filter_map(|id| {
                self.find(kind, *id).map(|r| CatalogOption {
                    id: *id,
                    name: r.name.clone(),
                })
            })
            .collect()
    }

    /// All active records of a kind as (id, name) options
    pub fn options(&self, kind: CatalogKind) -> Vec<CatalogOption> {
        self.active(kind)
            .iter()
            .filter_map(|r| {
                r.id.map(|id| CatalogOption {
                    id,
                    name: r.name.clone(),
                })
            })
            .collect()
    }

    /// Unit price of a material, if the catalog carries one
    pub fn material_price(&self, material_id: i64) -> Option<f64> {
        self.find(CatalogKind::Material, material_id)
            .and_then(|r| r.price)
    }

    /// Find a material by exact name. Used to re-attach the persisted
    /// material text of a variant cutting part to its catalog slot.
    pub fn find_material_by_name(&self, name: &str) -> Option<&CatalogRecord> {
        self.active(CatalogKind::Material)
            .iter()
            .find(|r| r.name == name)
    }

    /// The material subset offered for cutting parts: leather and
    /// lining categories. Falls back to the full material list when no
    /// record carries those categories.
    pub fn cutting_materials(&self) -> Vec<&CatalogRecord> {
        let subset: Vec<&CatalogRecord> = self
            .active(CatalogKind::Material)
            .iter()
            .filter(|r| {
                r.category
                    .as_deref()
                    .map(|c| {
                        let c = c.to_lowercase();
                        c == "leather" || c == "lining"
                    })
                    .unwrap_or(false)
            })
            .collect();

        if subset.is_empty() {
            self.active(CatalogKind::Material).iter().collect()
        } else {
            subset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> OptionCatalog {
        let mut records = HashMap::new();
        records.insert(
            CatalogKind::Perforation,
            vec![
                CatalogRecord {
                    id: Some(1),
                    ..CatalogRecord::new("Full brogue")
                },
                CatalogRecord {
                    id: Some(2),
                    ..CatalogRecord::new("Half brogue")
                },
                CatalogRecord {
                    id: Some(3),
                    ..CatalogRecord::new("Plain")
                },
            ],
        );
        records.insert(
            CatalogKind::Material,
            vec![
                CatalogRecord {
                    id: Some(10),
                    ..CatalogRecord::new("Calf leather brown")
                        .with_category("leather")
                        .with_price(120.0)
                },
                CatalogRecord {
                    id: Some(11),
                    ..CatalogRecord::new("Pig lining beige").with_category("lining")
                },
                CatalogRecord {
                    id: Some(31),
                    ..CatalogRecord::new("TR rubber").with_category("sole").with_price(14.5)
                },
            ],
        );
        OptionCatalog::from_records(records)
    }

    #[test]
    fn test_resolve_names_preserves_order_and_drops_unknown() {
        let catalog = sample_catalog();
        let options = catalog.resolve_names(CatalogKind::Perforation, &[3, 99, 1]);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].id, 3);
        assert_eq!(options[0].name, "Plain");
        assert_eq!(options[1].id, 1);
    }

    #[test]
    fn test_material_price_lookup() {
        let catalog = sample_catalog();
        assert_eq!(catalog.material_price(10), Some(120.0));
        assert_eq!(catalog.material_price(11), None);
        assert_eq!(catalog.material_price(999), None);
    }

    #[test]
    fn test_cutting_materials_subset() {
        let catalog = sample_catalog();
        let subset = catalog.cutting_materials();
        assert_eq!(subset.len(), 2);
        assert!(subset.iter().all(|r| {
            let c = r.category.as_deref().unwrap_or_default();
            c == "leather" || c == "lining"
        }));
    }

    #[test]
    fn test_find_material_by_name_exact() {
        let catalog = sample_catalog();
        assert!(catalog.find_material_by_name("Calf leather brown").is_some());
        assert!(catalog.find_material_by_name("calf leather brown").is_none());
    }

    #[test]
    fn test_catalog_kind_parse() {
        assert_eq!("material".parse::<CatalogKind>().unwrap(), CatalogKind::Material);
        assert_eq!(
            "part-template".parse::<CatalogKind>().unwrap(),
            CatalogKind::PartTemplate
        );
        assert!("widgets".parse::<CatalogKind>().is_err());
    }
}
