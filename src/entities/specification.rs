//! Specification entity - base and variant bills of material
//!
//! A *base* specification (`is_default = true`) enumerates the allowed
//! option sets for a model; a *variant* specification resolves each
//! attribute to exactly one concrete choice and carries the aggregated
//! material cost. The serde shapes of `CuttingPartEntry`,
//! `HardwareEntry` and `SoleEntry` are the canonical encoding of the
//! JSON columns on a `specifications` row and must stay compatible with
//! rows produced by the legacy system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cutting part (leather/fabric piece) of a specification.
///
/// `consumption` is the per-pair material consumption in dm². On a base
/// record `material` is free text; on a variant record it names a
/// concrete catalog material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingPartEntry {
    /// Part name (identity key within one specification)
    pub name: String,

    /// Pieces cut per pair
    pub quantity: u32,

    /// Material consumption per pair, dm²
    pub consumption: f64,

    /// Material description or catalog material name
    #[serde(default)]
    pub material: Option<String>,

    /// Free-form notes
    #[serde(default)]
    pub notes: String,
}

impl CuttingPartEntry {
    pub fn new(name: impl Into<String>, quantity: u32, consumption: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            consumption,
            material: None,
            notes: String::new(),
        }
    }
}

/// Counting unit for hardware items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HardwareUnit {
    #[default]
    Pcs,
    Pair,
    Set,
}

impl std::fmt::Display for HardwareUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HardwareUnit::Pcs => write!(f, "pcs"),
            HardwareUnit::Pair => write!(f, "pair"),
            HardwareUnit::Set => write!(f, "set"),
        }
    }
}

impl std::str::FromStr for HardwareUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pcs" => Ok(HardwareUnit::Pcs),
            "pair" => Ok(HardwareUnit::Pair),
            "set" => Ok(HardwareUnit::Set),
            _ => Err(format!("Invalid unit: {}. Use 'pcs', 'pair' or 'set'", s)),
        }
    }
}

/// One hardware item (eyelets, buckles, zippers, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareEntry {
    pub name: String,

    /// Quantity in `unit` terms (fractional for set-based items)
    pub quantity: f64,

    #[serde(default)]
    pub unit: HardwareUnit,

    #[serde(default)]
    pub notes: String,
}

/// One sole configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoleEntry {
    /// Sole material description
    pub material: String,

    /// Catalog material id, when the description maps to the catalog
    #[serde(default)]
    pub material_id: Option<i64>,

    /// Sole thickness, mm
    #[serde(rename = "thickness")]
    pub thickness_mm: f64,

    #[serde(default)]
    pub color: String,

    /// Heel height, mm
    #[serde(rename = "heel_height")]
    pub heel_height_mm: f64,

    /// Platform height, mm
    #[serde(rename = "platform_height")]
    pub platform_height_mm: f64,
}

/// A specification row: either the base bill-of-material of a model or
/// one of its production variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    /// Database id (None until persisted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Owning model
    pub model_id: i64,

    /// True for the model's base specification
    pub is_default: bool,

    /// Variant display name (empty on base records)
    #[serde(default)]
    pub variant_name: String,

    /// Variant production code (empty on base records)
    #[serde(default)]
    pub variant_code: String,

    /// Chosen perforation type (variant records only)
    #[serde(default)]
    pub perforation_id: Option<i64>,

    /// Chosen lining type (variant records only)
    #[serde(default)]
    pub lining_id: Option<i64>,

    /// Lasting type (meaningful on both record kinds)
    #[serde(default)]
    pub lasting_type_id: Option<i64>,

    /// Allowed perforation types (base records only, canonical list form)
    #[serde(default)]
    pub perforation_ids: Vec<i64>,

    /// Allowed lining types (base records only, canonical list form)
    #[serde(default)]
    pub lining_ids: Vec<i64>,

    #[serde(default)]
    pub cutting_parts: Vec<CuttingPartEntry>,

    #[serde(default)]
    pub hardware: Vec<HardwareEntry>,

    #[serde(default)]
    pub soles: Vec<SoleEntry>,

    /// Aggregated material cost, persisted for display without
    /// recomputation on read
    #[serde(default)]
    pub total_material_cost: f64,

    pub created: DateTime<Utc>,

    pub updated: DateTime<Utc>,
}

impl Specification {
    /// Create a new unsaved base specification for a model
    pub fn new_base(model_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            model_id,
            is_default: true,
            variant_name: String::new(),
            variant_code: String::new(),
            perforation_id: None,
            lining_id: None,
            lasting_type_id: None,
            perforation_ids: Vec::new(),
            lining_ids: Vec::new(),
            cutting_parts: Vec::new(),
            hardware: Vec::new(),
            soles: Vec::new(),
            total_material_cost: 0.0,
            created: now,
            updated: now,
        }
    }

    /// Create a new unsaved variant specification
    pub fn new_variant(
        model_id: i64,
        variant_name: impl Into<String>,
        variant_code: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            model_id,
            is_default: false,
            variant_name: variant_name.into(),
            variant_code: variant_code.into(),
            perforation_id: None,
            lining_id: None,
            lasting_type_id: None,
            perforation_ids: Vec::new(),
            lining_ids: Vec::new(),
            cutting_parts: Vec::new(),
            hardware: Vec::new(),
            soles: Vec::new(),
            total_material_cost: 0.0,
            created: now,
            updated: now,
        }
    }

    /// True when this row is a model's base specification
    pub fn is_base(&self) -> bool {
        self.is_default
    }

    /// Find a cutting part by its name (the identity key)
    pub fn find_part(&self, name: &str) -> Option<&CuttingPartEntry> {
        self.cutting_parts.iter().find(|p| p.name == name)
    }

    /// Total cutting-part consumption in dm²
    pub fn total_consumption(&self) -> f64 {
        self.cutting_parts.iter().map(|p| p.consumption).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_variant() -> Specification {
        let mut spec = Specification::new_variant(7, "Brogue Tan", "A-1027/BT");
        spec.perforation_id = Some(2);
        spec.lining_id = Some(5);
        spec.lasting_type_id = Some(1);
        spec.cutting_parts = vec![
            CuttingPartEntry {
                name: "Vamp".to_string(),
                quantity: 2,
                consumption: 4.2,
                material: Some("Calf leather brown".to_string()),
                notes: String::new(),
            },
            CuttingPartEntry {
                name: "Quarter".to_string(),
                quantity: 4,
                consumption: 3.1,
                material: None,
                notes: "mirror pair".to_string(),
            },
        ];
        spec.hardware = vec![HardwareEntry {
            name: "Eyelet 4mm".to_string(),
            quantity: 16.0,
            unit: HardwareUnit::Pcs,
            notes: String::new(),
        }];
        spec.soles = vec![SoleEntry {
            material: "TR rubber".to_string(),
            material_id: Some(31),
            thickness_mm: 8.0,
            color: "black".to_string(),
            heel_height_mm: 25.0,
            platform_height_mm: 4.0,
        }];
        spec
    }

    #[test]
    fn test_cutting_part_wire_shape() {
        let part = CuttingPartEntry::new("Vamp", 2, 4.2);
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["name"], "Vamp");
        assert_eq!(json["quantity"], 2);
        // material must be present (and null) even when unset
        assert!(json.get("material").is_some());
        assert!(json["material"].is_null());
        assert_eq!(json["notes"], "");
    }

    #[test]
    fn test_sole_wire_field_names() {
        let sole = SoleEntry {
            material: "TR rubber".to_string(),
            material_id: None,
            thickness_mm: 8.0,
            color: "black".to_string(),
            heel_height_mm: 25.0,
            platform_height_mm: 0.0,
        };
        let json = serde_json::to_value(&sole).unwrap();
        // legacy column shape uses unsuffixed keys
        assert!(json.get("thickness").is_some());
        assert!(json.get("heel_height").is_some());
        assert!(json.get("platform_height").is_some());
        assert!(json.get("thickness_mm").is_none());
        assert!(json["material_id"].is_null());
    }

    #[test]
    fn test_hardware_unit_serialization() {
        let hw = HardwareEntry {
            name: "Buckle".to_string(),
            quantity: 1.0,
            unit: HardwareUnit::Pair,
            notes: String::new(),
        };
        let json = serde_json::to_string(&hw).unwrap();
        assert!(json.contains("\"unit\":\"pair\""));
    }

    #[test]
    fn test_specification_roundtrip() {
        let spec = sample_variant();
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: Specification = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, parsed);
    }

    #[test]
    fn test_decode_tolerates_missing_optional_collections() {
        // A minimal legacy payload carries no hardware/soles keys at all
        let json = r#"{
            "model_id": 3,
            "is_default": true,
            "created": "2024-05-01T10:00:00Z",
            "updated": "2024-05-01T10:00:00Z"
        }"#;
        let spec: Specification = serde_json::from_str(json).unwrap();
        assert!(spec.cutting_parts.is_empty());
        assert!(spec.hardware.is_empty());
        assert!(spec.soles.is_empty());
        assert_eq!(spec.variant_name, "");
    }

    #[test]
    fn test_find_part_by_name() {
        let spec = sample_variant();
        assert!(spec.find_part("Vamp").is_some());
        assert!(spec.find_part("Tongue").is_none());
    }
}
