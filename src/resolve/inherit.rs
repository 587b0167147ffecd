//! Cutting-part inheritance from base to variant
//!
//! A new variant starts from a snapshot of its base specification's
//! cutting-part list. Inherited rows keep their identity: the name is
//! locked, while quantity, consumption and notes stay editable. Each
//! row gets an unset material-choice slot to be resolved against the
//! leather/lining subset of the material catalog.

use crate::entities::CuttingPartEntry;
use crate::resolve::ResolveError;

/// One editable cutting-part row of a variant under construction
#[derive(Debug, Clone, PartialEq)]
pub struct VariantCuttingPart {
    /// Part name; identity key, locked on inherited rows
    pub name: String,

    pub quantity: u32,

    /// Material consumption per pair, dm²
    pub consumption: f64,

    pub notes: String,

    /// True when the row came from the base specification. Inherited
    /// rows cannot be renamed or removed.
    pub inherited: bool,

    /// Chosen catalog material; unset until the user picks one
    pub material_id: Option<i64>,

    /// Display name of the chosen material
    pub material_name: Option<String>,
}

impl VariantCuttingPart {
    /// Convert back to the persistable entry shape
    pub fn to_entry(&self) -> CuttingPartEntry {
        CuttingPartEntry {
            name: self.name.clone(),
            quantity: self.quantity,
            consumption: self.consumption,
            material: self.material_name.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Seed a variant's cutting-part table from a base specification's
/// list. Name, quantity, consumption and notes are preserved verbatim;
/// every row is marked inherited and gets an unset material slot (the
/// base's free-text material is a description, not a catalog choice,
/// and is deliberately not carried over).
pub fn inherit(base_parts: &[CuttingPartEntry]) -> Vec<VariantCuttingPart> {
    base_parts
        .iter()
        .map(|part| VariantCuttingPart {
            name: part.name.clone(),
            quantity: part.quantity,
            consumption: part.consumption,
            notes: part.notes.clone(),
            inherited: true,
            material_id: None,
            material_name: None,
        })
        .collect()
}

/// Append an additional (non-inherited) part, typically seeded from a
/// cutting-part template. Rejects duplicate names before insertion.
pub fn append_part(
    parts: &mut Vec<VariantCuttingPart>,
    entry: CuttingPartEntry,
) -> Result<(), ResolveError> {
    if parts.iter().any(|p| p.name == entry.name) {
        return Err(ResolveError::DuplicatePartName(entry.name));
    }

    parts.push(VariantCuttingPart {
        name: entry.name,
        quantity: entry.quantity,
        consumption: entry.consumption,
        notes: entry.notes,
        inherited: false,
        material_id: None,
        material_name: None,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_parts() -> Vec<CuttingPartEntry> {
        vec![
            CuttingPartEntry {
                name: "Vamp".to_string(),
                quantity: 2,
                consumption: 4.2,
                material: Some("box calf".to_string()),
                notes: "grain direction along the foot".to_string(),
            },
            CuttingPartEntry {
                name: "Quarter".to_string(),
                quantity: 4,
                consumption: 3.1,
                material: None,
                notes: String::new(),
            },
        ]
    }

    #[test]
    fn test_inherit_preserves_fields_verbatim() {
        let base = base_parts();
        let inherited = inherit(&base);

        assert_eq!(inherited.len(), base.len());
        for (variant, original) in inherited.iter().zip(&base) {
            assert_eq!(variant.name, original.name);
            assert_eq!(variant.quantity, original.quantity);
            assert_eq!(variant.consumption, original.consumption);
            assert_eq!(variant.notes, original.notes);
            assert!(variant.inherited);
        }
    }

    #[test]
    fn test_inherit_leaves_material_slot_unset() {
        let inherited = inherit(&base_parts());
        assert!(inherited.iter().all(|p| p.material_id.is_none()));
        assert!(inherited.iter().all(|p| p.material_name.is_none()));
    }

    #[test]
    fn test_append_part_is_editable() {
        let mut parts = inherit(&base_parts());
        append_part(&mut parts, CuttingPartEntry::new("Tongue", 2, 1.0)).unwrap();

        let appended = parts.last().unwrap();
        assert_eq!(appended.name, "Tongue");
        assert!(!appended.inherited);
    }

    #[test]
    fn test_append_rejects_duplicate_name() {
        let mut parts = inherit(&base_parts());
        let err = append_part(&mut parts, CuttingPartEntry::new("Vamp", 1, 2.0)).unwrap_err();
        assert!(matches!(err, ResolveError::DuplicatePartName(name) if name == "Vamp"));
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_to_entry_roundtrip() {
        let mut part = inherit(&base_parts()).remove(0);
        part.material_id = Some(10);
        part.material_name = Some("Calf leather brown".to_string());

        let entry = part.to_entry();
        assert_eq!(entry.name, "Vamp");
        assert_eq!(entry.material.as_deref(), Some("Calf leather brown"));
    }
}
