//! The specification resolution state machine
//!
//! One resolver instance drives one resolve-and-save operation:
//!
//! ```text
//! Uninitialized -> LoadingBase -> Editable -> Validated -> Persisted
//!                       \-> Error
//! ```
//!
//! `begin_variant` / `open_variant` perform the LoadingBase step and
//! hand back a [`VariantEditor`] view-model for the presentation layer
//! to mutate. `validate` gates the transition to Validated and `save`
//! recomputes the aggregated material cost immediately before writing,
//! so the persisted total is always consistent with the persisted
//! parts. A failed save leaves the editor untouched for retry.

use chrono::{DateTime, Utc};
use rand::distr::{Alphanumeric, SampleString};
use tracing::{debug, warn};

use crate::catalog::{CatalogKind, CatalogOption, OptionCatalog};
use crate::cost::{self, CostBreakdown, PricedPart};
use crate::entities::{CuttingPartEntry, HardwareEntry, SoleEntry, Specification};
use crate::resolve::{append_part, inherit, ResolveError, ValidationIssues, VariantCuttingPart};
use crate::store::SpecRepository;

/// The states of one resolve-and-save operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvePhase {
    #[default]
    Uninitialized,
    LoadingBase,
    Editable,
    Validated,
    Persisted,
    Error,
}

/// One field-level validation finding
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The editable view-model of a variant under construction. Holds the
/// allowed-option lists resolved from the base specification, the
/// seeded cutting-part table and the user's choices; exposes no
/// terminal or widget types.
#[derive(Debug, Clone)]
pub struct VariantEditor {
    /// Persisted row id; None until first save
    pub spec_id: Option<i64>,
    pub model_id: i64,
    pub base_spec_id: i64,

    pub variant_name: String,
    pub variant_code: String,

    /// The base's allowed perforation ids (empty = base declares no
    /// restriction and the full catalog is offered)
    pub allowed_perforation_ids: Vec<i64>,
    pub allowed_lining_ids: Vec<i64>,

    /// Choices offered to the user, resolved to display names
    pub perforation_options: Vec<CatalogOption>,
    pub lining_options: Vec<CatalogOption>,
    pub lasting_options: Vec<CatalogOption>,

    pub perforation_id: Option<i64>,
    pub lining_id: Option<i64>,
    pub lasting_type_id: Option<i64>,

    pub cutting_parts: Vec<VariantCuttingPart>,
    pub hardware: Vec<HardwareEntry>,
    pub soles: Vec<SoleEntry>,

    /// Original creation timestamp when editing an existing variant
    created: Option<DateTime<Utc>>,
}

impl VariantEditor {
    pub fn choose_perforation(&mut self, id: Option<i64>) {
        self.perforation_id = id;
    }

    pub fn choose_lining(&mut self, id: Option<i64>) {
        self.lining_id = id;
    }

    pub fn set_lasting(&mut self, id: Option<i64>) {
        self.lasting_type_id = id;
    }

    fn part_mut(&mut self, name: &str) -> Result<&mut VariantCuttingPart, ResolveError> {
        self.cutting_parts
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| ResolveError::UnknownPart(name.to_string()))
    }

    /// Assign a catalog material to a cutting part
    pub fn set_part_material(
        &mut self,
        part: &str,
        material_id: i64,
        material_name: impl Into<String>,
    ) -> Result<(), ResolveError> {
        let row = self.part_mut(part)?;
        row.material_id = Some(material_id);
        row.material_name = Some(material_name.into());
        Ok(())
    }

    /// Clear a cutting part's material slot
    pub fn clear_part_material(&mut self, part: &str) -> Result<(), ResolveError> {
        let row = self.part_mut(part)?;
        row.material_id = None;
        row.material_name = None;
        Ok(())
    }

    pub fn set_part_quantity(&mut self, part: &str, quantity: u32) -> Result<(), ResolveError> {
        self.part_mut(part)?.quantity = quantity;
        Ok(())
    }

    pub fn set_part_consumption(
        &mut self,
        part: &str,
        consumption: f64,
    ) -> Result<(), ResolveError> {
        self.part_mut(part)?.consumption = consumption;
        Ok(())
    }

    pub fn set_part_notes(&mut self, part: &str, notes: impl Into<String>) -> Result<(), ResolveError> {
        self.part_mut(part)?.notes = notes.into();
        Ok(())
    }

    /// Append a part beyond the inherited list (duplicate names are
    /// rejected)
    pub fn add_part(&mut self, entry: CuttingPartEntry) -> Result<(), ResolveError> {
        append_part(&mut self.cutting_parts, entry)
    }

    /// Remove an appended part. Inherited rows are identity and cannot
    /// be removed from a variant.
    pub fn remove_part(&mut self, name: &str) -> Result<(), ResolveError> {
        let index = self
            .cutting_parts
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ResolveError::UnknownPart(name.to_string()))?;

        if self.cutting_parts[index].inherited {
            return Err(ResolveError::InheritedPart(name.to_string()));
        }

        self.cutting_parts.remove(index);
        Ok(())
    }
}

/// Orchestrates option-catalog lookup, legacy normalization,
/// cutting-part inheritance and cost aggregation for one variant.
pub struct SpecificationResolver<'a, R: SpecRepository> {
    repo: &'a mut R,
    catalog: OptionCatalog,
    phase: ResolvePhase,
}

impl<'a, R: SpecRepository> SpecificationResolver<'a, R> {
    /// Create a resolver over the given repository, snapshotting the
    /// active option catalog.
    pub fn new(repo: &'a mut R) -> Result<Self, ResolveError> {
        let catalog = OptionCatalog::load(&*repo)?;
        Ok(Self {
            repo,
            catalog,
            phase: ResolvePhase::Uninitialized,
        })
    }

    pub fn phase(&self) -> ResolvePhase {
        self.phase
    }

    pub fn catalog(&self) -> &OptionCatalog {
        &self.catalog
    }

    /// Start the create-variant flow for a model. Fails when the model
    /// has no base specification.
    pub fn begin_variant(&mut self, model_id: i64) -> Result<VariantEditor, ResolveError> {
        self.phase = ResolvePhase::LoadingBase;

        let base = match self.repo.base_specification(model_id) {
            Ok(Some(base)) => base,
            Ok(None) => {
                self.phase = ResolvePhase::Error;
                return Err(ResolveError::NoBaseSpecification { model_id });
            }
            Err(err) => {
                self.phase = ResolvePhase::Error;
                return Err(err.into());
            }
        };

        debug!(model_id, base_spec_id = ?base.id, "seeding variant from base specification");

        let mut editor = self.editor_shell(&base);
        editor.cutting_parts = inherit(&base.cutting_parts);
        editor.hardware = base.hardware.clone();
        editor.soles = base.soles.clone();
        editor.lasting_type_id = base.lasting_type_id;

        self.phase = ResolvePhase::Editable;
        Ok(editor)
    }

    /// Re-open a persisted variant for editing. Cutting parts are never
    /// re-inherited once the variant owns its own list.
    pub fn open_variant(&mut self, spec_id: i64) -> Result<VariantEditor, ResolveError> {
        self.phase = ResolvePhase::LoadingBase;

        let spec = match self.repo.specification(spec_id) {
            Ok(Some(spec)) => spec,
            Ok(None) => {
                self.phase = ResolvePhase::Error;
                return Err(ResolveError::SpecificationNotFound(spec_id));
            }
            Err(err) => {
                self.phase = ResolvePhase::Error;
                return Err(err.into());
            }
        };

        if spec.is_base() {
            self.phase = ResolvePhase::Error;
            return Err(ResolveError::NotAVariant(spec_id));
        }

        let base = match self.repo.base_specification(spec.model_id) {
            Ok(Some(base)) => base,
            Ok(None) => {
                self.phase = ResolvePhase::Error;
                return Err(ResolveError::NoBaseSpecification {
                    model_id: spec.model_id,
                });
            }
            Err(err) => {
                self.phase = ResolvePhase::Error;
                return Err(err.into());
            }
        };

        let mut editor = self.editor_shell(&base);
        editor.spec_id = spec.id;
        editor.variant_name = spec.variant_name.clone();
        editor.variant_code = spec.variant_code.clone();
        editor.perforation_id = spec.perforation_id;
        editor.lining_id = spec.lining_id;
        editor.lasting_type_id = spec.lasting_type_id;
        editor.hardware = spec.hardware.clone();
        editor.soles = spec.soles.clone();
        editor.created = Some(spec.created);

        editor.cutting_parts = if spec.cutting_parts.is_empty() {
            // A variant that never owned parts is seeded late
            inherit(&base.cutting_parts)
        } else {
            self.rehydrate_parts(&spec, &base)
        };

        self.phase = ResolvePhase::Editable;
        Ok(editor)
    }

    /// Validate the editor state. Blocking problems come back as
    /// `ResolveError::Validation`; non-blocking findings (zero
    /// consumption, unpriced materials) are returned as warnings. A
    /// blank variant code is replaced with a generated placeholder.
    pub fn validate(
        &mut self,
        editor: &mut VariantEditor,
    ) -> Result<Vec<ValidationIssue>, ResolveError> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if editor.variant_name.trim().is_empty() {
            errors.push(ValidationIssue::new(
                "variant_name",
                "a variant name is required",
            ));
        }

        if editor.variant_code.trim().is_empty() {
            editor.variant_code = generate_variant_code();
        }

        for part in &editor.cutting_parts {
            let field = format!("cutting_parts.{}", part.name);
            if part.quantity == 0 {
                errors.push(ValidationIssue::new(&field, "quantity must be positive"));
            }
            if part.consumption == 0.0 {
                warnings.push(ValidationIssue::new(&field, "consumption is zero"));
            }
            if part.material_id.is_none() {
                warnings.push(ValidationIssue::new(
                    &field,
                    "no material chosen; the part will not contribute to cost",
                ));
            }
        }

        if let Some(id) = editor.perforation_id {
            if !editor.allowed_perforation_ids.is_empty()
                && !editor.allowed_perforation_ids.contains(&id)
            {
                errors.push(ValidationIssue::new(
                    "perforation_id",
                    format!("perforation {id} is not among the base specification's allowed options"),
                ));
            }
        }

        if let Some(id) = editor.lining_id {
            if !editor.allowed_lining_ids.is_empty() && !editor.allowed_lining_ids.contains(&id) {
                errors.push(ValidationIssue::new(
                    "lining_id",
                    format!("lining {id} is not among the base specification's allowed options"),
                ));
            }
        }

        if !errors.is_empty() {
            return Err(ResolveError::Validation(ValidationIssues(errors)));
        }

        self.phase = ResolvePhase::Validated;
        Ok(warnings)
    }

    /// Persist the variant. The aggregated material cost is recomputed
    /// from the exact part list being written, in the same transaction
    /// as the row itself. On failure the editor (and the Validated
    /// phase) survive so the caller can retry without re-entering data.
    pub fn save(&mut self, editor: &mut VariantEditor) -> Result<Specification, ResolveError> {
        if self.phase != ResolvePhase::Validated {
            self.validate(editor)?;
        }

        let mut spec = self.build_specification(editor);

        match self.repo.save_specification(&mut spec) {
            Ok(()) => {
                editor.spec_id = spec.id;
                self.phase = ResolvePhase::Persisted;
                Ok(spec)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Preview the per-material cost breakdown of the current editor
    /// state without persisting anything.
    pub fn cost_breakdown(&self, editor: &VariantEditor) -> CostBreakdown {
        cost::aggregate(&self.priced_parts(editor))
    }

    fn editor_shell(&self, base: &Specification) -> VariantEditor {
        let allowed_perforation_ids = base.perforation_ids.clone();
        let allowed_lining_ids = base.lining_ids.clone();

        // A base that declares no allowed set leaves the choice open to
        // the full active catalog.
        let perforation_options = if allowed_perforation_ids.is_empty() {
            self.catalog.options(CatalogKind::Perforation)
        } else {
            self.catalog
                .resolve_names(CatalogKind::Perforation, &allowed_perforation_ids)
        };
        let lining_options = if allowed_lining_ids.is_empty() {
            self.catalog.options(CatalogKind::Lining)
        } else {
            self.catalog
                .resolve_names(CatalogKind::Lining, &allowed_lining_ids)
        };

        VariantEditor {
            spec_id: None,
            model_id: base.model_id,
            base_spec_id: base.id.unwrap_or_default(),
            variant_name: String::new(),
            variant_code: String::new(),
            allowed_perforation_ids,
            allowed_lining_ids,
            perforation_options,
            lining_options,
            lasting_options: self.catalog.options(CatalogKind::Lasting),
            perforation_id: None,
            lining_id: None,
            lasting_type_id: None,
            cutting_parts: Vec::new(),
            hardware: Vec::new(),
            soles: Vec::new(),
            created: None,
        }
    }

    /// Rebuild editable rows from a persisted variant, re-attaching
    /// material text to catalog slots by exact name.
    fn rehydrate_parts(
        &self,
        spec: &Specification,
        base: &Specification,
    ) -> Vec<VariantCuttingPart> {
        spec.cutting_parts
            .iter()
            .map(|entry| {
                let material_record = entry
                    .material
                    .as_deref()
                    .and_then(|name| self.catalog.find_material_by_name(name));

                if let Some(name) = entry.material.as_deref() {
                    if material_record.is_none() {
                        warn!(
                            part = %entry.name,
                            material = %name,
                            "persisted material not found in catalog; leaving slot unset"
                        );
                    }
                }

                VariantCuttingPart {
                    name: entry.name.clone(),
                    quantity: entry.quantity,
                    consumption: entry.consumption,
                    notes: entry.notes.clone(),
                    inherited: base.find_part(&entry.name).is_some(),
                    material_id: material_record.and_then(|r| r.id),
                    material_name: material_record.map(|r| r.name.clone()),
                }
            })
            .collect()
    }

    fn priced_parts(&self, editor: &VariantEditor) -> Vec<PricedPart> {
        editor
            .cutting_parts
            .iter()
            .filter_map(|part| {
                part.material_id.map(|material_id| PricedPart {
                    name: part.name.clone(),
                    material_id,
                    consumption: part.consumption,
                    unit_price: self.catalog.material_price(material_id),
                })
            })
            .collect()
    }

    fn build_specification(&self, editor: &VariantEditor) -> Specification {
        let now = Utc::now();
        let breakdown = self.cost_breakdown(editor);

        Specification {
            id: editor.spec_id,
            model_id: editor.model_id,
            is_default: false,
            variant_name: editor.variant_name.trim().to_string(),
            variant_code: editor.variant_code.trim().to_string(),
            perforation_id: editor.perforation_id,
            lining_id: editor.lining_id,
            lasting_type_id: editor.lasting_type_id,
            perforation_ids: Vec::new(),
            lining_ids: Vec::new(),
            cutting_parts: editor.cutting_parts.iter().map(|p| p.to_entry()).collect(),
            hardware: editor.hardware.clone(),
            soles: editor.soles.clone(),
            total_material_cost: breakdown.grand_total,
            created: editor.created.unwrap_or(now),
            updated: now,
        }
    }
}

/// Placeholder production code for variants saved without one
fn generate_variant_code() -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::rng(), 6).to_uppercase();
    format!("VAR-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRecord;
    use crate::entities::Model;
    use crate::store::SqliteStore;

    /// A store seeded with the catalog, one model and its base
    /// specification (perforations [1,2,3] allowed, lining [5]).
    fn seeded_store() -> (SqliteStore, i64) {
        let mut store = SqliteStore::open_in_memory().unwrap();

        for (kind, names) in [
            (CatalogKind::Perforation, vec!["Full brogue", "Half brogue", "Plain"]),
            (CatalogKind::Lasting, vec!["Board lasted"]),
        ] {
            for name in names {
                let mut record = CatalogRecord::new(name);
                store.add_catalog_record(kind, &mut record).unwrap();
            }
        }

        // Lining type with a known id of 5
        for name in ["L-a", "L-b", "L-c", "L-d", "Textile warm"] {
            let mut record = CatalogRecord::new(name);
            store
                .add_catalog_record(CatalogKind::Lining, &mut record)
                .unwrap();
        }

        let mut leather = CatalogRecord::new("Calf leather brown")
            .with_category("leather")
            .with_price(120.0);
        store
            .add_catalog_record(CatalogKind::Material, &mut leather)
            .unwrap();
        let mut lining = CatalogRecord::new("Pig lining beige").with_category("lining");
        store
            .add_catalog_record(CatalogKind::Material, &mut lining)
            .unwrap();

        let mut model = Model::new("A-1027", "Oxford Classic");
        store.save_model(&mut model).unwrap();
        let model_id = model.id.unwrap();

        let mut base = Specification::new_base(model_id);
        base.perforation_ids = vec![1, 2, 3];
        base.lining_ids = vec![5];
        base.lasting_type_id = Some(1);
        base.cutting_parts = vec![
            CuttingPartEntry::new("Union", 2, 3.5),
            CuttingPartEntry::new("Tongue", 2, 1.0),
        ];
        store.save_specification(&mut base).unwrap();

        (store, model_id)
    }

    #[test]
    fn test_begin_variant_requires_base() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut model = Model::new("B-0001", "No Base Yet");
        store.save_model(&mut model).unwrap();
        let model_id = model.id.unwrap();

        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let err = resolver.begin_variant(model_id).unwrap_err();
        assert!(matches!(err, ResolveError::NoBaseSpecification { .. }));
        assert_eq!(resolver.phase(), ResolvePhase::Error);
    }

    #[test]
    fn test_begin_variant_resolves_allowed_options_by_name() {
        let (mut store, model_id) = seeded_store();
        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let editor = resolver.begin_variant(model_id).unwrap();

        let perforation_ids: Vec<i64> =
            editor.perforation_options.iter().map(|o| o.id).collect();
        assert_eq!(perforation_ids, vec![1, 2, 3]);
        assert!(editor
            .perforation_options
            .iter()
            .any(|o| o.name == "Half brogue"));

        let lining_ids: Vec<i64> = editor.lining_options.iter().map(|o| o.id).collect();
        assert_eq!(lining_ids, vec![5]);
        assert_eq!(editor.lining_options[0].name, "Textile warm");

        // the variant's own choices stay unset until the user picks
        assert!(editor.perforation_id.is_none());
        assert!(editor.lining_id.is_none());
        assert_eq!(resolver.phase(), ResolvePhase::Editable);
    }

    #[test]
    fn test_begin_variant_inherits_parts_locked() {
        let (mut store, model_id) = seeded_store();
        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let editor = resolver.begin_variant(model_id).unwrap();

        assert_eq!(editor.cutting_parts.len(), 2);
        assert!(editor.cutting_parts.iter().all(|p| p.inherited));
        assert!(editor.cutting_parts.iter().all(|p| p.material_id.is_none()));
    }

    #[test]
    fn test_validate_requires_variant_name() {
        let (mut store, model_id) = seeded_store();
        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let mut editor = resolver.begin_variant(model_id).unwrap();

        let err = resolver.validate(&mut editor).unwrap_err();
        match err {
            ResolveError::Validation(issues) => {
                assert!(issues.0.iter().any(|i| i.field == "variant_name"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(resolver.phase(), ResolvePhase::Editable);
    }

    #[test]
    fn test_validate_generates_code_placeholder() {
        let (mut store, model_id) = seeded_store();
        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let mut editor = resolver.begin_variant(model_id).unwrap();
        editor.variant_name = "Brogue Tan".to_string();

        resolver.validate(&mut editor).unwrap();
        assert!(editor.variant_code.starts_with("VAR-"));
        assert_eq!(resolver.phase(), ResolvePhase::Validated);
    }

    #[test]
    fn test_validate_rejects_choice_outside_allowed_set() {
        let (mut store, model_id) = seeded_store();
        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let mut editor = resolver.begin_variant(model_id).unwrap();
        editor.variant_name = "Bad Choice".to_string();
        editor.choose_lining(Some(2)); // base allows only lining 5

        let err = resolver.validate(&mut editor).unwrap_err();
        assert!(matches!(err, ResolveError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let (mut store, model_id) = seeded_store();
        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let mut editor = resolver.begin_variant(model_id).unwrap();
        editor.variant_name = "Zero Qty".to_string();
        editor.set_part_quantity("Union", 0).unwrap();

        let err = resolver.validate(&mut editor).unwrap_err();
        assert!(matches!(err, ResolveError::Validation(_)));
    }

    #[test]
    fn test_zero_consumption_warns_but_does_not_block() {
        let (mut store, model_id) = seeded_store();
        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let mut editor = resolver.begin_variant(model_id).unwrap();
        editor.variant_name = "Zero Consumption".to_string();
        editor.set_part_consumption("Tongue", 0.0).unwrap();

        let warnings = resolver.validate(&mut editor).unwrap();
        assert!(warnings
            .iter()
            .any(|w| w.field == "cutting_parts.Tongue" && w.message.contains("zero")));
    }

    #[test]
    fn test_save_persists_cost_from_same_part_list() {
        let (mut store, model_id) = seeded_store();
        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let mut editor = resolver.begin_variant(model_id).unwrap();
        editor.variant_name = "Brogue Tan".to_string();
        editor.choose_perforation(Some(2));
        editor.choose_lining(Some(5));
        // Union: 3.5 dm² of material 1 at 120.00 -> 420.00
        editor.set_part_material("Union", 1, "Calf leather brown").unwrap();
        // Tongue: unpriced lining material, cost 0, consumption counted
        editor.set_part_material("Tongue", 2, "Pig lining beige").unwrap();

        let breakdown = {
            resolver.validate(&mut editor).unwrap();
            resolver.cost_breakdown(&editor)
        };
        assert_eq!(breakdown.per_material[&1].cost, 420.0);
        assert_eq!(breakdown.per_material[&2].cost, 0.0);
        assert_eq!(breakdown.per_material[&2].consumption, 1.0);

        let saved = resolver.save(&mut editor).unwrap();
        assert_eq!(resolver.phase(), ResolvePhase::Persisted);
        assert_eq!(saved.total_material_cost, 420.0);

        let reloaded = store
            .specification(saved.id.unwrap())
            .unwrap()
            .expect("variant row");
        assert_eq!(reloaded.total_material_cost, 420.0);
        assert_eq!(reloaded.cutting_parts.len(), 2);
        assert_eq!(
            reloaded.cutting_parts[0].material.as_deref(),
            Some("Calf leather brown")
        );
    }

    #[test]
    fn test_saved_variant_keeps_base_part_count() {
        let (mut store, model_id) = seeded_store();
        let base_len = store
            .base_specification(model_id)
            .unwrap()
            .unwrap()
            .cutting_parts
            .len();

        let spec_id = {
            let mut resolver = SpecificationResolver::new(&mut store).unwrap();
            let mut editor = resolver.begin_variant(model_id).unwrap();
            editor.variant_name = "Untouched".to_string();
            resolver.save(&mut editor).unwrap().id.unwrap()
        };

        let reloaded = store.specification(spec_id).unwrap().unwrap();
        assert_eq!(reloaded.cutting_parts.len(), base_len);
    }

    #[test]
    fn test_open_variant_does_not_reinherit() {
        let (mut store, model_id) = seeded_store();

        let spec_id = {
            let mut resolver = SpecificationResolver::new(&mut store).unwrap();
            let mut editor = resolver.begin_variant(model_id).unwrap();
            editor.variant_name = "Keeps Own Parts".to_string();
            editor.set_part_material("Union", 1, "Calf leather brown").unwrap();
            editor
                .add_part(CuttingPartEntry::new("Heel grip", 2, 0.4))
                .unwrap();
            resolver.save(&mut editor).unwrap().id.unwrap()
        };

        // Grow the base afterwards; editing the variant must not pick
        // up the new base part.
        let mut base = store.base_specification(model_id).unwrap().unwrap();
        base.cutting_parts
            .push(CuttingPartEntry::new("Collar", 2, 0.8));
        store.save_specification(&mut base).unwrap();

        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let editor = resolver.open_variant(spec_id).unwrap();

        assert_eq!(editor.cutting_parts.len(), 3);
        assert!(editor.cutting_parts.iter().all(|p| p.name != "Collar"));

        // material text re-attached to the catalog slot by exact name
        let union = editor
            .cutting_parts
            .iter()
            .find(|p| p.name == "Union")
            .unwrap();
        assert_eq!(union.material_id, Some(1));
        assert!(union.inherited);

        // the appended part stays editable
        let grip = editor
            .cutting_parts
            .iter()
            .find(|p| p.name == "Heel grip")
            .unwrap();
        assert!(!grip.inherited);
    }

    #[test]
    fn test_open_variant_rejects_base_records() {
        let (mut store, model_id) = seeded_store();
        let base_id = store
            .base_specification(model_id)
            .unwrap()
            .unwrap()
            .id
            .unwrap();

        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let err = resolver.open_variant(base_id).unwrap_err();
        assert!(matches!(err, ResolveError::NotAVariant(_)));
    }

    #[test]
    fn test_remove_inherited_part_is_rejected() {
        let (mut store, model_id) = seeded_store();
        let mut resolver = SpecificationResolver::new(&mut store).unwrap();
        let mut editor = resolver.begin_variant(model_id).unwrap();

        let err = editor.remove_part("Union").unwrap_err();
        assert!(matches!(err, ResolveError::InheritedPart(_)));

        editor
            .add_part(CuttingPartEntry::new("Heel grip", 2, 0.4))
            .unwrap();
        editor.remove_part("Heel grip").unwrap();
        assert_eq!(editor.cutting_parts.len(), 2);
    }
}
