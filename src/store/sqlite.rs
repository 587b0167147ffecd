//! SQLite-backed production store
//!
//! Persists models, specifications and the option catalog in the
//! project's `factory.db`. The `specifications` table keeps the
//! legacy JSON column shapes (cutting_parts/hardware/soles payloads,
//! perforation_ids/lining_ids arrays) so rows exported from the old
//! system can be imported unchanged. The scalar/array option duality
//! of legacy rows is folded into the canonical list form here, at the
//! persistence boundary; decode failures on JSON columns degrade to
//! empty lists and are logged, never surfaced as errors.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::catalog::{CatalogKind, CatalogRecord};
use crate::entities::{Model, Specification};
use crate::resolve::legacy;
use crate::store::{SpecRepository, StoreError};

/// Current schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// The SQLite production store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the store at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        // WAL keeps readers unblocked while a save transaction runs
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let mut store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (used by tests)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS models (
                id INTEGER PRIMARY KEY,
                article TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                last_code TEXT,
                last_type TEXT,
                size_min INTEGER NOT NULL,
                size_max INTEGER NOT NULL,
                created TEXT NOT NULL,
                updated TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS specifications (
                id INTEGER PRIMARY KEY,
                model_id INTEGER NOT NULL REFERENCES models(id),
                is_default INTEGER NOT NULL DEFAULT 0,
                variant_name TEXT NOT NULL DEFAULT '',
                variant_code TEXT NOT NULL DEFAULT '',
                perforation_id INTEGER,
                lining_id INTEGER,
                lasting_type_id INTEGER,
                perforation_ids TEXT,
                lining_ids TEXT,
                cutting_parts TEXT,
                hardware TEXT,
                soles TEXT,
                total_material_cost REAL NOT NULL DEFAULT 0,
                created TEXT NOT NULL,
                updated TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_specifications_model
                ON specifications(model_id);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_specifications_base
                ON specifications(model_id) WHERE is_default = 1;

            CREATE TABLE IF NOT EXISTS perforation_types (
                id INTEGER PRIMARY KEY,
                code TEXT,
                name TEXT NOT NULL,
                category TEXT,
                price REAL,
                is_active INTEGER NOT NULL DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS lining_types (
                id INTEGER PRIMARY KEY,
                code TEXT,
                name TEXT NOT NULL,
                category TEXT,
                price REAL,
                is_active INTEGER NOT NULL DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS lasting_types (
                id INTEGER PRIMARY KEY,
                code TEXT,
                name TEXT NOT NULL,
                category TEXT,
                price REAL,
                is_active INTEGER NOT NULL DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS cutting_part_templates (
                id INTEGER PRIMARY KEY,
                code TEXT,
                name TEXT NOT NULL,
                category TEXT,
                price REAL,
                is_active INTEGER NOT NULL DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS materials (
                id INTEGER PRIMARY KEY,
                code TEXT,
                name TEXT NOT NULL,
                category TEXT,
                price REAL,
                is_active INTEGER NOT NULL DEFAULT 1
            );
            "#,
        )?;

        let version: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match version {
            None => {
                self.conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
            }
            Some(v) if v < SCHEMA_VERSION => {
                // future migrations slot in here
                self.conn.execute(
                    "UPDATE schema_version SET version = ?1",
                    params![SCHEMA_VERSION],
                )?;
            }
            Some(_) => {}
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------

    /// Insert or update a model, assigning `model.id` on first save
    pub fn save_model(&mut self, model: &mut Model) -> Result<(), StoreError> {
        model.updated = Utc::now();

        let result = match model.id {
            Some(id) => self.conn.execute(
                "UPDATE models SET article = ?1, name = ?2, last_code = ?3,
                        last_type = ?4, size_min = ?5, size_max = ?6, updated = ?7
                 WHERE id = ?8",
                params![
                    model.article,
                    model.name,
                    model.last_code,
                    model.last_type,
                    model.size_min,
                    model.size_max,
                    model.updated.to_rfc3339(),
                    id
                ],
            ),
            None => self.conn.execute(
                "INSERT INTO models (article, name, last_code, last_type,
                        size_min, size_max, created, updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    model.article,
                    model.name,
                    model.last_code,
                    model.last_type,
                    model.size_min,
                    model.size_max,
                    model.created.to_rfc3339(),
                    model.updated.to_rfc3339(),
                ],
            ),
        };

        match result {
            Ok(_) => {
                if model.id.is_none() {
                    model.id = Some(self.conn.last_insert_rowid());
                }
                Ok(())
            }
            Err(err) if is_constraint_violation(&err) => {
                Err(StoreError::DuplicateArticle(model.article.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a model by id
    pub fn model(&self, id: i64) -> Result<Option<Model>, StoreError> {
        let model = self
            .conn
            .query_row(
                "SELECT id, article, name, last_code, last_type, size_min,
                        size_max, created, updated
                 FROM models WHERE id = ?1",
                params![id],
                model_from_row,
            )
            .optional()?;
        Ok(model)
    }

    /// Fetch a model by its unique article
    pub fn model_by_article(&self, article: &str) -> Result<Option<Model>, StoreError> {
        let model = self
            .conn
            .query_row(
                "SELECT id, article, name, last_code, last_type, size_min,
                        size_max, created, updated
                 FROM models WHERE article = ?1",
                params![article],
                model_from_row,
            )
            .optional()?;
        Ok(model)
    }

    /// All models, ordered by article
    pub fn list_models(&self) -> Result<Vec<Model>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, article, name, last_code, last_type, size_min,
                    size_max, created, updated
             FROM models ORDER BY article",
        )?;
        let models = stmt
            .query_map([], model_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(models)
    }

    /// Resolve a model reference given as an id or an article
    pub fn resolve_model(&self, reference: &str) -> Result<Option<Model>, StoreError> {
        if let Ok(id) = reference.parse::<i64>() {
            if let Some(model) = self.model(id)? {
                return Ok(Some(model));
            }
        }
        self.model_by_article(reference)
    }

    // ------------------------------------------------------------------
    // Specifications
    // ------------------------------------------------------------------

    /// All specifications, optionally narrowed to one model, base
    /// records first
    pub fn list_specifications(
        &self,
        model_id: Option<i64>,
    ) -> Result<Vec<Specification>, StoreError> {
        let sql = "SELECT id, model_id, is_default, variant_name, variant_code,
                          perforation_id, lining_id, lasting_type_id,
                          perforation_ids, lining_ids, cutting_parts, hardware,
                          soles, total_material_cost, created, updated
                   FROM specifications";
        let specs = match model_id {
            Some(id) => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{sql} WHERE model_id = ?1 ORDER BY is_default DESC, id"))?;
                let rows = stmt
                    .query_map(params![id], spec_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{sql} ORDER BY model_id, is_default DESC, id"))?;
                let rows = stmt
                    .query_map([], spec_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(specs)
    }

    /// Delete a specification. Deleting a base record is rejected while
    /// the model still owns variant rows.
    pub fn delete_specification(&mut self, spec_id: i64) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        let row: Option<(i64, bool)> = tx
            .query_row(
                "SELECT model_id, is_default FROM specifications WHERE id = ?1",
                params![spec_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (model_id, is_default) = match row {
            Some(found) => found,
            None => return Err(StoreError::SpecificationNotFound(spec_id)),
        };

        if is_default {
            let variant_count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM specifications
                 WHERE model_id = ?1 AND is_default = 0",
                params![model_id],
                |row| row.get(0),
            )?;
            if variant_count > 0 {
                return Err(StoreError::BaseInUse {
                    model_id,
                    variant_count,
                });
            }
        }

        tx.execute("DELETE FROM specifications WHERE id = ?1", params![spec_id])?;
        tx.commit()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Catalog maintenance
    // ------------------------------------------------------------------

    /// Insert a catalog record, assigning its id
    pub fn add_catalog_record(
        &mut self,
        kind: CatalogKind,
        record: &mut CatalogRecord,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (code, name, category, price, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                catalog_table(kind)
            ),
            params![
                record.code,
                record.name,
                record.category,
                record.price,
                record.is_active
            ],
        )?;
        record.id = Some(self.conn.last_insert_rowid());
        Ok(())
    }

    /// All records of a kind, active and inactive
    pub fn list_catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, code, name, category, price, is_active
             FROM {} ORDER BY id",
            catalog_table(kind)
        ))?;
        let records = stmt
            .query_map([], catalog_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Mark a catalog record inactive (records are never deleted, so
    /// historical specifications keep resolving)
    pub fn deactivate_catalog_record(
        &mut self,
        kind: CatalogKind,
        id: i64,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            &format!("UPDATE {} SET is_active = 0 WHERE id = ?1", catalog_table(kind)),
            params![id],
        )?;
        Ok(())
    }

    /// Update a material's unit price, inserting the material when the
    /// name is new. Returns the material id.
    pub fn upsert_material_price(
        &mut self,
        name: &str,
        category: Option<&str>,
        price: f64,
    ) -> Result<i64, StoreError> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM materials WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                self.conn.execute(
                    "UPDATE materials SET price = ?1 WHERE id = ?2",
                    params![price, id],
                )?;
                Ok(id)
            }
            None => {
                let mut record = CatalogRecord::new(name).with_price(price);
                record.category = category.map(str::to_string);
                self.add_catalog_record(CatalogKind::Material, &mut record)?;
                Ok(record.id.unwrap_or_default())
            }
        }
    }
}

impl SpecRepository for SqliteStore {
    fn base_specification(&self, model_id: i64) -> Result<Option<Specification>, StoreError> {
        let spec = self
            .conn
            .query_row(
                "SELECT id, model_id, is_default, variant_name, variant_code,
                        perforation_id, lining_id, lasting_type_id,
                        perforation_ids, lining_ids, cutting_parts, hardware,
                        soles, total_material_cost, created, updated
                 FROM specifications
                 WHERE model_id = ?1 AND is_default = 1",
                params![model_id],
                spec_from_row,
            )
            .optional()?;
        Ok(spec)
    }

    fn specification(&self, spec_id: i64) -> Result<Option<Specification>, StoreError> {
        let spec = self
            .conn
            .query_row(
                "SELECT id, model_id, is_default, variant_name, variant_code,
                        perforation_id, lining_id, lasting_type_id,
                        perforation_ids, lining_ids, cutting_parts, hardware,
                        soles, total_material_cost, created, updated
                 FROM specifications WHERE id = ?1",
                params![spec_id],
                spec_from_row,
            )
            .optional()?;
        Ok(spec)
    }

    fn save_specification(&mut self, spec: &mut Specification) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        if spec.is_default {
            // a model carries at most one base specification
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM specifications
                     WHERE model_id = ?1 AND is_default = 1",
                    params![spec.model_id],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(existing_id) = existing {
                if spec.id != Some(existing_id) {
                    return Err(StoreError::BaseAlreadyExists(spec.model_id));
                }
            }
        }

        spec.updated = Utc::now();

        let perforation_ids = encode_id_list(&spec.perforation_ids)?;
        let lining_ids = encode_id_list(&spec.lining_ids)?;
        let cutting_parts = serde_json::to_string(&spec.cutting_parts)?;
        let hardware = serde_json::to_string(&spec.hardware)?;
        let soles = serde_json::to_string(&spec.soles)?;

        match spec.id {
            Some(id) => {
                let updated = tx.execute(
                    "UPDATE specifications SET model_id = ?1, is_default = ?2,
                            variant_name = ?3, variant_code = ?4,
                            perforation_id = ?5, lining_id = ?6,
                            lasting_type_id = ?7, perforation_ids = ?8,
                            lining_ids = ?9, cutting_parts = ?10,
                            hardware = ?11, soles = ?12,
                            total_material_cost = ?13, updated = ?14
                     WHERE id = ?15",
                    params![
                        spec.model_id,
                        spec.is_default,
                        spec.variant_name,
                        spec.variant_code,
                        spec.perforation_id,
                        spec.lining_id,
                        spec.lasting_type_id,
                        perforation_ids,
                        lining_ids,
                        cutting_parts,
                        hardware,
                        soles,
                        spec.total_material_cost,
                        spec.updated.to_rfc3339(),
                        id
                    ],
                )?;
                if updated == 0 {
                    return Err(StoreError::SpecificationNotFound(id));
                }
            }
            None => {
                tx.execute(
                    "INSERT INTO specifications (model_id, is_default,
                            variant_name, variant_code, perforation_id,
                            lining_id, lasting_type_id, perforation_ids,
                            lining_ids, cutting_parts, hardware, soles,
                            total_material_cost, created, updated)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                             ?12, ?13, ?14, ?15)",
                    params![
                        spec.model_id,
                        spec.is_default,
                        spec.variant_name,
                        spec.variant_code,
                        spec.perforation_id,
                        spec.lining_id,
                        spec.lasting_type_id,
                        perforation_ids,
                        lining_ids,
                        cutting_parts,
                        hardware,
                        soles,
                        spec.total_material_cost,
                        spec.created.to_rfc3339(),
                        spec.updated.to_rfc3339(),
                    ],
                )?;
                spec.id = Some(tx.last_insert_rowid());
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn list_active_catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, code, name, category, price, is_active
             FROM {} WHERE is_active = 1 ORDER BY id",
            catalog_table(kind)
        ))?;
        let records = stmt
            .query_map([], catalog_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn material_price(&self, material_id: i64) -> Result<Option<f64>, StoreError> {
        let price: Option<Option<f64>> = self
            .conn
            .query_row(
                "SELECT price FROM materials WHERE id = ?1 AND is_active = 1",
                params![material_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(price.flatten())
    }
}

fn catalog_table(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Perforation => "perforation_types",
        CatalogKind::Lining => "lining_types",
        CatalogKind::Lasting => "lasting_types",
        CatalogKind::PartTemplate => "cutting_part_templates",
        CatalogKind::Material => "materials",
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn model_from_row(row: &Row<'_>) -> rusqlite::Result<Model> {
    Ok(Model {
        id: Some(row.get(0)?),
        article: row.get(1)?,
        name: row.get(2)?,
        last_code: row.get(3)?,
        last_type: row.get(4)?,
        size_min: row.get(5)?,
        size_max: row.get(6)?,
        created: parse_timestamp(row.get(7)?),
        updated: parse_timestamp(row.get(8)?),
    })
}

fn spec_from_row(row: &Row<'_>) -> rusqlite::Result<Specification> {
    let id: i64 = row.get(0)?;
    let is_default: bool = row.get(2)?;

    let scalar_perforation: Option<i64> = row.get(5)?;
    let scalar_lining: Option<i64> = row.get(6)?;
    let raw_perforation_ids: Option<String> = row.get(8)?;
    let raw_lining_ids: Option<String> = row.get(9)?;

    // Base rows fold the legacy scalar column into the canonical list;
    // on variant rows the scalar is the chosen value, not a list entry.
    let (perforation_id, perforation_ids) = if is_default {
        (
            None,
            legacy::normalize_raw(scalar_perforation, raw_perforation_ids.as_deref()),
        )
    } else {
        (
            scalar_perforation,
            legacy::normalize_raw(None, raw_perforation_ids.as_deref()),
        )
    };
    let (lining_id, lining_ids) = if is_default {
        (None, legacy::normalize_raw(scalar_lining, raw_lining_ids.as_deref()))
    } else {
        (scalar_lining, legacy::normalize_raw(None, raw_lining_ids.as_deref()))
    };

    Ok(Specification {
        id: Some(id),
        model_id: row.get(1)?,
        is_default,
        variant_name: row.get(3)?,
        variant_code: row.get(4)?,
        perforation_id,
        lining_id,
        lasting_type_id: row.get(7)?,
        perforation_ids,
        lining_ids,
        cutting_parts: decode_list(row.get::<_, Option<String>>(10)?, "cutting_parts", id),
        hardware: decode_list(row.get::<_, Option<String>>(11)?, "hardware", id),
        soles: decode_list(row.get::<_, Option<String>>(12)?, "soles", id),
        total_material_cost: row.get(13)?,
        created: parse_timestamp(row.get(14)?),
        updated: parse_timestamp(row.get(15)?),
    })
}

fn catalog_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogRecord> {
    Ok(CatalogRecord {
        id: Some(row.get(0)?),
        code: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        price: row.get(4)?,
        is_active: row.get(5)?,
    })
}

/// Decode a JSON list column, substituting an empty list (and logging)
/// on malformed payloads.
fn decode_list<T: DeserializeOwned>(raw: Option<String>, column: &str, spec_id: i64) -> Vec<T> {
    let text = match raw {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Vec::new(),
    };

    match serde_json::from_str(&text) {
        Ok(items) => items,
        Err(err) => {
            warn!(column, spec_id, %err, "malformed JSON column, substituting empty list");
            Vec::new()
        }
    }
}

/// Encode an id list column: JSON array, or NULL when empty
fn encode_id_list(ids: &[i64]) -> Result<Option<String>, StoreError> {
    if ids.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(ids)?))
    }
}

fn parse_timestamp(raw: Option<String>) -> DateTime<Utc> {
    match raw
        .as_deref()
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
    {
        Some(dt) => dt.with_timezone(&Utc),
        None => {
            if let Some(text) = raw {
                warn!(%text, "unreadable timestamp column, substituting now");
            }
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CuttingPartEntry, HardwareEntry, HardwareUnit, SoleEntry};

    fn store_with_model() -> (SqliteStore, i64) {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut model = Model::new("A-1027", "Oxford Classic");
        store.save_model(&mut model).unwrap();
        (store, model.id.unwrap())
    }

    fn full_variant(model_id: i64) -> Specification {
        let mut spec = Specification::new_variant(model_id, "Brogue Tan", "A-1027/BT");
        spec.perforation_id = Some(2);
        spec.lining_id = Some(5);
        spec.lasting_type_id = Some(1);
        spec.cutting_parts = vec![CuttingPartEntry {
            name: "Vamp".to_string(),
            quantity: 2,
            consumption: 4.2,
            material: Some("Calf leather brown".to_string()),
            notes: "grain along the foot".to_string(),
        }];
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
        spec.total_material_cost = 504.0;
        spec
    }

    #[test]
    fn test_model_save_assigns_id_and_reloads() {
        let (store, model_id) = store_with_model();
        let loaded = store.model(model_id).unwrap().unwrap();
        assert_eq!(loaded.article, "A-1027");
        assert_eq!(loaded.name, "Oxford Classic");
    }

    #[test]
    fn test_duplicate_article_is_rejected() {
        let (mut store, _) = store_with_model();
        let mut clash = Model::new("A-1027", "Copycat");
        let err = store.save_model(&mut clash).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateArticle(a) if a == "A-1027"));
    }

    #[test]
    fn test_resolve_model_by_id_or_article() {
        let (store, model_id) = store_with_model();
        assert!(store
            .resolve_model(&model_id.to_string())
            .unwrap()
            .is_some());
        assert!(store.resolve_model("A-1027").unwrap().is_some());
        assert!(store.resolve_model("Z-9999").unwrap().is_none());
    }

    #[test]
    fn test_specification_roundtrip_preserves_json_columns() {
        let (mut store, model_id) = store_with_model();
        let mut spec = full_variant(model_id);
        store.save_specification(&mut spec).unwrap();

        let reloaded = store.specification(spec.id.unwrap()).unwrap().unwrap();
        assert_eq!(reloaded.cutting_parts, spec.cutting_parts);
        assert_eq!(reloaded.hardware, spec.hardware);
        assert_eq!(reloaded.soles, spec.soles);
        assert_eq!(reloaded.variant_name, "Brogue Tan");
        assert_eq!(reloaded.perforation_id, Some(2));
        assert_eq!(reloaded.total_material_cost, 504.0);
    }

    #[test]
    fn test_at_most_one_base_per_model() {
        let (mut store, model_id) = store_with_model();
        let mut base = Specification::new_base(model_id);
        store.save_specification(&mut base).unwrap();

        let mut second = Specification::new_base(model_id);
        let err = store.save_specification(&mut second).unwrap_err();
        assert!(matches!(err, StoreError::BaseAlreadyExists(id) if id == model_id));

        // updating the existing base is fine
        base.lasting_type_id = Some(3);
        store.save_specification(&mut base).unwrap();
    }

    #[test]
    fn test_base_delete_rejected_while_variants_exist() {
        let (mut store, model_id) = store_with_model();
        let mut base = Specification::new_base(model_id);
        store.save_specification(&mut base).unwrap();
        let mut variant = full_variant(model_id);
        store.save_specification(&mut variant).unwrap();

        let err = store.delete_specification(base.id.unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::BaseInUse { variant_count: 1, .. }));

        store.delete_specification(variant.id.unwrap()).unwrap();
        store.delete_specification(base.id.unwrap()).unwrap();
    }

    #[test]
    fn test_legacy_scalar_base_row_normalizes_to_list() {
        let (store, model_id) = store_with_model();
        // A base row from the scalar-column era: no array columns at all
        store
            .conn
            .execute(
                "INSERT INTO specifications (model_id, is_default,
                        perforation_id, lining_id, created, updated)
                 VALUES (?1, 1, 4, 9, '2020-03-01T00:00:00+00:00',
                         '2020-03-01T00:00:00+00:00')",
                params![model_id],
            )
            .unwrap();

        let base = store.base_specification(model_id).unwrap().unwrap();
        assert_eq!(base.perforation_ids, vec![4]);
        assert_eq!(base.lining_ids, vec![9]);
        // the scalar does not leak into the in-memory base record
        assert!(base.perforation_id.is_none());
        assert!(base.lining_id.is_none());
    }

    #[test]
    fn test_legacy_double_encoded_array_column() {
        let (store, model_id) = store_with_model();
        store
            .conn
            .execute(
                "INSERT INTO specifications (model_id, is_default,
                        perforation_ids, created, updated)
                 VALUES (?1, 1, '\"[1, 2, 3]\"', '2020-03-01T00:00:00+00:00',
                         '2020-03-01T00:00:00+00:00')",
                params![model_id],
            )
            .unwrap();

        let base = store.base_specification(model_id).unwrap().unwrap();
        assert_eq!(base.perforation_ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_malformed_json_column_degrades_to_empty() {
        let (store, model_id) = store_with_model();
        store
            .conn
            .execute(
                "INSERT INTO specifications (model_id, is_default,
                        cutting_parts, hardware, created, updated)
                 VALUES (?1, 1, '{not json', '[{\"name\": broken]',
                         '2020-03-01T00:00:00+00:00',
                         '2020-03-01T00:00:00+00:00')",
                params![model_id],
            )
            .unwrap();

        // never a hard failure
        let base = store.base_specification(model_id).unwrap().unwrap();
        assert!(base.cutting_parts.is_empty());
        assert!(base.hardware.is_empty());
    }

    #[test]
    fn test_catalog_add_list_deactivate() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut record = CatalogRecord::new("Full brogue").with_code("PF-01");
        store
            .add_catalog_record(CatalogKind::Perforation, &mut record)
            .unwrap();
        let id = record.id.unwrap();

        assert_eq!(store.list_active_catalog(CatalogKind::Perforation).unwrap().len(), 1);

        store
            .deactivate_catalog_record(CatalogKind::Perforation, id)
            .unwrap();
        assert!(store
            .list_active_catalog(CatalogKind::Perforation)
            .unwrap()
            .is_empty());
        // still visible to the maintenance listing
        assert_eq!(store.list_catalog(CatalogKind::Perforation).unwrap().len(), 1);
    }

    #[test]
    fn test_material_price_lookup() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut priced = CatalogRecord::new("Calf leather brown").with_price(120.0);
        store
            .add_catalog_record(CatalogKind::Material, &mut priced)
            .unwrap();
        let mut unpriced = CatalogRecord::new("Pig lining beige");
        store
            .add_catalog_record(CatalogKind::Material, &mut unpriced)
            .unwrap();

        assert_eq!(store.material_price(priced.id.unwrap()).unwrap(), Some(120.0));
        assert_eq!(store.material_price(unpriced.id.unwrap()).unwrap(), None);
        assert_eq!(store.material_price(999).unwrap(), None);
    }

    #[test]
    fn test_upsert_material_price() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = store
            .upsert_material_price("Calf leather brown", Some("leather"), 110.0)
            .unwrap();
        let same = store
            .upsert_material_price("Calf leather brown", Some("leather"), 125.0)
            .unwrap();
        assert_eq!(id, same);
        assert_eq!(store.material_price(id).unwrap(), Some(125.0));
    }

    #[test]
    fn test_list_specifications_base_first() {
        let (mut store, model_id) = store_with_model();
        let mut variant = full_variant(model_id);
        store.save_specification(&mut variant).unwrap();
        let mut base = Specification::new_base(model_id);
        store.save_specification(&mut base).unwrap();

        let specs = store.list_specifications(Some(model_id)).unwrap();
        assert_eq!(specs.len(), 2);
        assert!(specs[0].is_base());
    }
}
