// src/db/faas.rs

use crate::db::connection::Database;
use crate::domain::numeric::parse_numeric;
use crate::domain::records::{
    AdjustmentRecord, AssessmentLevel, AssessmentSummaryRecord, BuildingCodeRecord,
    ComponentLookups, FaasInputs, GeneralDescriptionRecord, KeyValues, Subcomponent,
};
use crate::errors::ServerError;
use rusqlite::types::ValueRef;
use rusqlite::{params, Params, Row};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;

const SQL_LIST_FORMS: &str = "
    SELECT CAST(form_id AS TEXT) AS form_id, arp_number, owner_name, updated_at
    FROM building_faas
    ORDER BY form_id";

const SQL_FORM_METADATA: &str = "SELECT * FROM building_faas WHERE form_id = ?1";

const SQL_VALUE_INFO: &str = "SELECT * FROM building_value_info WHERE id = ?1";

const SQL_GENERAL_DESCRIPTIONS: &str = "
    SELECT CAST(gd.building_code AS TEXT) AS building_code,
           gd.storey_count,
           gd.depreciation_rate,
           gd.construction_percent,
           gd.area,
           CAST(gd.value_info_id AS TEXT) AS value_info_id
    FROM general_descriptions gd
    JOIN building_value_info vi ON vi.id = gd.value_info_id
    WHERE vi.form_id = ?1
    ORDER BY gd.id";

const SQL_BUILDING_CODES: &str = "
    SELECT CAST(building_code AS TEXT) AS building_code, description, unit_rate
    FROM building_codes";

const SQL_ADJUSTMENTS: &str = "
    SELECT CAST(subcomponent_id AS TEXT) AS subcomponent_id,
           area,
           unit_rate,
           CAST(completion_percent AS TEXT) AS completion_percent,
           CAST(depreciation_percent AS TEXT) AS depreciation_percent,
           base_value,
           adjusted_value
    FROM additional_items
    WHERE form_id = ?1
    ORDER BY id";

const SQL_ASSESSMENT_SUMMARY: &str = "
    SELECT base_market_value FROM assessment_summary WHERE form_id = ?1 ORDER BY id";

const SQL_ASSESSMENT_LEVEL: &str = "
    SELECT actual_use, CAST(rate_percent AS TEXT) AS rate_percent
    FROM assessment_levels
    WHERE form_id = ?1
    ORDER BY id
    LIMIT 1";

const SQL_COMPONENTS: &str = "SELECT CAST(id AS TEXT), description FROM components";

const SQL_SUBCOMPONENTS: &str = "
    SELECT CAST(id AS TEXT) AS id, description, CAST(component_id AS TEXT) AS component_id
    FROM subcomponents";

/// Row of the forms index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSummary {
    pub form_id: String,
    pub arp_number: Option<String>,
    pub owner_name: Option<String>,
    pub updated_at: Option<String>,
}

/// Read access to everything a FAAS report needs.
///
/// Handlers receive an implementation instead of reaching for a global
/// client, so the report pipeline can be driven from any store.
pub trait FaasRepository {
    fn list_forms(&self) -> Result<Vec<FormSummary>, ServerError>;

    /// Column/value pairs of the form row, in column order. `None` when the
    /// form does not exist.
    fn form_metadata(&self, form_id: &str) -> Result<Option<KeyValues>, ServerError>;

    /// Column/value pairs of one valuation run. Empty when unknown.
    fn general_information(&self, value_info_id: &str) -> Result<KeyValues, ServerError>;

    /// Structures of every valuation run belonging to the form.
    fn general_descriptions(
        &self,
        form_id: &str,
    ) -> Result<Vec<GeneralDescriptionRecord>, ServerError>;

    fn building_codes(&self) -> Result<Vec<BuildingCodeRecord>, ServerError>;

    fn adjustments(&self, form_id: &str) -> Result<Vec<AdjustmentRecord>, ServerError>;

    fn assessment_summary(
        &self,
        form_id: &str,
    ) -> Result<Vec<AssessmentSummaryRecord>, ServerError>;

    fn assessment_level(&self, form_id: &str) -> Result<Option<AssessmentLevel>, ServerError>;

    fn component_lookups(&self) -> Result<ComponentLookups, ServerError>;

    /// Gathers all inputs of one form.
    fn load_inputs(&self, form_id: &str) -> Result<FaasInputs, ServerError> {
        let form_metadata = self.form_metadata(form_id)?.ok_or(ServerError::NotFound)?;

        let value_info_id = lookup(&form_metadata, "value_info_id").and_then(value_text);
        let form_area = lookup(&form_metadata, "total_floor_area").and_then(value_number);
        let fallback_base_market_value =
            lookup(&form_metadata, "base_market_value").and_then(value_number);

        let general_information = match value_info_id.as_deref() {
            Some(id) => self.general_information(id)?,
            None => KeyValues::new(),
        };

        let inputs = FaasInputs {
            form_id: Some(form_id.to_string()),
            general_information,
            general_descriptions: self.general_descriptions(form_id)?,
            building_codes: self.building_codes()?,
            adjustments: self.adjustments(form_id)?,
            assessment_summary: self.assessment_summary(form_id)?,
            assessment_level: self.assessment_level(form_id)?,
            lookups: self.component_lookups()?,
            form_metadata,
            value_info_id,
            form_area,
            fallback_base_market_value,
        };

        debug!(
            form_id,
            descriptions = inputs.general_descriptions.len(),
            adjustments = inputs.adjustments.len(),
            "faas inputs loaded"
        );
        Ok(inputs)
    }
}

fn lookup<'a>(pairs: &'a KeyValues, key: &str) -> Option<&'a Value> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_number(value: &Value) -> Option<f64> {
    Some(parse_numeric(value, f64::NAN)).filter(|n| n.is_finite())
}

/// SQLite's dynamic value as JSON, so permissive coercion happens later.
fn sqlite_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn row_pairs(row: &Row<'_>, names: &[String]) -> rusqlite::Result<KeyValues> {
    let mut pairs = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        pairs.push((name.clone(), sqlite_to_json(row.get_ref(i)?)));
    }
    Ok(pairs)
}

pub struct SqliteFaasRepository {
    db: Database,
}

impl SqliteFaasRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn query_pairs<P: Params>(&self, sql: &str, params: P) -> Result<Vec<KeyValues>, ServerError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let names: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();

            let rows = stmt.query_map(params, |row| row_pairs(row, &names))?;

            let mut out = Vec::new();
            for r in rows {
                out.push(r?);
            }
            Ok(out)
        })
    }

    fn query_records<T, P>(&self, sql: &str, params: P) -> Result<Vec<T>, ServerError>
    where
        T: DeserializeOwned,
        P: Params,
    {
        self.query_pairs(sql, params)?
            .into_iter()
            .map(|pairs| {
                let object: Map<String, Value> = pairs.into_iter().collect();
                serde_json::from_value(Value::Object(object))
                    .map_err(|e| ServerError::DbError(format!("Malformed row: {e}")))
            })
            .collect()
    }
}

impl FaasRepository for SqliteFaasRepository {
    fn list_forms(&self) -> Result<Vec<FormSummary>, ServerError> {
        self.query_records(SQL_LIST_FORMS, [])
    }

    fn form_metadata(&self, form_id: &str) -> Result<Option<KeyValues>, ServerError> {
        Ok(self
            .query_pairs(SQL_FORM_METADATA, params![form_id])?
            .into_iter()
            .next())
    }

    fn general_information(&self, value_info_id: &str) -> Result<KeyValues, ServerError> {
        Ok(self
            .query_pairs(SQL_VALUE_INFO, params![value_info_id])?
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    fn general_descriptions(
        &self,
        form_id: &str,
    ) -> Result<Vec<GeneralDescriptionRecord>, ServerError> {
        self.query_records(SQL_GENERAL_DESCRIPTIONS, params![form_id])
    }

    fn building_codes(&self) -> Result<Vec<BuildingCodeRecord>, ServerError> {
        self.query_records(SQL_BUILDING_CODES, [])
    }

    fn adjustments(&self, form_id: &str) -> Result<Vec<AdjustmentRecord>, ServerError> {
        self.query_records(SQL_ADJUSTMENTS, params![form_id])
    }

    fn assessment_summary(
        &self,
        form_id: &str,
    ) -> Result<Vec<AssessmentSummaryRecord>, ServerError> {
        self.query_records(SQL_ASSESSMENT_SUMMARY, params![form_id])
    }

    fn assessment_level(&self, form_id: &str) -> Result<Option<AssessmentLevel>, ServerError> {
        Ok(self
            .query_records(SQL_ASSESSMENT_LEVEL, params![form_id])?
            .into_iter()
            .next())
    }

    fn component_lookups(&self) -> Result<ComponentLookups, ServerError> {
        let mut lookups = ComponentLookups::default();

        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(SQL_COMPONENTS)?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?, // id
                    row.get::<_, Option<String>>(1)?, // description
                ))
            })?;
            for r in rows {
                if let (Some(id), Some(description)) = r? {
                    lookups.components.insert(id, description);
                }
            }
            Ok(())
        })?;

        #[derive(Deserialize)]
        struct SubcomponentRow {
            id: Option<String>,
            description: Option<String>,
            component_id: Option<String>,
        }

        let subs: Vec<SubcomponentRow> = self.query_records(SQL_SUBCOMPONENTS, [])?;
        for sub in subs {
            if let Some(id) = sub.id {
                lookups.subcomponents.insert(
                    id,
                    Subcomponent {
                        description: sub.description.unwrap_or_default(),
                        component_id: sub.component_id.unwrap_or_default(),
                    },
                );
            }
        }

        Ok(lookups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::apply_sql;
    use crate::domain::{assemble, compute, BaseValuePolicy};
    use serde_json::json;
    use tempfile::TempDir;

    fn seeded_repo() -> (SqliteFaasRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("faas.sqlite"));
        apply_sql(&db, include_str!("../../sql/schema.sql")).unwrap();
        apply_sql(&db, include_str!("../../sql/seed.sql")).unwrap();
        (SqliteFaasRepository::new(db), temp_dir)
    }

    #[test]
    fn lists_seeded_forms_in_order() {
        let (repo, _temp_dir) = seeded_repo();
        let forms = repo.list_forms().unwrap();

        let ids: Vec<_> = forms.iter().map(|f| f.form_id.as_str()).collect();
        assert_eq!(ids, ["FAAS-2024-001", "FAAS-2024-002"]);
        assert_eq!(forms[0].owner_name.as_deref(), Some("Maria Santos"));
    }

    #[test]
    fn metadata_keeps_column_order() {
        let (repo, _temp_dir) = seeded_repo();
        let meta = repo.form_metadata("FAAS-2024-001").unwrap().unwrap();

        assert_eq!(meta[0], ("form_id".to_string(), json!("FAAS-2024-001")));
        assert_eq!(meta[1].0, "arp_number");
        assert!(repo.form_metadata("nope").unwrap().is_none());
    }

    #[test]
    fn load_inputs_reads_every_source() {
        let (repo, _temp_dir) = seeded_repo();
        let inputs = repo.load_inputs("FAAS-2024-001").unwrap();

        assert_eq!(inputs.form_id.as_deref(), Some("FAAS-2024-001"));
        assert_eq!(inputs.value_info_id.as_deref(), Some("VI-001-B"));
        assert_eq!(inputs.form_area, Some(120.0));
        assert_eq!(inputs.fallback_base_market_value, Some(2_400_000.0));

        // Both runs come back; the assembler narrows them down.
        assert_eq!(inputs.general_descriptions.len(), 2);
        assert!(inputs
            .general_information
            .iter()
            .any(|(k, v)| k == "kind_of_building" && *v == json!("Residential")));

        assert_eq!(inputs.adjustments.len(), 3);
        assert_eq!(
            inputs.adjustments[1].completion_percent.as_deref(),
            Some("100%")
        );
        assert_eq!(inputs.assessment_summary.len(), 1);
        assert_eq!(
            inputs.assessment_level.as_ref().and_then(|l| l.rate_percent.as_deref()),
            Some("20%")
        );
        assert_eq!(inputs.lookups.components.len(), 2);
        assert_eq!(inputs.lookups.subcomponents.len(), 3);
        assert_eq!(inputs.building_codes.len(), 3);
    }

    #[test]
    fn text_numbers_stay_raw_until_coerced() {
        let (repo, _temp_dir) = seeded_repo();
        let inputs = repo.load_inputs("FAAS-2024-002").unwrap();

        assert_eq!(inputs.form_area, Some(36.0));
        assert_eq!(inputs.fallback_base_market_value, None);
        assert_eq!(inputs.general_descriptions[0].area, json!("36 sqm"));
        assert_eq!(inputs.general_descriptions[0].storey_count, json!("1"));
        assert!(inputs.adjustments.is_empty());
    }

    #[test]
    fn unknown_form_is_not_found() {
        let (repo, _temp_dir) = seeded_repo();
        let err = repo.load_inputs("FAAS-1999-404").unwrap_err();
        assert!(matches!(err, ServerError::NotFound));
    }

    #[test]
    fn seeded_form_values_per_storey() {
        let (repo, _temp_dir) = seeded_repo();
        let inputs = repo.load_inputs("FAAS-2024-001").unwrap();
        let valuation = compute(&assemble(&inputs), BaseValuePolicy::PerRecord);

        // Only the current run (two storeys) is valued.
        assert_eq!(valuation.storeys.len(), 2);
        let first = &valuation.storeys[0];
        assert_eq!(first.description, "Residential Type II-A - 1st Floor");
        assert_eq!(first.area, 60.0);
        assert_eq!(first.base_value, 1_200_000.0);
        assert_eq!(first.depreciation_cost, 168_000.0);
        assert_eq!(first.market_value, 1_032_000.0);

        assert_eq!(valuation.adjustments[2].component, "Additional Component");
        assert_eq!(valuation.adjustments[2].subcomponent, "Additional Item");
    }
}
