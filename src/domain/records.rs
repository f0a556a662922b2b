// src/domain/records.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One building structure entry of a valuation run.
///
/// Numeric fields keep whatever the store handed us; the assembler coerces
/// them permissively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralDescriptionRecord {
    pub building_code: Option<String>,
    pub storey_count: Value,
    pub depreciation_rate: Value,
    pub construction_percent: Value,
    pub area: Value,
    pub value_info_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingCodeRecord {
    pub building_code: String,
    pub description: Option<String>,
    pub unit_rate: Value,
}

/// An "additional item": an auxiliary component valued apart from the
/// main structure. `adjusted_value` is its market value as supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentRecord {
    pub subcomponent_id: Option<String>,
    pub area: Value,
    pub unit_rate: Value,
    pub completion_percent: Option<String>,
    pub depreciation_percent: Option<String>,
    pub base_value: Value,
    pub adjusted_value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentSummaryRecord {
    pub base_market_value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentLevel {
    pub actual_use: Option<String>,
    pub rate_percent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcomponent {
    pub description: String,
    pub component_id: String,
}

/// Description lookups for additional items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentLookups {
    pub components: HashMap<String, String>,
    pub subcomponents: HashMap<String, Subcomponent>,
}

impl ComponentLookups {
    /// Resolves `(component, subcomponent)` descriptions for a subcomponent id.
    pub fn describe(&self, subcomponent_id: Option<&str>) -> (String, String) {
        let sub = subcomponent_id.and_then(|id| self.subcomponents.get(id));

        let component = sub
            .and_then(|s| self.components.get(&s.component_id))
            .cloned()
            .unwrap_or_else(|| "Additional Component".to_string());
        let subcomponent = sub
            .map(|s| s.description.clone())
            .unwrap_or_else(|| "Additional Item".to_string());

        (component, subcomponent)
    }
}

/// Ordered key/value pairs as shown in the Form Details and
/// General Information sections.
pub type KeyValues = Vec<(String, Value)>;

/// Everything the assembler needs for one FAAS form.
#[derive(Debug, Clone, Default)]
pub struct FaasInputs {
    pub form_id: Option<String>,
    pub form_metadata: KeyValues,
    pub general_information: KeyValues,
    pub general_descriptions: Vec<GeneralDescriptionRecord>,
    pub building_codes: Vec<BuildingCodeRecord>,
    pub adjustments: Vec<AdjustmentRecord>,
    pub assessment_summary: Vec<AssessmentSummaryRecord>,
    pub assessment_level: Option<AssessmentLevel>,
    pub lookups: ComponentLookups,
    /// Restricts general descriptions to one valuation run.
    pub value_info_id: Option<String>,
    /// Form-level floor area used when a record carries none.
    pub form_area: Option<f64>,
    /// Base market value used when no assessment summary exists.
    pub fallback_base_market_value: Option<f64>,
}
