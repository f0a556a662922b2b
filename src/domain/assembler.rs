// src/domain/assembler.rs

use crate::domain::numeric::{parse_numeric, parse_numeric_str, parse_rate};
use crate::domain::records::{
    AdjustmentRecord, BuildingCodeRecord, FaasInputs, GeneralDescriptionRecord,
};

/// Largest storey count accepted from a record. Anything above it is treated
/// as unreadable and falls back to a single storey.
pub const MAX_STOREYS: u32 = 200;

/// A general description with every field coerced and its building code
/// resolved. One of these fans out into `storey_count` storeys.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureInput {
    pub type_code: String,
    pub description: String,
    pub unit_value: f64,
    pub storey_count: u32,
    pub area: f64,
    pub depreciation_rate: f64,
    pub construction_percent: f64,
}

/// An additional item with descriptions resolved and numbers coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentInput {
    pub component: String,
    pub subcomponent: String,
    pub area: f64,
    pub unit_rate: f64,
    pub completion_percent: f64,
    pub depreciation_percent: f64,
    pub base_value: f64,
    pub market_value: f64,
}

/// Normalized inputs for the valuation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledFaas {
    pub structures: Vec<StructureInput>,
    pub adjustments: Vec<AdjustmentInput>,
    pub total_base_market_value: f64,
    pub actual_use: Option<String>,
    /// Rate string as supplied, for display.
    pub rate_label: Option<String>,
    /// Rate as a decimal fraction.
    pub rate: f64,
}

pub fn assemble(inputs: &FaasInputs) -> AssembledFaas {
    let form_area = inputs.form_area.unwrap_or(0.0);

    let structures = inputs
        .general_descriptions
        .iter()
        .filter(|gd| match inputs.value_info_id.as_deref() {
            Some(wanted) => gd.value_info_id.as_deref() == Some(wanted),
            None => true,
        })
        .map(|gd| structure_input(gd, &inputs.building_codes, form_area))
        .collect();

    let adjustments = inputs
        .adjustments
        .iter()
        .map(|adj| adjustment_input(adj, inputs))
        .collect();

    let fallback_base = inputs.fallback_base_market_value.unwrap_or(0.0);
    let total_base_market_value = inputs
        .assessment_summary
        .first()
        .map(|summary| parse_numeric(&summary.base_market_value, fallback_base))
        .unwrap_or(fallback_base);

    let level = inputs.assessment_level.as_ref();
    let rate_label = level
        .and_then(|l| l.rate_percent.clone())
        .filter(|r| !r.trim().is_empty());

    AssembledFaas {
        structures,
        adjustments,
        total_base_market_value,
        actual_use: level.and_then(|l| l.actual_use.clone()),
        rate: parse_rate(rate_label.as_deref()),
        rate_label,
    }
}

fn structure_input(
    gd: &GeneralDescriptionRecord,
    codes: &[BuildingCodeRecord],
    form_area: f64,
) -> StructureInput {
    let type_code = gd.building_code.clone().unwrap_or_default();

    let (description, unit_value) = match codes.iter().find(|c| c.building_code == type_code) {
        Some(code) => (
            code.description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| fallback_description(&type_code)),
            parse_numeric(&code.unit_rate, 0.0),
        ),
        None => (fallback_description(&type_code), 0.0),
    };

    let storey_count = storey_count(&gd.storey_count);

    StructureInput {
        type_code,
        description,
        unit_value,
        storey_count,
        area: parse_numeric(&gd.area, form_area),
        depreciation_rate: parse_numeric(&gd.depreciation_rate, 0.0),
        construction_percent: parse_numeric(&gd.construction_percent, 100.0),
    }
}

/// Truncates fractional counts; negatives clamp to zero.
fn storey_count(raw: &serde_json::Value) -> u32 {
    let count = parse_numeric(raw, 1.0).max(0.0).floor();
    if count > f64::from(MAX_STOREYS) {
        1
    } else {
        count as u32
    }
}

fn fallback_description(code: &str) -> String {
    if code.trim().is_empty() {
        "Building Structure".to_string()
    } else {
        code.to_string()
    }
}

fn adjustment_input(adj: &AdjustmentRecord, inputs: &FaasInputs) -> AdjustmentInput {
    let (component, subcomponent) = inputs.lookups.describe(adj.subcomponent_id.as_deref());

    AdjustmentInput {
        component,
        subcomponent,
        area: parse_numeric(&adj.area, 0.0),
        unit_rate: parse_numeric(&adj.unit_rate, 0.0),
        completion_percent: percent_field(adj.completion_percent.as_deref()),
        depreciation_percent: percent_field(adj.depreciation_percent.as_deref()),
        base_value: parse_numeric(&adj.base_value, 0.0),
        market_value: parse_numeric(&adj.adjusted_value, 0.0),
    }
}

/// Percent strings on additional items default to "0".
fn percent_field(raw: Option<&str>) -> f64 {
    raw.and_then(parse_numeric_str)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Ordinal floor label: 1st, 2nd, 3rd, then "{n}th".
pub fn floor_name(storey: u32) -> String {
    match storey {
        1 => "1st Floor".to_string(),
        2 => "2nd Floor".to_string(),
        3 => "3rd Floor".to_string(),
        n => format!("{n}th Floor"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::{AssessmentLevel, AssessmentSummaryRecord};
    use serde_json::json;

    fn code(code: &str, description: &str, rate: f64) -> BuildingCodeRecord {
        BuildingCodeRecord {
            building_code: code.to_string(),
            description: Some(description.to_string()),
            unit_rate: json!(rate),
        }
    }

    fn gd(code: Option<&str>) -> GeneralDescriptionRecord {
        GeneralDescriptionRecord {
            building_code: code.map(str::to_string),
            storey_count: json!(2),
            depreciation_rate: json!("10"),
            construction_percent: json!(null),
            area: json!(100),
            value_info_id: Some("V1".to_string()),
        }
    }

    #[test]
    fn resolves_building_code() {
        let inputs = FaasInputs {
            general_descriptions: vec![gd(Some("RC-1"))],
            building_codes: vec![code("RC-1", "Reinforced Concrete", 12_500.0)],
            ..Default::default()
        };

        let assembled = assemble(&inputs);
        let s = &assembled.structures[0];
        assert_eq!(s.description, "Reinforced Concrete");
        assert_eq!(s.unit_value, 12_500.0);
        assert_eq!(s.storey_count, 2);
        assert_eq!(s.depreciation_rate, 10.0);
        assert_eq!(s.construction_percent, 100.0);
    }

    #[test]
    fn unknown_building_code_falls_back() {
        let inputs = FaasInputs {
            general_descriptions: vec![gd(Some("XYZ")), gd(Some("")), gd(None)],
            building_codes: vec![code("RC-1", "Reinforced Concrete", 1.0)],
            ..Default::default()
        };

        let assembled = assemble(&inputs);
        let descriptions: Vec<_> = assembled
            .structures
            .iter()
            .map(|s| (s.description.as_str(), s.unit_value))
            .collect();
        assert_eq!(
            descriptions,
            vec![
                ("XYZ", 0.0),
                ("Building Structure", 0.0),
                ("Building Structure", 0.0)
            ]
        );
    }

    #[test]
    fn coercion_defaults() {
        let record = GeneralDescriptionRecord {
            building_code: None,
            storey_count: json!("two"),
            depreciation_rate: json!(null),
            construction_percent: json!("abc"),
            area: json!(null),
            value_info_id: None,
        };
        let inputs = FaasInputs {
            general_descriptions: vec![record],
            form_area: Some(75.0),
            ..Default::default()
        };

        let s = &assemble(&inputs).structures[0];
        assert_eq!(s.storey_count, 1);
        assert_eq!(s.depreciation_rate, 0.0);
        assert_eq!(s.construction_percent, 100.0);
        assert_eq!(s.area, 75.0);
    }

    #[test]
    fn storey_count_truncates_and_clamps() {
        let mut half = gd(None);
        half.storey_count = json!(2.7);
        let mut negative = gd(None);
        negative.storey_count = json!(-3);

        let inputs = FaasInputs {
            general_descriptions: vec![half, negative],
            ..Default::default()
        };
        let counts: Vec<_> = assemble(&inputs)
            .structures
            .iter()
            .map(|s| s.storey_count)
            .collect();
        assert_eq!(counts, vec![2, 0]);
    }

    #[test]
    fn out_of_range_storey_count_is_one_storey() {
        let mut huge = gd(None);
        huge.storey_count = json!("3000000000");
        let mut overflowing = gd(None);
        overflowing.storey_count = json!("1e30");
        let mut at_limit = gd(None);
        at_limit.storey_count = json!(MAX_STOREYS);

        let inputs = FaasInputs {
            general_descriptions: vec![huge, overflowing, at_limit],
            ..Default::default()
        };
        let counts: Vec<_> = assemble(&inputs)
            .structures
            .iter()
            .map(|s| s.storey_count)
            .collect();
        assert_eq!(counts, vec![1, 1, MAX_STOREYS]);
    }

    #[test]
    fn filters_by_value_info_id() {
        let mut other = gd(Some("B"));
        other.value_info_id = Some("V2".to_string());

        let inputs = FaasInputs {
            general_descriptions: vec![gd(Some("A")), other],
            value_info_id: Some("V2".to_string()),
            ..Default::default()
        };

        let assembled = assemble(&inputs);
        assert_eq!(assembled.structures.len(), 1);
        assert_eq!(assembled.structures[0].type_code, "B");
    }

    #[test]
    fn summary_supersedes_fallback_base_value() {
        let mut inputs = FaasInputs {
            fallback_base_market_value: Some(1_000.0),
            ..Default::default()
        };
        assert_eq!(assemble(&inputs).total_base_market_value, 1_000.0);

        inputs.assessment_summary = vec![
            AssessmentSummaryRecord {
                base_market_value: json!("250,000"),
            },
            AssessmentSummaryRecord {
                base_market_value: json!(9),
            },
        ];
        assert_eq!(assemble(&inputs).total_base_market_value, 250_000.0);
    }

    #[test]
    fn adjustment_percent_strings_default_to_zero() {
        let inputs = FaasInputs {
            adjustments: vec![AdjustmentRecord {
                subcomponent_id: None,
                area: json!("12.5"),
                unit_rate: json!(400),
                completion_percent: None,
                depreciation_percent: Some("n/a".to_string()),
                base_value: json!(5000),
                adjusted_value: json!(4000),
            }],
            ..Default::default()
        };

        let adj = &assemble(&inputs).adjustments[0];
        assert_eq!(adj.component, "Additional Component");
        assert_eq!(adj.subcomponent, "Additional Item");
        assert_eq!(adj.area, 12.5);
        assert_eq!(adj.completion_percent, 0.0);
        assert_eq!(adj.depreciation_percent, 0.0);
        assert_eq!(adj.market_value, 4000.0);
    }

    #[test]
    fn blank_rate_is_dropped() {
        let inputs = FaasInputs {
            assessment_level: Some(AssessmentLevel {
                actual_use: Some("Residential".to_string()),
                rate_percent: Some("  ".to_string()),
            }),
            ..Default::default()
        };

        let assembled = assemble(&inputs);
        assert_eq!(assembled.rate_label, None);
        assert_eq!(assembled.rate, 0.0);
        assert_eq!(assembled.actual_use.as_deref(), Some("Residential"));
    }

    #[test]
    fn floor_names() {
        assert_eq!(floor_name(1), "1st Floor");
        assert_eq!(floor_name(2), "2nd Floor");
        assert_eq!(floor_name(3), "3rd Floor");
        assert_eq!(floor_name(4), "4th Floor");
        assert_eq!(floor_name(11), "11th Floor");
    }
}
