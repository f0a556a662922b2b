// src/domain/valuation.rs

use crate::domain::assembler::{floor_name, AdjustmentInput, AssembledFaas, StructureInput};
use crate::domain::numeric::safe_div;
use serde::Deserialize;
use std::ops::Add;

/// How the form's total base market value is attributed to each general
/// description before it is split per storey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseValuePolicy {
    /// Every record receives the whole total. With several records on one
    /// form the total is counted once per record.
    #[default]
    PerRecord,
    /// The total is split across records in proportion to storey counts, so
    /// all storeys of the form together sum to the total.
    SharedPool,
}

/// One floor of one building structure.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreyValuation {
    pub description: String,
    pub type_code: String,
    pub unit_value: f64,
    pub area: f64,
    pub base_value: f64,
    pub market_value: f64,
    pub depreciation_rate: f64,
    pub depreciation_cost: f64,
    pub completion_percent: f64,
    pub storey_number: u32,
    pub total_storeys: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentValuation {
    pub component: String,
    pub subcomponent: String,
    pub area: f64,
    pub unit_rate: f64,
    pub completion_percent: f64,
    pub depreciation_percent: f64,
    pub base_value: f64,
    /// Display only; the market value is not derived from it.
    pub depreciation_cost: f64,
    pub market_value: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportTotals {
    pub area: f64,
    pub base_value: f64,
    pub market_value: f64,
    pub depreciation_cost: f64,
}

impl Add for ReportTotals {
    type Output = ReportTotals;

    fn add(self, rhs: ReportTotals) -> ReportTotals {
        ReportTotals {
            area: self.area + rhs.area,
            base_value: self.base_value + rhs.base_value,
            market_value: self.market_value + rhs.market_value,
            depreciation_cost: self.depreciation_cost + rhs.depreciation_cost,
        }
    }
}

impl ReportTotals {
    fn of_storeys(storeys: &[StoreyValuation]) -> Self {
        storeys.iter().fold(Self::default(), |acc, s| {
            acc + ReportTotals {
                area: s.area,
                base_value: s.base_value,
                market_value: s.market_value,
                depreciation_cost: s.depreciation_cost,
            }
        })
    }

    fn of_adjustments(items: &[AdjustmentValuation]) -> Self {
        items.iter().fold(Self::default(), |acc, a| {
            acc + ReportTotals {
                area: a.area,
                base_value: a.base_value,
                market_value: a.market_value,
                depreciation_cost: a.depreciation_cost,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub actual_use: Option<String>,
    pub market_value: f64,
    pub rate_label: Option<String>,
    pub rate: f64,
    pub assessed_value: f64,
}

/// Full engine output for one form.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub storeys: Vec<StoreyValuation>,
    pub adjustments: Vec<AdjustmentValuation>,
    pub main_totals: ReportTotals,
    pub item_totals: ReportTotals,
    pub combined: ReportTotals,
    pub assessment: Assessment,
}

pub fn compute(assembled: &AssembledFaas, policy: BaseValuePolicy) -> Valuation {
    let total_storeys: u64 = assembled
        .structures
        .iter()
        .map(|s| u64::from(s.storey_count))
        .sum();

    let storeys: Vec<StoreyValuation> = assembled
        .structures
        .iter()
        .flat_map(|structure| {
            let record_base = match policy {
                BaseValuePolicy::PerRecord => assembled.total_base_market_value,
                BaseValuePolicy::SharedPool => safe_div(
                    assembled.total_base_market_value * f64::from(structure.storey_count),
                    total_storeys as f64,
                ),
            };
            storeys_of(structure, record_base)
        })
        .collect();

    let adjustments: Vec<AdjustmentValuation> =
        assembled.adjustments.iter().map(value_adjustment).collect();

    let main_totals = ReportTotals::of_storeys(&storeys);
    let item_totals = ReportTotals::of_adjustments(&adjustments);
    let combined = main_totals + item_totals;

    let assessment = Assessment {
        actual_use: assembled.actual_use.clone(),
        market_value: combined.market_value,
        rate_label: assembled.rate_label.clone(),
        rate: assembled.rate,
        assessed_value: (combined.market_value * assembled.rate).round(),
    };

    Valuation {
        storeys,
        adjustments,
        main_totals,
        item_totals,
        combined,
        assessment,
    }
}

/// Fans one structure out into identical per-storey valuations; only the
/// floor label differs between them.
fn storeys_of(structure: &StructureInput, record_base: f64) -> Vec<StoreyValuation> {
    let count = f64::from(structure.storey_count);

    let area = safe_div(structure.area, count);
    let base_value = safe_div(record_base, count);
    let after_construction = base_value * structure.construction_percent / 100.0;
    let depreciation_cost = after_construction * structure.depreciation_rate / 100.0;
    let market_value = after_construction - depreciation_cost;

    (1..=structure.storey_count)
        .map(|storey| StoreyValuation {
            description: format!("{} - {}", structure.description, floor_name(storey)),
            type_code: structure.type_code.clone(),
            unit_value: structure.unit_value,
            area,
            base_value,
            market_value,
            depreciation_rate: structure.depreciation_rate,
            depreciation_cost,
            completion_percent: structure.construction_percent,
            storey_number: storey,
            total_storeys: structure.storey_count,
        })
        .collect()
}

fn value_adjustment(adj: &AdjustmentInput) -> AdjustmentValuation {
    AdjustmentValuation {
        component: adj.component.clone(),
        subcomponent: adj.subcomponent.clone(),
        area: adj.area,
        unit_rate: adj.unit_rate,
        completion_percent: adj.completion_percent,
        depreciation_percent: adj.depreciation_percent,
        base_value: adj.base_value,
        depreciation_cost: adj.base_value * adj.depreciation_percent / 100.0,
        market_value: adj.market_value,
    }
}
