// src/report/model.rs

use crate::config::ReportSettings;
use crate::domain::records::FaasInputs;
use crate::domain::valuation::Valuation;
use crate::report::format::{
    display_value, format_area, format_currency, format_percent, humanize_key,
};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionId {
    FormDetails,
    GeneralInformation,
    PropertyAppraisal,
    AdditionalItems,
    CombinedTotals,
    PropertyAssessment,
    Signatures,
    Memoranda,
}

impl SectionId {
    pub const ALL: [SectionId; 8] = [
        SectionId::FormDetails,
        SectionId::GeneralInformation,
        SectionId::PropertyAppraisal,
        SectionId::AdditionalItems,
        SectionId::CombinedTotals,
        SectionId::PropertyAssessment,
        SectionId::Signatures,
        SectionId::Memoranda,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::FormDetails => "form_details",
            SectionId::GeneralInformation => "general_information",
            SectionId::PropertyAppraisal => "property_appraisal",
            SectionId::AdditionalItems => "additional_items",
            SectionId::CombinedTotals => "combined_totals",
            SectionId::PropertyAssessment => "property_assessment",
            SectionId::Signatures => "signatures",
            SectionId::Memoranda => "memoranda",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionId::FormDetails => "Form Details",
            SectionId::GeneralInformation => "General Information",
            SectionId::PropertyAppraisal => "Property Appraisal",
            SectionId::AdditionalItems => "Additional Items",
            SectionId::CombinedTotals => "Combined Totals",
            SectionId::PropertyAssessment => "Property Assessment",
            SectionId::Signatures => "Signatures",
            SectionId::Memoranda => "Memoranda",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

/// Stable identifier of one cell: `section:row:column`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub section: SectionId,
    pub row: usize,
    pub column: String,
}

impl CellKey {
    pub fn new(section: SectionId, row: usize, column: impl Into<String>) -> Self {
        Self {
            section,
            row,
            column: column.into(),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, ':');
        let section = SectionId::parse(parts.next()?)?;
        let row = parts.next()?.parse().ok()?;
        let column = parts.next().filter(|c| !c.is_empty())?;
        Some(Self::new(section, row, column))
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.section.as_str(), self.row, self.column)
    }
}

/// User-supplied cell values. They win over computed text for display and
/// export; the computed values are never touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides(BTreeMap<CellKey, String>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins.
    pub fn set(&mut self, key: CellKey, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }

    pub fn get(&self, key: &CellKey) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &CellKey) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Collects overrides from submitted form fields; names that are not
    /// cell keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut overrides = Self::new();
        for (name, value) in pairs {
            if let Some(key) = CellKey::parse(name.as_ref()) {
                overrides.set(key, value);
            }
        }
        overrides
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub id: &'static str,
    pub header: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Data,
    /// Padding for manual fill-in.
    Blank,
    Subtotal,
    /// Fixed footer content.
    Static,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub column: &'static str,
    pub computed: String,
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
    pub show_header: bool,
}

impl Section {
    pub fn title(&self) -> &'static str {
        self.id.title()
    }
}

/// Layout-ready report: sections in fixed order plus the override map.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportModel {
    form_id: Option<String>,
    sections: Vec<Section>,
    overrides: Overrides,
}

impl ReportModel {
    pub fn form_id(&self) -> Option<&str> {
        self.form_id.as_deref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    fn cell(&self, key: &CellKey) -> Option<&Cell> {
        self.section(key.section)?
            .rows
            .get(key.row)?
            .cells
            .iter()
            .find(|c| c.column == key.column)
    }

    /// Display text of a cell: the override when set, the computed text otherwise.
    pub fn display(&self, key: &CellKey) -> Option<&str> {
        let cell = self.cell(key)?;
        Some(
            self.overrides
                .get(key)
                .unwrap_or(cell.computed.as_str()),
        )
    }

    /// Records a user edit. Returns false for unknown or read-only cells.
    /// Writing the computed text back clears the override.
    pub fn set_override(&mut self, key: CellKey, value: impl Into<String>) -> bool {
        let value = value.into();
        let computed = match self.cell(&key) {
            Some(cell) if cell.editable => cell.computed.clone(),
            _ => return false,
        };

        if value == computed {
            self.overrides.remove(&key);
        } else {
            self.overrides.set(key, value);
        }
        true
    }
}

const KEY_VALUE_COLUMNS: &[Column] = &[
    Column { id: "field", header: "Field" },
    Column { id: "value", header: "Value" },
];

const APPRAISAL_COLUMNS: &[Column] = &[
    Column { id: "description", header: "Description" },
    Column { id: "type", header: "Type" },
    Column { id: "unit_value", header: "Unit Value" },
    Column { id: "area", header: "Area" },
    Column { id: "base_value", header: "Base Value" },
    Column { id: "completion", header: "% Completion" },
    Column { id: "depreciation_rate", header: "Depreciation %" },
    Column { id: "depreciation_cost", header: "Depreciation Cost" },
    Column { id: "market_value", header: "Market Value" },
];

const ITEM_COLUMNS: &[Column] = &[
    Column { id: "component", header: "Component" },
    Column { id: "subcomponent", header: "Sub-Component" },
    Column { id: "area", header: "Area" },
    Column { id: "unit_rate", header: "Unit Rate" },
    Column { id: "base_value", header: "Base Value" },
    Column { id: "completion", header: "% Completion" },
    Column { id: "depreciation", header: "Depreciation %" },
    Column { id: "depreciation_cost", header: "Depreciation Cost" },
    Column { id: "market_value", header: "Market Value" },
];

const COMBINED_COLUMNS: &[Column] = &[
    Column { id: "area", header: "Total Area" },
    Column { id: "base_value", header: "Total Base Value" },
    Column { id: "depreciation_cost", header: "Total Depreciation Cost" },
    Column { id: "market_value", header: "Total Market Value" },
];

const ASSESSMENT_COLUMNS: &[Column] = &[
    Column { id: "actual_use", header: "Actual Use" },
    Column { id: "market_value", header: "Market Value" },
    Column { id: "assessment_level", header: "Assessment Level" },
    Column { id: "assessed_value", header: "Assessed Value" },
];

const SIGNATURE_COLUMNS: &[Column] = &[
    Column { id: "role", header: "" },
    Column { id: "name", header: "Name" },
    Column { id: "date", header: "Date" },
];

const MEMORANDA_COLUMNS: &[Column] = &[Column { id: "note", header: "Memoranda" }];

const SIGNATORIES: [&str; 3] = ["Appraised by", "Recommending approval", "Approved by"];
const MEMORANDA_LINES: usize = 3;

/// Keys never shown in the key/value sections.
pub fn is_internal_key(key: &str) -> bool {
    matches!(key, "id" | "form_id" | "created_at" | "updated_at") || key.ends_with("_id")
}

/// Builds the report model. Overrides that do not address an editable
/// cell, or that repeat the computed text, are dropped.
pub fn build_report(
    inputs: &FaasInputs,
    valuation: &Valuation,
    settings: &ReportSettings,
    overrides: Overrides,
) -> ReportModel {
    let sections = vec![
        key_value_section(SectionId::FormDetails, &inputs.form_metadata),
        key_value_section(SectionId::GeneralInformation, &inputs.general_information),
        appraisal_section(valuation, settings.appraisal_rows),
        items_section(valuation, settings.item_rows),
        combined_section(valuation),
        assessment_section(valuation, settings.assessment_rows),
        signatures_section(),
        memoranda_section(),
    ];

    let mut model = ReportModel {
        form_id: inputs.form_id.clone(),
        sections,
        overrides: Overrides::new(),
    };
    for (key, value) in overrides.0 {
        model.set_override(key, value);
    }
    model
}

fn editable(column: &'static str, text: impl Into<String>) -> Cell {
    Cell {
        column,
        computed: text.into(),
        editable: true,
    }
}

fn fixed(column: &'static str, text: impl Into<String>) -> Cell {
    Cell {
        column,
        computed: text.into(),
        editable: false,
    }
}

fn blank_row(columns: &[Column]) -> ReportRow {
    ReportRow {
        kind: RowKind::Blank,
        cells: columns.iter().map(|c| editable(c.id, "")).collect(),
    }
}

/// Appends blank rows until `rows` holds at least `minimum` entries.
fn pad_rows(rows: &mut Vec<ReportRow>, columns: &[Column], minimum: usize) {
    while rows.len() < minimum {
        rows.push(blank_row(columns));
    }
}

fn key_value_section(id: SectionId, pairs: &[(String, serde_json::Value)]) -> Section {
    let rows = pairs
        .iter()
        .filter(|(key, _)| !is_internal_key(key))
        .map(|(key, value)| ReportRow {
            kind: RowKind::Data,
            cells: vec![
                fixed("field", humanize_key(key)),
                editable("value", display_value(value)),
            ],
        })
        .collect();

    Section {
        id,
        columns: KEY_VALUE_COLUMNS.to_vec(),
        rows,
        show_header: false,
    }
}

fn appraisal_section(valuation: &Valuation, minimum: usize) -> Section {
    let mut rows: Vec<ReportRow> = valuation
        .storeys
        .iter()
        .map(|s| ReportRow {
            kind: RowKind::Data,
            cells: vec![
                editable("description", s.description.clone()),
                editable("type", s.type_code.clone()),
                editable("unit_value", format_currency(s.unit_value)),
                editable("area", format_area(s.area)),
                editable("base_value", format_currency(s.base_value)),
                editable("completion", format_percent(s.completion_percent)),
                editable("depreciation_rate", format_percent(s.depreciation_rate)),
                editable("depreciation_cost", format_currency(s.depreciation_cost)),
                editable("market_value", format_currency(s.market_value)),
            ],
        })
        .collect();
    pad_rows(&mut rows, APPRAISAL_COLUMNS, minimum);

    let totals = valuation.main_totals;
    rows.push(ReportRow {
        kind: RowKind::Subtotal,
        cells: vec![
            fixed("description", "Sub-Total"),
            fixed("type", ""),
            fixed("unit_value", ""),
            editable("area", format_area(totals.area)),
            editable("base_value", format_currency(totals.base_value)),
            fixed("completion", ""),
            fixed("depreciation_rate", ""),
            editable("depreciation_cost", format_currency(totals.depreciation_cost)),
            editable("market_value", format_currency(totals.market_value)),
        ],
    });

    Section {
        id: SectionId::PropertyAppraisal,
        columns: APPRAISAL_COLUMNS.to_vec(),
        rows,
        show_header: true,
    }
}

fn items_section(valuation: &Valuation, minimum: usize) -> Section {
    let mut rows: Vec<ReportRow> = valuation
        .adjustments
        .iter()
        .map(|a| ReportRow {
            kind: RowKind::Data,
            cells: vec![
                editable("component", a.component.clone()),
                editable("subcomponent", a.subcomponent.clone()),
                editable("area", format_area(a.area)),
                editable("unit_rate", format_currency(a.unit_rate)),
                editable("base_value", format_currency(a.base_value)),
                editable("completion", format_percent(a.completion_percent)),
                editable("depreciation", format_percent(a.depreciation_percent)),
                editable("depreciation_cost", format_currency(a.depreciation_cost)),
                editable("market_value", format_currency(a.market_value)),
            ],
        })
        .collect();
    pad_rows(&mut rows, ITEM_COLUMNS, minimum);

    let totals = valuation.item_totals;
    rows.push(ReportRow {
        kind: RowKind::Subtotal,
        cells: vec![
            fixed("component", "Sub-Total"),
            fixed("subcomponent", ""),
            editable("area", format_area(totals.area)),
            fixed("unit_rate", ""),
            editable("base_value", format_currency(totals.base_value)),
            fixed("completion", ""),
            fixed("depreciation", ""),
            editable("depreciation_cost", format_currency(totals.depreciation_cost)),
            editable("market_value", format_currency(totals.market_value)),
        ],
    });

    Section {
        id: SectionId::AdditionalItems,
        columns: ITEM_COLUMNS.to_vec(),
        rows,
        show_header: true,
    }
}

fn combined_section(valuation: &Valuation) -> Section {
    let c = valuation.combined;
    Section {
        id: SectionId::CombinedTotals,
        columns: COMBINED_COLUMNS.to_vec(),
        rows: vec![ReportRow {
            kind: RowKind::Subtotal,
            cells: vec![
                editable("area", format_area(c.area)),
                editable("base_value", format_currency(c.base_value)),
                editable("depreciation_cost", format_currency(c.depreciation_cost)),
                editable("market_value", format_currency(c.market_value)),
            ],
        }],
        show_header: true,
    }
}

fn assessment_section(valuation: &Valuation, row_count: usize) -> Section {
    let a = &valuation.assessment;
    let level = match &a.rate_label {
        Some(_) => format!("{}%", format_percent(a.rate * 100.0)),
        None => String::new(),
    };

    let mut rows = vec![ReportRow {
        kind: RowKind::Data,
        cells: vec![
            editable("actual_use", a.actual_use.clone().unwrap_or_default()),
            editable("market_value", format_currency(a.market_value)),
            editable("assessment_level", level),
            editable("assessed_value", format_currency(a.assessed_value)),
        ],
    }];
    pad_rows(&mut rows, ASSESSMENT_COLUMNS, row_count);

    Section {
        id: SectionId::PropertyAssessment,
        columns: ASSESSMENT_COLUMNS.to_vec(),
        rows,
        show_header: true,
    }
}

fn signatures_section() -> Section {
    let rows = SIGNATORIES
        .iter()
        .map(|role| ReportRow {
            kind: RowKind::Static,
            cells: vec![fixed("role", *role), editable("name", ""), editable("date", "")],
        })
        .collect();

    Section {
        id: SectionId::Signatures,
        columns: SIGNATURE_COLUMNS.to_vec(),
        rows,
        show_header: true,
    }
}

fn memoranda_section() -> Section {
    let rows = (0..MEMORANDA_LINES)
        .map(|_| ReportRow {
            kind: RowKind::Static,
            cells: vec![editable("note", "")],
        })
        .collect();

    Section {
        id: SectionId::Memoranda,
        columns: MEMORANDA_COLUMNS.to_vec(),
        rows,
        show_header: true,
    }
}
