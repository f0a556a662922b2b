// src/report/layout.rs

use crate::errors::ServerError;
use crate::report::format::truncate_chars;
use crate::report::model::{CellKey, ReportModel, RowKind, Section, SectionId};
use tracing::debug;

/// Page geometry in points. Defaults to A4 portrait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub height: f64,
    pub left_margin: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub row_height: f64,
    pub title_height: f64,
    pub section_gap: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            height: 842.0,
            left_margin: 40.0,
            top_margin: 40.0,
            bottom_margin: 40.0,
            row_height: 14.0,
            title_height: 20.0,
            section_gap: 8.0,
        }
    }
}

impl PageGeometry {
    /// Lowest y a line may reach before the page breaks.
    pub fn bottom_limit(&self) -> f64 {
        self.height - self.bottom_margin
    }
}

/// Width in points and the longest text that fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub width: f64,
    pub max_chars: usize,
}

const fn col(width: f64, max_chars: usize) -> ColumnSpec {
    ColumnSpec { width, max_chars }
}

// Every table spans the same 515pt content width.
const KEY_VALUE_SPECS: &[ColumnSpec] = &[col(160.0, 28), col(355.0, 64)];
const APPRAISAL_SPECS: &[ColumnSpec] = &[
    col(110.0, 22),
    col(40.0, 8),
    col(55.0, 12),
    col(45.0, 10),
    col(60.0, 14),
    col(40.0, 6),
    col(40.0, 6),
    col(60.0, 14),
    col(65.0, 14),
];
const ITEM_SPECS: &[ColumnSpec] = &[
    col(75.0, 14),
    col(75.0, 14),
    col(45.0, 10),
    col(50.0, 12),
    col(60.0, 14),
    col(40.0, 6),
    col(40.0, 6),
    col(60.0, 14),
    col(70.0, 14),
];
const COMBINED_SPECS: &[ColumnSpec] = &[
    col(125.0, 24),
    col(130.0, 24),
    col(130.0, 24),
    col(130.0, 24),
];
const ASSESSMENT_SPECS: &[ColumnSpec] = &[
    col(140.0, 26),
    col(125.0, 22),
    col(110.0, 18),
    col(140.0, 22),
];
const SIGNATURE_SPECS: &[ColumnSpec] = &[col(175.0, 32), col(220.0, 40), col(120.0, 20)];
const MEMORANDA_SPECS: &[ColumnSpec] = &[col(515.0, 100)];

pub fn column_specs(section: SectionId) -> &'static [ColumnSpec] {
    match section {
        SectionId::FormDetails | SectionId::GeneralInformation => KEY_VALUE_SPECS,
        SectionId::PropertyAppraisal => APPRAISAL_SPECS,
        SectionId::AdditionalItems => ITEM_SPECS,
        SectionId::CombinedTotals => COMBINED_SPECS,
        SectionId::PropertyAssessment => ASSESSMENT_SPECS,
        SectionId::Signatures => SIGNATURE_SPECS,
        SectionId::Memoranda => MEMORANDA_SPECS,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell {
    pub x: f64,
    pub width: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Header,
    Body,
    Subtotal,
}

/// Anything that can receive the report layout: a document writer, or a
/// recorder in tests.
pub trait DrawingSurface {
    fn start_page(&mut self, page: u32) -> Result<(), ServerError>;

    fn draw_title(&mut self, y: f64, text: &str) -> Result<(), ServerError>;

    fn draw_row(&mut self, y: f64, cells: &[PlacedCell], style: LineStyle)
        -> Result<(), ServerError>;

    /// Produces the finished document.
    fn finish(self) -> Result<Vec<u8>, ServerError>
    where
        Self: Sized;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub pages: u32,
    pub lines: usize,
}

struct Cursor<'a, S> {
    surface: &'a mut S,
    page: &'a PageGeometry,
    y: f64,
    page_number: u32,
    lines: usize,
}

impl<S: DrawingSurface> Cursor<'_, S> {
    /// Breaks the page when a line of `height` would cross the bottom margin.
    fn reserve(&mut self, height: f64) -> Result<(), ServerError> {
        if self.y + height <= self.page.bottom_limit() {
            return Ok(());
        }
        if self.page.top_margin + height > self.page.bottom_limit() {
            return Err(ServerError::Render(format!(
                "line of height {height} does not fit between page margins"
            )));
        }

        self.page_number += 1;
        self.surface.start_page(self.page_number)?;
        self.y = self.page.top_margin;
        Ok(())
    }

    fn title(&mut self, text: &str) -> Result<(), ServerError> {
        self.reserve(self.page.title_height)?;
        self.surface.draw_title(self.y, text)?;
        self.y += self.page.title_height;
        self.lines += 1;
        Ok(())
    }

    fn row(&mut self, cells: &[PlacedCell], style: LineStyle) -> Result<(), ServerError> {
        self.reserve(self.page.row_height)?;
        self.surface.draw_row(self.y, cells, style)?;
        self.y += self.page.row_height;
        self.lines += 1;
        Ok(())
    }
}

/// Lays the model out onto `surface`, page by page.
///
/// Rows continue on the next page without a repeated header. Cell text is
/// cut to the column's character limit. Overrides are applied.
pub fn render<S: DrawingSurface>(
    model: &ReportModel,
    surface: &mut S,
    page: &PageGeometry,
) -> Result<RenderStats, ServerError> {
    surface.start_page(1)?;
    let mut cursor = Cursor {
        surface,
        page,
        y: page.top_margin,
        page_number: 1,
        lines: 0,
    };

    for section in model.sections() {
        render_section(model, section, &mut cursor)?;
        cursor.y += page.section_gap;
    }

    debug!(
        pages = cursor.page_number,
        lines = cursor.lines,
        "report layout complete"
    );

    Ok(RenderStats {
        pages: cursor.page_number,
        lines: cursor.lines,
    })
}

fn render_section<S: DrawingSurface>(
    model: &ReportModel,
    section: &Section,
    cursor: &mut Cursor<'_, S>,
) -> Result<(), ServerError> {
    let specs = column_specs(section.id);
    if specs.len() < section.columns.len() {
        return Err(ServerError::Render(format!(
            "section {} has {} columns but only {} widths",
            section.id.as_str(),
            section.columns.len(),
            specs.len()
        )));
    }
    let left = cursor.page.left_margin;

    cursor.title(section.title())?;

    if section.show_header {
        let headers = place(left, specs, section.columns.iter().map(|c| c.header));
        cursor.row(&headers, LineStyle::Header)?;
    }

    for (row_index, row) in section.rows.iter().enumerate() {
        let texts = section.columns.iter().map(|column| {
            let key = CellKey::new(section.id, row_index, column.id);
            model.display(&key).unwrap_or("")
        });
        let cells = place(left, specs, texts);

        let style = match row.kind {
            RowKind::Subtotal => LineStyle::Subtotal,
            RowKind::Data | RowKind::Blank | RowKind::Static => LineStyle::Body,
        };
        cursor.row(&cells, style)?;
    }

    Ok(())
}

fn place<'t>(
    left: f64,
    specs: &[ColumnSpec],
    texts: impl Iterator<Item = &'t str>,
) -> Vec<PlacedCell> {
    let mut x = left;
    specs
        .iter()
        .zip(texts)
        .map(|(spec, text)| {
            let cell = PlacedCell {
                x,
                width: spec.width,
                text: truncate_chars(text, spec.max_chars).to_string(),
            };
            x += spec.width;
            cell
        })
        .collect()
}
