// src/report/xlsx.rs

use crate::errors::ServerError;
use crate::report::layout::{DrawingSurface, LineStyle, PlacedCell};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};

/// Points per spreadsheet character width, roughly, at the default font.
const POINTS_PER_CHAR: f64 = 5.5;

/// Writes the report layout into a single worksheet.
///
/// Each drawn line becomes one worksheet row; new pages become manual
/// page breaks so the printout paginates like the layout.
pub struct XlsxSurface {
    worksheet: Worksheet,
    row: u32,
    page_breaks: Vec<u32>,
    widths: Vec<f64>,
    title: Format,
    header: Format,
    body: Format,
    subtotal: Format,
}

impl XlsxSurface {
    pub fn new(sheet_name: &str) -> Result<Self, ServerError> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(sheet_name)?;
        // A4
        worksheet.set_paper_size(9);

        Ok(Self {
            worksheet,
            row: 0,
            page_breaks: Vec::new(),
            widths: Vec::new(),
            title: Format::new().set_bold().set_font_size(12),
            header: Format::new()
                .set_bold()
                .set_border(FormatBorder::Thin)
                .set_background_color(Color::RGB(0xE5E7EB)),
            body: Format::new().set_border(FormatBorder::Thin),
            subtotal: Format::new().set_bold().set_border(FormatBorder::Thin),
        })
    }
}

impl DrawingSurface for XlsxSurface {
    fn start_page(&mut self, page: u32) -> Result<(), ServerError> {
        if page > 1 && self.row > 0 {
            self.page_breaks.push(self.row);
        }
        Ok(())
    }

    fn draw_title(&mut self, _y: f64, text: &str) -> Result<(), ServerError> {
        self.worksheet
            .write_string_with_format(self.row, 0, text, &self.title)?;
        self.row += 1;
        Ok(())
    }

    fn draw_row(
        &mut self,
        _y: f64,
        cells: &[PlacedCell],
        style: LineStyle,
    ) -> Result<(), ServerError> {
        let format = match style {
            LineStyle::Header => &self.header,
            LineStyle::Body => &self.body,
            LineStyle::Subtotal => &self.subtotal,
        };

        for (col, cell) in cells.iter().enumerate() {
            let col_num = u16::try_from(col)
                .map_err(|_| ServerError::Render(format!("column {col} out of range")))?;

            if cell.text.is_empty() {
                self.worksheet.write_blank(self.row, col_num, format)?;
            } else {
                self.worksheet
                    .write_string_with_format(self.row, col_num, &cell.text, format)?;
            }

            if self.widths.len() <= col {
                self.widths.resize(col + 1, 0.0);
            }
            self.widths[col] = self.widths[col].max(cell.width);
        }

        self.row += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, ServerError> {
        for (col, width) in self.widths.iter().enumerate() {
            let col_num = u16::try_from(col)
                .map_err(|_| ServerError::Render(format!("column {col} out of range")))?;
            self.worksheet
                .set_column_width(col_num, width / POINTS_PER_CHAR)?;
        }
        if !self.page_breaks.is_empty() {
            self.worksheet.set_page_breaks(&self.page_breaks)?;
        }

        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        Ok(workbook.save_to_buffer()?)
    }
}
