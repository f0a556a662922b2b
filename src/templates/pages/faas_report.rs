// templates/pages/faas_report.rs

use crate::report::model::{CellKey, ReportModel, RowKind, Section};
use crate::templates::components::{notification, NoticeKind};
use crate::templates::desktop_layout;
use maud::{html, Markup};
use url::form_urlencoded::byte_serialize;

/// `/faas/{form_id}` with the id encoded as one path segment.
pub fn form_path(form_id: &str) -> String {
    let encoded: String = byte_serialize(form_id.as_bytes()).collect();
    format!("/faas/{encoded}")
}

/// The report as editable tables. Every editable cell is an input named by
/// its cell key and prefilled with the override or computed text.
pub fn report_table(model: &ReportModel) -> Markup {
    html! {
        div class="faas-report" {
            @for section in model.sections() {
                (section_table(model, section))
            }
        }
    }
}

fn section_table(model: &ReportModel, section: &Section) -> Markup {
    html! {
        section id=(section.id.as_str()) {
            h2 { (section.title()) }
            table {
                @if section.show_header {
                    thead {
                        tr {
                            @for column in &section.columns {
                                th { (column.header) }
                            }
                        }
                    }
                }
                tbody {
                    @for (row_index, row) in section.rows.iter().enumerate() {
                        tr class=(row_class(row.kind)) {
                            @for cell in &row.cells {
                                @let key = CellKey::new(section.id, row_index, cell.column);
                                @let text = model.display(&key).unwrap_or("");
                                td {
                                    @if cell.editable {
                                        input
                                            type="text"
                                            name=(key.to_string())
                                            value=(text)
                                            class=[model.overrides().get(&key).map(|_| "edited")];
                                    } @else {
                                        (text)
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn row_class(kind: RowKind) -> &'static str {
    match kind {
        RowKind::Data => "row-data",
        RowKind::Blank => "row-blank",
        RowKind::Subtotal => "row-subtotal",
        RowKind::Static => "row-static",
    }
}

/// Full report screen. `notice` carries a non-blocking message, e.g. a
/// failed export; the submitted edits stay in the inputs either way.
pub fn faas_report_page(
    model: &ReportModel,
    table: Markup,
    notice: Option<(NoticeKind, &str)>,
) -> Markup {
    let form_id = model.form_id().unwrap_or("");
    let action = form_path(form_id);
    let overrides = model.overrides();

    desktop_layout(
        &format!("FAAS {form_id}"),
        html! {
            h1 { "Building FAAS " (form_id) }

            @if let Some((kind, message)) = notice {
                (notification(kind, message))
            }

            form method="post" action=(action) {
                (table)

                div class="actions" {
                    @if !overrides.is_empty() {
                        span class="edited-count" { (overrides.len()) " edited cell(s)" }
                    }
                    button type="submit" { "Apply edits" }
                    button type="submit" formaction=(format!("{action}/export")) {
                        "Export spreadsheet"
                    }
                }
            }
        },
    )
}
