// src/report/export.rs

use crate::errors::ServerError;
use crate::report::layout::{render, DrawingSurface, PageGeometry};
use crate::report::model::ReportModel;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::info;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A finished document ready to be sent or saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `building_faas_{form_id}.xlsx`, or a timestamped name without a form id.
pub fn export_filename(form_id: Option<&str>, now: DateTime<Utc>) -> String {
    let stem: String = match form_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect(),
        None => now.format("%Y%m%d_%H%M%S").to_string(),
    };
    format!("building_faas_{stem}.xlsx")
}

/// Lays the model out on `surface` and collects the finished bytes.
pub fn export_with<S: DrawingSurface>(
    model: &ReportModel,
    mut surface: S,
    page: &PageGeometry,
    now: DateTime<Utc>,
) -> Result<ExportArtifact, ServerError> {
    let stats = render(model, &mut surface, page)?;
    let bytes = surface.finish()?;

    let filename = export_filename(model.form_id(), now);
    info!(
        filename = %filename,
        pages = stats.pages,
        lines = stats.lines,
        bytes = bytes.len(),
        "report exported"
    );

    Ok(ExportArtifact {
        filename,
        content_type: XLSX_CONTENT_TYPE,
        bytes,
    })
}

/// Saves the artifact to `path`. The file appears only once fully written.
pub fn write_artifact(artifact: &ExportArtifact, path: &Path) -> Result<(), ServerError> {
    let partial = path.with_extension("part");

    fs::write(&partial, &artifact.bytes).map_err(|e| {
        ServerError::Export(format!("failed to write {}: {e}", partial.display()))
    })?;

    if let Err(e) = fs::rename(&partial, path) {
        let _ = fs::remove_file(&partial);
        return Err(ServerError::Export(format!(
            "failed to move export into {}: {e}",
            path.display()
        )));
    }
    Ok(())
}
