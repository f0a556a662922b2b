use crate::config::ReportSettings;
use crate::db::FaasRepository;
use crate::errors::{ResultResp, ServerError};
use crate::report::{Overrides, ReportPipeline};
use crate::responses::{document_response, html_response};
use crate::templates::pages::{faas_report_page, home_page};
use crate::templates::NoticeKind;
use astra::Request;
use std::io::Read;
use tracing::{debug, warn};
use url::form_urlencoded;

/// Largest accepted form body. A full report with every cell edited stays
/// well under this.
const MAX_FORM_BYTES: u64 = 1024 * 1024;

pub fn handle<R: FaasRepository>(
    mut req: Request,
    repo: &R,
    settings: &ReportSettings,
) -> ResultResp {
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();
    debug!(%method, %path, "request");

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => html_response(home_page(&repo.list_forms()?)),

        ("GET", ["faas", id]) => show_report(
            repo,
            settings,
            &decode_segment(id),
            Overrides::new(),
            None,
        ),

        ("POST", ["faas", id]) => {
            let overrides = read_overrides(&mut req)?;
            show_report(
                repo,
                settings,
                &decode_segment(id),
                overrides,
                Some((NoticeKind::Info, "Edits applied.")),
            )
        }

        ("POST", ["faas", id, "export"]) => {
            let overrides = read_overrides(&mut req)?;
            export_report(repo, settings, &decode_segment(id), overrides)
        }

        _ => Err(ServerError::NotFound),
    }
}

fn show_report<R: FaasRepository>(
    repo: &R,
    settings: &ReportSettings,
    form_id: &str,
    overrides: Overrides,
    notice: Option<(NoticeKind, &str)>,
) -> ResultResp {
    let inputs = repo.load_inputs(form_id)?;

    let mut pipeline = ReportPipeline::new(settings);
    let model = pipeline.prepare(&inputs, overrides);
    let table = pipeline.render_editable(&model);

    html_response(faas_report_page(&model, table, notice))
}

/// Sends the document. On failure the editable table comes back with the
/// submitted edits and an error notice instead.
fn export_report<R: FaasRepository>(
    repo: &R,
    settings: &ReportSettings,
    form_id: &str,
    overrides: Overrides,
) -> ResultResp {
    let inputs = repo.load_inputs(form_id)?;

    let mut pipeline = ReportPipeline::new(settings);
    let model = pipeline.prepare(&inputs, overrides);

    match pipeline.render_document(&model) {
        Ok(artifact) => document_response(artifact),
        Err(e) => {
            warn!(
                form_id,
                phase = ?pipeline.phase(),
                "export failed, showing the report again: {e}"
            );
            let message = format!("Export failed: {e}. Your edits were kept.");
            let table = pipeline.render_editable(&model);
            html_response(faas_report_page(
                &model,
                table,
                Some((NoticeKind::Error, &message)),
            ))
        }
    }
}

/// Collects cell overrides from an urlencoded form body.
fn read_overrides(req: &mut Request) -> Result<Overrides, ServerError> {
    let mut body = Vec::new();
    req.body_mut()
        .reader()
        .take(MAX_FORM_BYTES + 1)
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("unreadable form body: {e}")))?;

    if body.len() as u64 > MAX_FORM_BYTES {
        return Err(ServerError::BadRequest("form body too large".to_string()));
    }

    Ok(Overrides::from_pairs(form_urlencoded::parse(&body)))
}

/// Reverses the path-segment encoding used by `form_path`.
fn decode_segment(segment: &str) -> String {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_encoded_form_ids() {
        assert_eq!(decode_segment("FAAS-2024-001"), "FAAS-2024-001");
        assert_eq!(decode_segment("a%2Fb+c"), "a/b c");
    }
}
