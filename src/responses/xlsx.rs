// responses/xlsx.rs
use crate::errors::{ResultResp, ServerError};
use crate::report::ExportArtifact;
use astra::{Body, ResponseBuilder};

/// Return an exported document as a download.
pub fn document_response(artifact: ExportArtifact) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", artifact.content_type)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", artifact.filename),
        )
        .body(Body::from(artifact.bytes))
        .map_err(|_| ServerError::InternalError)
}
