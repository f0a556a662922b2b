// errors.rs
use astra::Response;
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, missing resources, etc.) or downstream layers (DB, export).
///
/// Valuation itself never fails: malformed numbers and lookup misses are
/// absorbed by defaults. Only rendering and exporting surface errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Database Error: {0}")]
    DbError(String),

    #[error("Render Error: {0}")]
    Render(String),

    #[error("Export Error: {0}")]
    Export(String),

    #[error("Internal Server Error")]
    InternalError,
}

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::DbError(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ServerError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ServerError::Export(e.to_string())
    }
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;
