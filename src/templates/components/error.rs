use crate::errors::ServerError;
use crate::templates::layouts::desktop_layout;
use astra::{Body, Response, ResponseBuilder};
use maud::html;
use tracing::error;

/// Convert a ServerError into a proper HTML response page
pub fn html_error_response(err: ServerError) -> Response {
    let status = match &err {
        ServerError::NotFound => 404,
        ServerError::BadRequest(_) => 400,
        ServerError::DbError(_)
        | ServerError::Render(_)
        | ServerError::Export(_)
        | ServerError::InternalError => 500,
    };
    if status >= 500 {
        error!("request failed: {err}");
    }

    let page = desktop_layout(
        &format!("Error {status}"),
        html! {
            h1 { "Error " (status) }
            p { (err.to_string()) }
            p { a href="/" { "← Back to forms" } }
        },
    );

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::TEXT_HTML_UTF_8.as_ref())
        .body(Body::from(page.into_string()))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
