pub mod html;
pub mod xlsx;

pub use html::html_response;
pub use xlsx::document_response;
