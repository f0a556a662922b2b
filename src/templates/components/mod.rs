use maud::{html, Markup};

pub mod error;

pub use error::html_error_response;

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Non-blocking banner shown above a page's content.
pub fn notification(kind: NoticeKind, message: &str) -> Markup {
    let (class, role) = match kind {
        NoticeKind::Info => ("notice notice-info", "status"),
        NoticeKind::Error => ("notice notice-error", "alert"),
    };
    html! {
        div class=(class) role=(role) {
            p { (message) }
        }
    }
}
