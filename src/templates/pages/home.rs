// templates/pages/home.rs

use crate::db::FormSummary;
use crate::templates::pages::faas_report::form_path;
use crate::templates::{card, desktop_layout};
use maud::{html, Markup};

pub fn home_page(forms: &[FormSummary]) -> Markup {
    desktop_layout(
        "Forms",
        html! {
            h1 { "Building FAAS forms" }

            (card("Forms", html! {
                @if forms.is_empty() {
                    p { "No forms yet." }
                } @else {
                    table class="forms" {
                        thead {
                            tr {
                                th { "Form" }
                                th { "ARP No." }
                                th { "Owner" }
                                th { "Last updated" }
                            }
                        }
                        tbody {
                            @for form in forms {
                                tr {
                                    td { a href=(form_path(&form.form_id)) { (form.form_id) } }
                                    td { (form.arp_number.as_deref().unwrap_or("")) }
                                    td { (form.owner_name.as_deref().unwrap_or("")) }
                                    td { (form.updated_at.as_deref().unwrap_or("")) }
                                }
                            }
                        }
                    }
                }
            }))
        },
    )
}
