pub mod faas_report;
pub mod home;

pub use faas_report::{faas_report_page, form_path, report_table};
pub use home::home_page;
