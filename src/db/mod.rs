pub mod connection;
pub mod faas;

pub use connection::{apply_sql, init_db, Database};
pub use faas::{FaasRepository, FormSummary, SqliteFaasRepository};
