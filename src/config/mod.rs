mod file_config;

pub use file_config::{FileConfig, ReportFileConfig};

use crate::domain::BaseValuePolicy;
use crate::report::layout::PageGeometry;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Padding minimum for the Property Appraisal section.
pub const ROW_APPRAISAL: usize = 4;
/// Padding minimum for the Additional Items section.
pub const ROW_ITEMS: usize = 10;
/// Fixed row count of the Property Assessment section.
pub const ROW_ASSESSMENT: usize = 3;

/// Settings consumed by the valuation pipeline and the report renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub appraisal_rows: usize,
    pub item_rows: usize,
    pub assessment_rows: usize,
    pub base_value_policy: BaseValuePolicy,
    pub page: PageGeometry,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            appraisal_rows: ROW_APPRAISAL,
            item_rows: ROW_ITEMS,
            assessment_rows: ROW_ASSESSMENT,
            base_value_policy: BaseValuePolicy::default(),
            page: PageGeometry::default(),
        }
    }
}

impl ReportSettings {
    fn merge(file: ReportFileConfig) -> Result<Self> {
        let defaults = Self::default();
        let page = PageGeometry {
            height: file.page_height.unwrap_or(defaults.page.height),
            top_margin: file.top_margin.unwrap_or(defaults.page.top_margin),
            bottom_margin: file.bottom_margin.unwrap_or(defaults.page.bottom_margin),
            row_height: file.row_height.unwrap_or(defaults.page.row_height),
            ..defaults.page
        };

        if page.row_height <= 0.0 {
            bail!("row_height must be positive, got {}", page.row_height);
        }
        if page.top_margin + page.title_height + page.row_height > page.bottom_limit() {
            bail!(
                "page of height {} cannot fit a single row between its margins",
                page.height
            );
        }

        Ok(Self {
            appraisal_rows: file.appraisal_rows.unwrap_or(defaults.appraisal_rows),
            item_rows: file.item_rows.unwrap_or(defaults.item_rows),
            assessment_rows: file
                .assessment_rows
                .unwrap_or(defaults.assessment_rows)
                .max(1),
            base_value_policy: file
                .base_value_policy
                .unwrap_or(defaults.base_value_policy),
            page,
        })
    }
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub schema_path: Option<PathBuf>,
    pub port: u16,
    pub max_workers: usize,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub schema_path: PathBuf,
    pub port: u16,
    pub max_workers: usize,
    pub report: ReportSettings,
}

impl AppConfig {
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from("faas.sqlite3"));

        let schema_path = file
            .schema_path
            .map(PathBuf::from)
            .or_else(|| cli.schema_path.clone())
            .unwrap_or_else(|| PathBuf::from("sql/schema.sql"));

        let port = file.port.unwrap_or(cli.port);
        let max_workers = file.max_workers.unwrap_or(cli.max_workers);
        if max_workers == 0 {
            bail!("max_workers must be at least 1");
        }

        let report = ReportSettings::merge(file.report.unwrap_or_default())?;

        Ok(Self {
            db_path,
            schema_path,
            port,
            max_workers,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> CliConfig {
        CliConfig {
            db_path: Some(PathBuf::from("cli.sqlite3")),
            schema_path: None,
            port: 3000,
            max_workers: 8,
        }
    }

    #[test]
    fn file_values_override_cli() {
        let file = FileConfig::parse(
            r#"
            db_path = "file.sqlite3"
            port = 9000

            [report]
            appraisal_rows = 6
            "#,
        )
        .unwrap();

        let cfg = AppConfig::resolve(&cli(), Some(file)).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("file.sqlite3"));
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.max_workers, 8);
        assert_eq!(cfg.report.appraisal_rows, 6);
        assert_eq!(cfg.report.item_rows, ROW_ITEMS);
    }

    #[test]
    fn defaults_without_file() {
        let cfg = AppConfig::resolve(&cli(), None).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("cli.sqlite3"));
        assert_eq!(cfg.schema_path, PathBuf::from("sql/schema.sql"));
        assert_eq!(cfg.report, ReportSettings::default());
    }

    #[test]
    fn rejects_page_without_room_for_rows() {
        let file = FileConfig::parse(
            r#"
            [report]
            page_height = 60.0
            "#,
        )
        .unwrap();

        assert!(AppConfig::resolve(&cli(), Some(file)).is_err());
    }
}
