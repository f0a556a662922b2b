use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::domain::BaseValuePolicy;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (override CLI)
    pub db_path: Option<String>,
    pub schema_path: Option<String>,
    pub port: Option<u16>,
    pub max_workers: Option<usize>,

    pub report: Option<ReportFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ReportFileConfig {
    pub appraisal_rows: Option<usize>,
    pub item_rows: Option<usize>,
    pub assessment_rows: Option<usize>,
    /// "per_record" or "shared_pool"
    pub base_value_policy: Option<BaseValuePolicy>,
    // Page geometry, in points
    pub page_height: Option<f64>,
    pub top_margin: Option<f64>,
    pub bottom_margin: Option<f64>,
    pub row_height: Option<f64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_section() {
        let cfg = FileConfig::parse(
            r#"
            port = 4000

            [report]
            item_rows = 12
            base_value_policy = "shared_pool"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.port, Some(4000));
        let report = cfg.report.unwrap();
        assert_eq!(report.item_rows, Some(12));
        assert_eq!(report.appraisal_rows, None);
        assert_eq!(report.base_value_policy, Some(BaseValuePolicy::SharedPool));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = FileConfig::parse("").unwrap();
        assert!(cfg.db_path.is_none());
        assert!(cfg.report.is_none());
    }
}
