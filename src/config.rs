// src/config.rs

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::clean::CleaningRules;
use crate::error::{PipelineError, Result};

pub const DEFAULT_CSV_PATH: &str = "data/Amazon Sale Report.csv";
pub const DEFAULT_DATABASE_PATH: &str = "data/amazon_sales.duckdb";
pub const DEFAULT_CURRENCY: &str = "INR";
pub const DEFAULT_CANCELLED_PATTERN: &str = r"(?i)^cancelled$";

/// Everything one pipeline run needs. Every field has a default, so a YAML
/// file only has to name what it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub csv_path: PathBuf,
    pub database_path: PathBuf,
    pub default_currency: String,
    pub cancelled_status_pattern: String,
    /// chrono format strings, tried in order.
    pub date_formats: Vec<String>,
    /// Write the cleaned rows here as CSV when set.
    pub cleaned_csv_path: Option<PathBuf>,
    /// Write the run report here as JSON when set.
    pub report_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            default_currency: DEFAULT_CURRENCY.to_string(),
            cancelled_status_pattern: DEFAULT_CANCELLED_PATTERN.to_string(),
            date_formats: vec!["%m-%d-%y".to_string(), "%Y-%m-%d".to_string()],
            cleaned_csv_path: None,
            report_path: None,
        }
    }
}

impl PipelineConfig {
    /// Read a YAML config file; missing keys fall back to the defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self =
            serde_yaml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_currency.trim().is_empty() {
            return Err(PipelineError::Config(
                "default_currency must not be blank".into(),
            ));
        }
        if self.date_formats.is_empty() {
            return Err(PipelineError::Config(
                "date_formats must list at least one format".into(),
            ));
        }
        Ok(())
    }

    /// Compile the cleaning rules this config describes.
    pub fn cleaning_rules(&self) -> Result<CleaningRules> {
        self.validate()?;
        CleaningRules::new(
            &self.default_currency,
            &self.cancelled_status_pattern,
            self.date_formats.clone(),
        )
    }
}
