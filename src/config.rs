use crate::error::{Result, StatementError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MIN_YEAR: i32 = 2020;
pub const DEFAULT_MAX_YEARS: usize = 5;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Year window applied to every statement table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizeOptions {
    #[schemars(description = "Earliest fiscal year kept in the output (inclusive)")]
    pub min_year: i32,

    #[schemars(description = "Number of most recent years kept after filtering")]
    pub max_years: usize,
}

impl NormalizeOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_years == 0 {
            return Err(StatementError::InvalidConfig(
                "normalize.max_years must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_MIN_YEAR,
            max_years: DEFAULT_MAX_YEARS,
        }
    }
}

/// File names of the exported datasets, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatasetFiles {
    pub stock_info: String,
    pub balance_sheet: String,
    pub income_statement: String,
    pub cash_flow: String,
    pub indicators: String,
    pub average_indicators: String,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            stock_info: "Stock_info.csv".to_string(),
            balance_sheet: "Balance_sheet.csv".to_string(),
            income_statement: "Income_statement.csv".to_string(),
            cash_flow: "Cash_flow.csv".to_string(),
            indicators: "Indicators.csv".to_string(),
            average_indicators: "Average_indicators.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DashboardConfig {
    #[schemars(description = "Directory holding the exported CSV datasets")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub files: DatasetFiles,

    #[schemars(description = "Base URL of the analysis backend, e.g. http://localhost:8000/api")]
    pub api_base_url: String,

    #[serde(default)]
    pub normalize: NormalizeOptions,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("public"),
            files: DatasetFiles::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            normalize: NormalizeOptions::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `DATA_DIR` and `API_BASE_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(url) = std::env::var("API_BASE_URL") {
            if !url.trim().is_empty() {
                config.api_base_url = url.trim_end_matches('/').to_string();
            }
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        self.normalize.validate()?;
        if self.api_base_url.trim().is_empty() {
            return Err(StatementError::InvalidConfig(
                "api_base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn dataset_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.data_dir).join(file_name)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(DashboardConfig);
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.normalize.min_year, 2020);
        assert_eq!(config.normalize.max_years, 5);
        assert_eq!(config.files.balance_sheet, "Balance_sheet.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = DashboardConfig::from_json(
            r#"{ "data_dir": "/srv/data", "api_base_url": "http://backend/api" }"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.files.cash_flow, "Cash_flow.csv");
        assert_eq!(
            config.dataset_path(&config.files.cash_flow),
            PathBuf::from("/srv/data/Cash_flow.csv")
        );
    }

    #[test]
    fn test_zero_year_window_rejected() {
        let result = DashboardConfig::from_json(
            r#"{ "data_dir": ".", "api_base_url": "x", "normalize": { "min_year": 2020, "max_years": 0 } }"#,
        );
        assert!(matches!(result, Err(StatementError::InvalidConfig(_))));
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = DashboardConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("data_dir"));
        assert!(schema_json.contains("max_years"));
    }
}
