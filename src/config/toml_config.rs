use crate::core::bookstore::{DEFAULT_CATALOG_FILE, DEFAULT_OUTPUT_SUFFIX};
use crate::domain::model::{PersistOrder, RoundingMode};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, StoreError};
use crate::utils::money::default_tax_rate;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub store: StoreSection,
    pub checkout: CheckoutSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub name: Option<String>,
    pub catalog_path: String,
    pub output_path: Option<String>,
    pub output_suffix: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            name: None,
            catalog_path: DEFAULT_CATALOG_FILE.to_string(),
            output_path: None,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutSection {
    pub tax_rate: Decimal,
    pub rounding: RoundingMode,
    pub persist_order: PersistOrder,
}

impl Default for CheckoutSection {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            rounding: RoundingMode::default(),
            persist_order: PersistOrder::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub json: bool,
}

impl StoreConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StoreError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StoreError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BOOKSTORE_DATA})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StoreError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn display_name(&self) -> &str {
        self.store.name.as_deref().unwrap_or("Bookstore")
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.level.as_deref()
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("store.catalog_path", &self.store.catalog_path)?;

        if let Some(output) = &self.store.output_path {
            validation::validate_path("store.output_path", output)?;
            validation::validate_distinct_paths(
                "store.output_path",
                &self.store.catalog_path,
                output,
            )?;
        }

        validation::validate_non_empty_string("store.output_suffix", &self.store.output_suffix)?;
        validation::validate_range(
            "checkout.tax_rate",
            self.checkout.tax_rate,
            Decimal::ZERO,
            Decimal::ONE,
        )?;

        if let Some(level) = &self.logging.level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(StoreError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for StoreConfig {
    fn catalog_path(&self) -> &str {
        &self.store.catalog_path
    }

    fn output_path(&self) -> Option<&str> {
        self.store.output_path.as_deref()
    }

    fn output_suffix(&self) -> &str {
        &self.store.output_suffix
    }

    fn tax_rate(&self) -> Decimal {
        self.checkout.tax_rate
    }

    fn rounding(&self) -> RoundingMode {
        self.checkout.rounding
    }

    fn persist_order(&self) -> PersistOrder {
        self.checkout.persist_order
    }
}
