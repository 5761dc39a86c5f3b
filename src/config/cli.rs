use crate::config::toml_config::StoreConfig;
use crate::domain::model::{PersistOrder, RoundingMode};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "bookstore")]
#[command(about = "A small bookstore: browse the shelf, fill a cart, check out")]
pub struct CliConfig {
    /// Book database to open (defaults to Books.txt)
    #[arg(long)]
    pub catalog: Option<String>,

    /// Where checkout writes the updated stock (defaults to <name>Out.<ext>)
    #[arg(long)]
    pub output: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub output_suffix: Option<String>,

    /// Sales tax rate, e.g. 0.07
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// ceiling or half_up
    #[arg(long)]
    pub rounding: Option<RoundingMode>,

    /// Empty the cart before writing stock on checkout
    #[arg(long)]
    pub legacy_checkout: bool,

    /// Read commands from this file instead of stdin
    #[arg(long)]
    pub script: Option<String>,

    /// Print listings and receipts as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve(&self) -> Result<StoreConfig> {
        let mut config = match &self.config {
            Some(path) => StoreConfig::from_file(path)?,
            None => StoreConfig::default(),
        };

        if let Some(catalog) = &self.catalog {
            config.store.catalog_path = catalog.clone();
        }
        if let Some(output) = &self.output {
            config.store.output_path = Some(output.clone());
        }
        if let Some(suffix) = &self.output_suffix {
            config.store.output_suffix = suffix.clone();
        }
        if let Some(rate) = self.tax_rate {
            config.checkout.tax_rate = rate;
        }
        if let Some(rounding) = self.rounding {
            config.checkout.rounding = rounding;
        }
        if self.legacy_checkout {
            config.checkout.persist_order = PersistOrder::ClearThenPersist;
        }
        if self.verbose {
            config.logging.level = Some("debug".to_string());
        }
        if self.log_json {
            config.logging.json = true;
        }

        config.validate()?;
        Ok(config)
    }
}
