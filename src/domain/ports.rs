use crate::core::catalog::Catalog;
use crate::domain::model::{PersistOrder, RoundingMode};
use crate::utils::error::Result;
use rust_decimal::Decimal;
use std::path::Path;

/// Persistence for a whole catalog.
pub trait CatalogStore {
    fn load(&self, path: &Path) -> Result<Catalog>;
    fn save(&self, catalog: &Catalog, path: &Path) -> Result<()>;
}

pub trait ConfigProvider {
    fn catalog_path(&self) -> &str;
    fn output_path(&self) -> Option<&str>;
    fn output_suffix(&self) -> &str;
    fn tax_rate(&self) -> Decimal;
    fn rounding(&self) -> RoundingMode;
    fn persist_order(&self) -> PersistOrder;
}
