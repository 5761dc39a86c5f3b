pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::StoreConfig;

pub use adapters::FlatFileStore;
pub use app::Shell;
pub use crate::core::bookstore::{Bookstore, StoreSettings};
pub use crate::core::{cart::CartManager, catalog::Catalog};
pub use domain::model::{Book, BookId, CheckoutOutcome, ReceiptSummary};
pub use utils::error::{Result, StoreError};
