pub mod bookstore;
pub mod cart;
pub mod catalog;

pub use crate::domain::model::{Book, BookId, CheckoutOutcome, ReceiptSummary};
pub use crate::domain::ports::{CatalogStore, ConfigProvider};
pub use crate::utils::error::Result;
