use crate::adapters::flat_file::derive_output_path;
use crate::core::cart::CartManager;
use crate::core::catalog::Catalog;
use crate::domain::model::{Book, BookId, CheckoutOutcome, PersistOrder, RoundingMode};
use crate::domain::ports::{CatalogStore, ConfigProvider};
use crate::utils::error::Result;
use crate::utils::money::default_tax_rate;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

pub const DEFAULT_CATALOG_FILE: &str = "Books.txt";
pub const DEFAULT_OUTPUT_SUFFIX: &str = "Out";

/// Resolved settings for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub catalog_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub output_suffix: String,
    pub tax_rate: Decimal,
    pub rounding: RoundingMode,
    pub persist_order: PersistOrder,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_FILE),
            output_path: None,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            tax_rate: default_tax_rate(),
            rounding: RoundingMode::default(),
            persist_order: PersistOrder::default(),
        }
    }
}

impl StoreSettings {
    pub fn from_provider<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            catalog_path: PathBuf::from(config.catalog_path()),
            output_path: config.output_path().map(PathBuf::from),
            output_suffix: config.output_suffix().to_string(),
            tax_rate: config.tax_rate(),
            rounding: config.rounding(),
            persist_order: config.persist_order(),
        }
    }
}

/// One shopping session: the catalog on the shelf, the cart, and where stock
/// gets written on checkout. Every command runs to completion before the next.
pub struct Bookstore<S: CatalogStore> {
    store: S,
    settings: StoreSettings,
    catalog: Catalog,
    cart: CartManager,
}

impl<S: CatalogStore> Bookstore<S> {
    pub fn new(store: S, settings: StoreSettings) -> Self {
        let cart = CartManager::new(settings.tax_rate, settings.rounding);
        Self {
            store,
            settings,
            catalog: Catalog::new(),
            cart,
        }
    }

    /// Loads the configured catalog file.
    pub fn open_default(&mut self) -> Result<usize> {
        let path = self.settings.catalog_path.clone();
        self.open(path)
    }

    /// Replaces the shelf with the catalog at `path`.
    ///
    /// The cart is emptied back into the old shelf first. If loading fails the
    /// current catalog and cart stay as they were.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let catalog = self.store.load(path)?;

        self.cart.clear(&mut self.catalog);
        self.catalog = catalog;
        self.settings.catalog_path = path.to_path_buf();

        tracing::info!(
            "Opened {} ({} titles, {} units)",
            path.display(),
            self.catalog.len(),
            self.catalog.total_units()
        );
        Ok(self.catalog.len())
    }

    pub fn add_to_cart(&mut self, id: BookId, count: u32) -> Result<()> {
        self.cart.add_item(&mut self.catalog, id, count)
    }

    pub fn remove_from_cart(&mut self, id: BookId) -> Result<bool> {
        self.cart.remove_item(&mut self.catalog, id)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear(&mut self.catalog);
    }

    pub fn checkout(&mut self) -> Result<CheckoutOutcome> {
        let output = self.output_path();
        self.cart.checkout(
            &self.catalog,
            &self.store,
            &output,
            self.settings.persist_order,
        )
    }

    /// Writes the current shelf without touching the cart.
    pub fn save_catalog(&self) -> Result<PathBuf> {
        let output = self.output_path();
        self.store.save(&self.catalog, &output)?;
        Ok(output)
    }

    /// Explicit output path if configured, otherwise derived from the input name.
    pub fn output_path(&self) -> PathBuf {
        match &self.settings.output_path {
            Some(path) => path.clone(),
            None => {
                let input = self
                    .catalog
                    .source()
                    .unwrap_or(self.settings.catalog_path.as_path());
                derive_output_path(input, &self.settings.output_suffix)
            }
        }
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.catalog.get(id)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &CartManager {
        &self.cart
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::StoreError;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        files: RefCell<HashMap<PathBuf, Vec<String>>>,
    }

    impl MemoryStore {
        fn with_file(path: &str, lines: &[&str]) -> Self {
            let store = Self::default();
            store.files.borrow_mut().insert(
                PathBuf::from(path),
                lines.iter().map(|l| l.to_string()).collect(),
            );
            store
        }
    }

    impl CatalogStore for MemoryStore {
        fn load(&self, path: &Path) -> Result<Catalog> {
            let files = self.files.borrow();
            let lines = files.get(path).ok_or_else(|| StoreError::NotFound {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })?;
            let mut books = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                let fields: Vec<&str> = line.split(',').collect();
                if fields.len() != 3 {
                    return Err(StoreError::Format {
                        line: i as u64 + 1,
                        reason: "wrong field count".to_string(),
                    });
                }
                let book = Book::parse(fields[0], fields[1], fields[2]).map_err(|reason| {
                    StoreError::Format {
                        line: i as u64 + 1,
                        reason,
                    }
                })?;
                books.push(book);
            }
            Ok(Catalog::from_books(books).with_source(path))
        }

        fn save(&self, catalog: &Catalog, path: &Path) -> Result<()> {
            let lines = catalog.books().iter().map(Book::to_line).collect();
            self.files.borrow_mut().insert(path.to_path_buf(), lines);
            Ok(())
        }
    }

    fn id(position: usize) -> BookId {
        BookId::from_position(position).unwrap()
    }

    #[test]
    fn test_checkout_writes_derived_output_file() {
        let store = MemoryStore::with_file("Books.txt", &["Dune, 19.99, 2", "Emma, 5.00, 1"]);
        let mut shop = Bookstore::new(store, StoreSettings::default());
        shop.open_default().unwrap();

        shop.add_to_cart(id(1), 2).unwrap();
        shop.add_to_cart(id(2), 1).unwrap();
        let outcome = shop.checkout().unwrap();

        match outcome {
            CheckoutOutcome::Completed { output_path, .. } => {
                assert_eq!(output_path, PathBuf::from("BooksOut.txt"))
            }
            CheckoutOutcome::EmptyCart => panic!("expected a receipt"),
        }
        let files = shop.store.files.borrow();
        assert_eq!(
            files[&PathBuf::from("BooksOut.txt")],
            vec!["Dune, 19.99, 0", "Emma, 5.00, 0"]
        );
        assert_eq!(
            files[&PathBuf::from("Books.txt")],
            vec!["Dune, 19.99, 2", "Emma, 5.00, 1"]
        );
    }

    #[test]
    fn test_failed_open_keeps_previous_catalog_and_cart() {
        let store = MemoryStore::with_file("Books.txt", &["Dune, 19.99, 2"]);
        store
            .files
            .borrow_mut()
            .insert(PathBuf::from("Bad.txt"), vec!["Dune, 8.99".to_string()]);
        let mut shop = Bookstore::new(store, StoreSettings::default());
        shop.open_default().unwrap();
        shop.add_to_cart(id(1), 1).unwrap();

        assert!(matches!(shop.open("Bad.txt"), Err(StoreError::Format { line: 1, .. })));
        assert!(matches!(shop.open("Nope.txt"), Err(StoreError::NotFound { .. })));

        assert_eq!(shop.catalog().len(), 1);
        assert_eq!(shop.book(id(1)).unwrap().quantity(), 1);
        assert_eq!(shop.cart().len(), 1);
        assert_eq!(shop.settings().catalog_path, PathBuf::from("Books.txt"));
    }

    #[test]
    fn test_open_replaces_catalog_and_empties_cart() {
        let store = MemoryStore::with_file("Books.txt", &["Dune, 19.99, 2"]);
        store
            .files
            .borrow_mut()
            .insert(PathBuf::from("Other.txt"), vec!["Emma, 5.00, 4".to_string()]);
        let mut shop = Bookstore::new(store, StoreSettings::default());
        shop.open_default().unwrap();
        shop.add_to_cart(id(1), 2).unwrap();

        assert_eq!(shop.open("Other.txt").unwrap(), 1);

        assert!(shop.cart().is_empty());
        assert_eq!(shop.cart().subtotal(), Decimal::ZERO);
        assert_eq!(shop.book(id(1)).unwrap().name(), "Emma");
        assert_eq!(shop.output_path(), PathBuf::from("OtherOut.txt"));
    }

    #[test]
    fn test_explicit_output_path_wins() {
        let store = MemoryStore::with_file("Books.txt", &["Dune, 19.99, 2"]);
        let settings = StoreSettings {
            output_path: Some(PathBuf::from("sold/today.txt")),
            ..StoreSettings::default()
        };
        let mut shop = Bookstore::new(store, settings);
        shop.open_default().unwrap();

        assert_eq!(shop.save_catalog().unwrap(), PathBuf::from("sold/today.txt"));
    }
}
