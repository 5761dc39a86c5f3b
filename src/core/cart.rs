use crate::core::catalog::Catalog;
use crate::domain::model::{BookId, CheckoutOutcome, PersistOrder, ReceiptSummary, RoundingMode};
use crate::domain::ports::CatalogStore;
use crate::utils::error::{Result, StoreError};
use crate::utils::money::{default_tax_rate, format_amount, round_for_display};
use rust_decimal::Decimal;
use std::path::Path;

/// Units picked for purchase. Each entry is one unit of a catalog book; stock
/// leaves the shelf when it enters the cart.
#[derive(Debug, Clone)]
pub struct CartManager {
    items: Vec<BookId>,
    subtotal: Decimal,
    tax_rate: Decimal,
    rounding: RoundingMode,
}

impl Default for CartManager {
    fn default() -> Self {
        Self::new(default_tax_rate(), RoundingMode::default())
    }
}

impl CartManager {
    pub fn new(tax_rate: Decimal, rounding: RoundingMode) -> Self {
        Self {
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            tax_rate,
            rounding,
        }
    }

    pub fn add_item(&mut self, catalog: &mut Catalog, id: BookId, count: u32) -> Result<()> {
        if count == 0 {
            return Err(StoreError::InvalidCount { count });
        }
        let book = catalog
            .get_mut(id)
            .ok_or(StoreError::UnknownBook {
                position: id.position(),
            })?;

        // 先算金額，溢位時架上與購物車都不變
        let subtotal = book
            .price()
            .amount()
            .checked_mul(Decimal::from(count))
            .and_then(|line| self.subtotal.checked_add(line))
            .ok_or_else(|| overflow(format!("subtotal for {} x \"{}\"", count, book.name())))?;
        book.take(count)?;

        self.items
            .extend(std::iter::repeat(id).take(count as usize));
        self.subtotal = subtotal;

        tracing::debug!(
            "Added {} x \"{}\" to cart, {} left on shelf, subtotal {}",
            count,
            book.name(),
            book.quantity(),
            self.subtotal
        );
        Ok(())
    }

    /// Puts one unit of `id` back on the shelf. Returns `false` when the cart
    /// holds no unit of that book.
    pub fn remove_item(&mut self, catalog: &mut Catalog, id: BookId) -> Result<bool> {
        let Some(slot) = self.items.iter().position(|&item| item == id) else {
            return Ok(false);
        };
        let book = catalog
            .get_mut(id)
            .ok_or(StoreError::UnknownBook {
                position: id.position(),
            })?;

        let subtotal = self
            .subtotal
            .checked_sub(book.price().amount())
            .ok_or_else(|| overflow(format!("subtotal after returning \"{}\"", book.name())))?;

        self.items.remove(slot);
        book.restock_one();
        self.subtotal = subtotal;

        tracing::debug!(
            "Returned \"{}\" to shelf ({} on hand), subtotal {}",
            book.name(),
            book.quantity(),
            self.subtotal
        );
        Ok(true)
    }

    pub fn clear(&mut self, catalog: &mut Catalog) {
        let returned = self.items.len();

        // 由後往前逐本放回架上
        while let Some(id) = self.items.pop() {
            if let Some(book) = catalog.get_mut(id) {
                book.restock_one();
            }
        }
        self.subtotal = Decimal::ZERO;

        if returned > 0 {
            tracing::debug!("Cleared cart, {} units back on the shelf", returned);
        }
    }

    /// Receipt figures for the current cart without buying anything.
    pub fn quote(&self) -> Result<ReceiptSummary> {
        let sales_tax = self
            .subtotal
            .checked_mul(self.tax_rate)
            .ok_or_else(|| overflow("sales tax".to_string()))?;
        let total = self
            .subtotal
            .checked_add(sales_tax)
            .ok_or_else(|| overflow("total".to_string()))?;

        Ok(ReceiptSummary {
            items: self.items.len(),
            subtotal: round_for_display(self.subtotal, self.rounding),
            sales_tax: round_for_display(sales_tax, self.rounding),
            total: round_for_display(total, self.rounding),
        })
    }

    /// Sells everything in the cart and writes the catalog to `output`.
    ///
    /// Shelf quantities were already reduced by [`add_item`](Self::add_item),
    /// so nothing is restocked here. `order` decides whether the cart is kept
    /// when the write fails.
    pub fn checkout<S>(
        &mut self,
        catalog: &Catalog,
        store: &S,
        output: &Path,
        order: PersistOrder,
    ) -> Result<CheckoutOutcome>
    where
        S: CatalogStore + ?Sized,
    {
        if self.items.is_empty() {
            tracing::info!("Checkout requested on an empty cart, nothing to do");
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let receipt = self.quote()?;

        match order {
            PersistOrder::PersistThenClear => {
                store.save(catalog, output)?;
                self.discard();
            }
            PersistOrder::ClearThenPersist => {
                self.discard();
                store.save(catalog, output)?;
            }
        }

        tracing::info!(
            "Checked out {} units, total {} (tax {})",
            receipt.items,
            receipt.total,
            receipt.sales_tax
        );
        Ok(CheckoutOutcome::Completed {
            receipt,
            output_path: output.to_path_buf(),
        })
    }

    // 已售出，不放回架上
    fn discard(&mut self) {
        self.items.clear();
        self.subtotal = Decimal::ZERO;
    }

    pub fn items(&self) -> &[BookId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_of(&self, id: BookId) -> usize {
        self.items.iter().filter(|&&item| item == id).count()
    }

    /// Running subtotal, unrounded.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    pub fn display_total(&self) -> String {
        format_amount(self.subtotal, self.rounding)
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }
}

fn overflow(context: String) -> StoreError {
    StoreError::AmountOverflow { context }
}
