use crate::utils::error::{Result, StoreError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

/// Position of a book inside its catalog. Stable for the catalog's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(pub(crate) usize);

impl BookId {
    pub fn index(self) -> usize {
        self.0
    }

    /// 給使用者看的編號從 1 開始
    pub fn position(self) -> usize {
        self.0 + 1
    }

    pub fn from_position(position: usize) -> Option<Self> {
        position.checked_sub(1).map(BookId)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.position())
    }
}

/// A unit price: the literal text read from the catalog plus its exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    literal: String,
    amount: Decimal,
}

impl Price {
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn as_str(&self) -> &str {
        &self.literal
    }
}

impl FromStr for Price {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let literal = s.trim();
        // 只接受十進位數字，不允許 `1_9.99` 這類寫法
        if let Some(c) = literal
            .chars()
            .find(|c| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        {
            return Err(format!("price '{}' contains '{}'", literal, c));
        }
        let amount = Decimal::from_str(literal)
            .map_err(|e| format!("price '{}' is not a decimal number ({})", literal, e))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(format!("price '{}' is negative", literal));
        }
        Ok(Self {
            literal: literal.to_string(),
            amount,
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.literal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    name: String,
    price: Price,
    quantity: u32,
}

impl Book {
    pub fn new(name: impl Into<String>, price: Price, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Builds a book from raw text fields, as they appear in a catalog line.
    pub fn parse(name: &str, price: &str, quantity: &str) -> std::result::Result<Self, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("book name is empty".to_string());
        }
        let price = price.parse::<Price>()?;
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("quantity '{}' is not a non-negative integer", quantity.trim()))?;
        Ok(Self::new(name, price, quantity))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &Price {
        &self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Counts a shopper may pick for this title right now.
    pub fn purchasable_counts(&self) -> RangeInclusive<u32> {
        1..=self.quantity
    }

    /// 從架上取走 `count` 本，庫存不足時不做任何修改
    pub(crate) fn take(&mut self, count: u32) -> Result<()> {
        if count > self.quantity {
            return Err(StoreError::InsufficientStock {
                name: self.name.clone(),
                requested: count,
                available: self.quantity,
            });
        }
        self.quantity -= count;
        Ok(())
    }

    pub(crate) fn restock_one(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Serialized catalog form: `name, price, quantity`.
    pub fn to_line(&self) -> String {
        format!("{}, {}, {}", self.name, self.price, self.quantity)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ${}", self.name, self.price)
    }
}

/// Display rounding applied to receipt figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Any remainder past the cent rounds up.
    #[default]
    Ceiling,
    HalfUp,
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ceiling" => Ok(RoundingMode::Ceiling),
            "half_up" => Ok(RoundingMode::HalfUp),
            other => Err(format!("unknown rounding mode '{}' (ceiling, half_up)", other)),
        }
    }
}

/// Whether checkout writes the catalog before or after emptying the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistOrder {
    /// A failed write leaves the cart untouched.
    #[default]
    PersistThenClear,
    /// The cart is emptied even when the write fails afterwards.
    ClearThenPersist,
}

impl FromStr for PersistOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "persist_then_clear" => Ok(PersistOrder::PersistThenClear),
            "clear_then_persist" => Ok(PersistOrder::ClearThenPersist),
            other => Err(format!(
                "unknown persist order '{}' (persist_then_clear, clear_then_persist)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptSummary {
    pub items: usize,
    pub subtotal: Decimal,
    pub sales_tax: Decimal,
    pub total: Decimal,
}

impl fmt::Display for ReceiptSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subtotal: ${}", self.subtotal)?;
        writeln!(f, "Sales Tax: ${}", self.sales_tax)?;
        write!(f, "Total: ${}", self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Nothing to buy; no file was written.
    EmptyCart,
    Completed {
        receipt: ReceiptSummary,
        output_path: PathBuf,
    },
}

impl CheckoutOutcome {
    pub fn receipt(&self) -> Option<&ReceiptSummary> {
        match self {
            CheckoutOutcome::EmptyCart => None,
            CheckoutOutcome::Completed { receipt, .. } => Some(receipt),
        }
    }
}
