use anyhow::Result;
use bookstore::domain::model::PersistOrder;
use bookstore::{
    BookId, Bookstore, CheckoutOutcome, FlatFileStore, Shell, StoreError, StoreSettings,
};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tempfile::TempDir;

const BOOKS: &str = "Dune, 19.99, 3\nEmma, 5.00, 1\nUlysses, 12.50, 0\n";

fn open_shop(dir: &Path, settings: StoreSettings) -> Result<Bookstore<FlatFileStore>> {
    let input = dir.join("Books.txt");
    std::fs::write(&input, BOOKS)?;
    let settings = StoreSettings {
        catalog_path: input,
        ..settings
    };
    let mut shop = Bookstore::new(FlatFileStore::new(), settings);
    shop.open_default()?;
    Ok(shop)
}

fn id(position: usize) -> BookId {
    BookId::from_position(position).unwrap()
}

#[test]
fn test_checkout_receipt_and_persisted_stock() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut shop = open_shop(temp_dir.path(), StoreSettings::default())?;

    shop.add_to_cart(id(1), 2)?;
    shop.add_to_cart(id(2), 1)?;
    let outcome = shop.checkout()?;

    let CheckoutOutcome::Completed { receipt, output_path } = outcome else {
        panic!("expected a completed checkout");
    };
    assert_eq!(receipt.subtotal, Decimal::from_str("44.98")?);
    assert_eq!(receipt.sales_tax, Decimal::from_str("3.15")?);
    assert_eq!(receipt.total, Decimal::from_str("48.13")?);
    assert_eq!(output_path, temp_dir.path().join("BooksOut.txt"));

    assert_eq!(
        std::fs::read_to_string(&output_path)?,
        "Dune, 19.99, 1\nEmma, 5.00, 0\nUlysses, 12.50, 0\n"
    );
    assert_eq!(std::fs::read_to_string(temp_dir.path().join("Books.txt"))?, BOOKS);
    assert!(shop.cart().is_empty());
    Ok(())
}

#[test]
fn test_empty_checkout_writes_no_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut shop = open_shop(temp_dir.path(), StoreSettings::default())?;

    assert_eq!(shop.checkout()?, CheckoutOutcome::EmptyCart);
    assert!(!temp_dir.path().join("BooksOut.txt").exists());
    Ok(())
}

#[test]
fn test_huge_price_is_refused_without_losing_stock() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("Books.txt");
    std::fs::write(&input, "Folio, 79228162514264337593543950335, 2\n")?;
    let settings = StoreSettings {
        catalog_path: input,
        ..StoreSettings::default()
    };
    let mut shop = Bookstore::new(FlatFileStore::new(), settings);
    shop.open_default()?;

    let err = shop.add_to_cart(id(1), 2).unwrap_err();

    assert!(matches!(err, StoreError::AmountOverflow { .. }));
    assert_eq!(shop.book(id(1)).unwrap().quantity(), 2);
    assert!(shop.cart().is_empty());
    Ok(())
}

#[test]
fn test_clear_restores_shelf_after_many_adds() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut shop = open_shop(temp_dir.path(), StoreSettings::default())?;
    let before = shop.catalog().clone();

    shop.add_to_cart(id(1), 1)?;
    shop.add_to_cart(id(2), 1)?;
    shop.add_to_cart(id(1), 2)?;
    assert!(shop.add_to_cart(id(3), 1).is_err());
    shop.clear_cart();

    assert_eq!(shop.catalog(), &before);
    assert_eq!(shop.cart().subtotal(), Decimal::ZERO);
    Ok(())
}

#[test]
fn test_failed_write_keeps_cart_by_default() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let settings = StoreSettings {
        output_path: Some(temp_dir.path().join("missing").join("Out.txt")),
        ..StoreSettings::default()
    };
    let mut shop = open_shop(temp_dir.path(), settings)?;
    shop.add_to_cart(id(1), 1)?;

    assert!(shop.checkout().is_err());
    assert_eq!(shop.cart().len(), 1);
    Ok(())
}

#[test]
fn test_failed_write_empties_cart_in_legacy_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let settings = StoreSettings {
        output_path: Some(temp_dir.path().join("missing").join("Out.txt")),
        persist_order: PersistOrder::ClearThenPersist,
        ..StoreSettings::default()
    };
    let mut shop = open_shop(temp_dir.path(), settings)?;
    shop.add_to_cart(id(1), 1)?;

    assert!(shop.checkout().is_err());
    assert!(shop.cart().is_empty());
    assert_eq!(shop.book(id(1)).map(|b| b.quantity()), Some(2));
    Ok(())
}

#[test]
fn test_shell_session() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let shop = open_shop(temp_dir.path(), StoreSettings::default())?;
    let script = "\
list
add 1 2
add 3
add 2
remove 1
add 1
cart
bogus
checkout
checkout
quit
list
";

    let mut shell = Shell::new(shop, Vec::new(), "Tim's Bookstore");
    shell.run(script.as_bytes())?;
    let (shop, out) = shell.into_parts();
    let out = String::from_utf8(out)?;

    assert!(out.contains("  1. Dune $19.99  (3 on hand)"));
    assert!(out.contains("  3. Ulysses $12.50  (out of stock)"));
    assert!(out.contains("Added 2 x Dune $19.99. Cart total $39.98."));
    assert!(out.contains("\"Ulysses\" is not in stock."));
    assert!(out.contains("Returned Dune $19.99. Cart total $24.99."));
    assert!(out.contains("Total: $44.98"));
    assert!(out.contains("unrecognised command 'bogus'"));
    assert!(out.contains("Subtotal: $44.98\nSales Tax: $3.15\nTotal: $48.13"));
    assert!(out.contains("Thanks for shopping Tim's Bookstore!"));
    assert!(out.contains("Your cart is empty."));
    // quit 之後的指令不執行
    assert_eq!(out.matches("Dune $19.99  (").count(), 1);

    assert_eq!(shop.book(id(1)).map(|b| b.quantity()), Some(1));
    Ok(())
}

#[test]
fn test_shell_json_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let shop = open_shop(temp_dir.path(), StoreSettings::default())?;

    let mut shell = Shell::new(shop, Vec::new(), "Shop").with_json(true);
    shell.run("list\nadd 2\ncheckout\ncheckout\n".as_bytes())?;
    let (_, out) = shell.into_parts();
    let lines: Vec<serde_json::Value> = String::from_utf8(out)?
        .lines()
        .filter(|l| l.starts_with('[') || l.starts_with('{'))
        .map(serde_json::from_str)
        .collect::<std::result::Result<_, _>>()?;

    assert_eq!(lines[0][0]["name"], "Dune");
    assert_eq!(lines[0][0]["price"], "19.99");
    assert_eq!(lines[0][1]["quantity"], 1);
    assert_eq!(lines[1]["total"], "5.35");
    assert_eq!(lines[2]["status"], "empty");
    Ok(())
}

#[test]
fn test_shell_open_bad_file_keeps_shelf() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let bad = temp_dir.path().join("Bad.txt");
    std::fs::write(&bad, "Dune, 8.99\n")?;
    let shop = open_shop(temp_dir.path(), StoreSettings::default())?;

    let mut shell = Shell::new(shop, Vec::new(), "Shop");
    shell.run(format!("add 1\nopen {}\ncart\n", bad.display()).as_bytes())?;
    let (shop, out) = shell.into_parts();
    let out = String::from_utf8(out)?;

    assert!(out.contains("malformed at line 1"));
    assert_eq!(shop.catalog().len(), 3);
    assert_eq!(shop.cart().len(), 1);
    Ok(())
}
