use crate::core::bookstore::Bookstore;
use crate::domain::model::{Book, BookId, CheckoutOutcome};
use crate::domain::ports::CatalogStore;
use crate::utils::error::{Result, StoreError};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::str::FromStr;

const HELP: &str = "\
Commands:
  list               show the shelf
  cart               show the cart and running total
  add <n> [count]    put <count> copies of book <n> in the cart (default 1)
  remove <n>         put one copy of book <n> back on the shelf
  clear              empty the cart back onto the shelf
  checkout           buy everything in the cart
  open <path>        load another book database
  save               write the shelf to the output file
  help               this text
  quit               leave the store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Cart,
    Add { position: usize, count: u32 },
    Remove { position: usize },
    Clear,
    Checkout,
    Open(String),
    Save,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match (word.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("list" | "ls" | "stock", []) => Ok(Command::List),
            ("cart", []) => Ok(Command::Cart),
            ("add", [position]) => Ok(Command::Add {
                position: parse_number(position)?,
                count: 1,
            }),
            ("add", [position, count]) => Ok(Command::Add {
                position: parse_number(position)?,
                count: parse_number(count)?,
            }),
            ("remove" | "rm", [position]) => Ok(Command::Remove {
                position: parse_number(position)?,
            }),
            ("clear", []) => Ok(Command::Clear),
            ("checkout" | "buy", []) => Ok(Command::Checkout),
            ("open", _) if !rest.is_empty() => Ok(Command::Open(rest.to_string())),
            ("save", []) => Ok(Command::Save),
            ("help" | "?", _) => Ok(Command::Help),
            ("quit" | "exit", []) => Ok(Command::Quit),
            _ => Err(format!("unrecognised command '{}' (try 'help')", line)),
        }
    }
}

fn parse_number<T: FromStr>(text: &str) -> std::result::Result<T, String> {
    text.parse()
        .map_err(|_| format!("'{}' is not a whole number", text))
}

#[derive(Serialize)]
struct ShelfEntry<'a> {
    position: usize,
    #[serde(flatten)]
    book: &'a Book,
}

#[derive(Serialize)]
struct CartView<'a> {
    items: Vec<&'a str>,
    total: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end over a [`Bookstore`].
pub struct Shell<S: CatalogStore, W: Write> {
    shop: Bookstore<S>,
    out: W,
    title: String,
    json: bool,
}

impl<S: CatalogStore, W: Write> Shell<S, W> {
    pub fn new(shop: Bookstore<S>, out: W, title: impl Into<String>) -> Self {
        Self {
            shop,
            out,
            title: title.into(),
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn into_parts(self) -> (Bookstore<S>, W) {
        (self.shop, self.out)
    }

    /// Runs commands until `quit` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if self.execute(command)? == Flow::Quit {
                        break;
                    }
                }
                Err(message) => writeln!(self.out, "{}", message)?,
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<Flow> {
        tracing::debug!("Command: {:?}", command);
        let result = match command {
            Command::List => self.print_shelf(),
            Command::Cart => self.print_cart(),
            Command::Add { position, count } => self.add(position, count),
            Command::Remove { position } => self.remove(position),
            Command::Clear => self.clear(),
            Command::Checkout => self.checkout(),
            Command::Open(path) => self.open(&path),
            Command::Save => self.save(),
            Command::Help => writeln!(self.out, "{}", HELP).map_err(StoreError::from),
            Command::Quit => return Ok(Flow::Quit),
        };

        // 操作失敗只回報訊息，商店繼續營業
        match result {
            Ok(()) => Ok(Flow::Continue),
            Err(StoreError::IoError(e)) => Err(StoreError::IoError(e)),
            Err(e) => {
                self.report(e)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn report(&mut self, error: StoreError) -> Result<()> {
        tracing::warn!("{} ({:?})", error, error.category());
        writeln!(self.out, "{}", error.user_friendly_message())?;
        Ok(())
    }

    fn resolve(&self, position: usize) -> Result<BookId> {
        BookId::from_position(position)
            .filter(|id| self.shop.book(*id).is_some())
            .ok_or(StoreError::UnknownBook { position })
    }

    fn add(&mut self, position: usize, count: u32) -> Result<()> {
        let id = self.resolve(position)?;
        self.shop.add_to_cart(id, count)?;
        let label = self.book_label(id);
        let total = self.shop.cart().display_total();
        writeln!(self.out, "Added {} x {}. Cart total {}.", count, label, total)?;
        Ok(())
    }

    fn remove(&mut self, position: usize) -> Result<()> {
        let id = self.resolve(position)?;
        let label = self.book_label(id);
        if self.shop.remove_from_cart(id)? {
            let total = self.shop.cart().display_total();
            writeln!(self.out, "Returned {}. Cart total {}.", label, total)?;
        } else {
            writeln!(self.out, "{} is not in the cart.", label)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.shop.clear_cart();
        writeln!(self.out, "Cart cleared.")?;
        Ok(())
    }

    fn open(&mut self, path: &str) -> Result<()> {
        let titles = self.shop.open(path)?;
        writeln!(self.out, "Opened {} ({} titles).", path, titles)?;
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let path = self.shop.save_catalog()?;
        writeln!(self.out, "Stock written to {}.", path.display())?;
        Ok(())
    }

    fn checkout(&mut self) -> Result<()> {
        match self.shop.checkout()? {
            CheckoutOutcome::EmptyCart => {
                if self.json {
                    writeln!(self.out, "{}", serde_json::json!({ "status": "empty" }))?;
                } else {
                    writeln!(self.out, "Your cart is empty.")?;
                }
            }
            CheckoutOutcome::Completed {
                receipt,
                output_path,
            } => {
                if self.json {
                    serde_json::to_writer(&mut self.out, &receipt).map_err(std::io::Error::from)?;
                    writeln!(self.out)?;
                } else {
                    writeln!(self.out, "{}", receipt)?;
                    writeln!(self.out, "Thanks for shopping {}!", self.title)?;
                }
                tracing::info!("Stock written to {}", output_path.display());
            }
        }
        Ok(())
    }

    fn print_shelf(&mut self) -> Result<()> {
        if self.json {
            let entries: Vec<ShelfEntry> = self
                .shop
                .catalog()
                .iter()
                .map(|(id, book)| ShelfEntry {
                    position: id.position(),
                    book,
                })
                .collect();
            serde_json::to_writer(&mut self.out, &entries).map_err(std::io::Error::from)?;
            writeln!(self.out)?;
            return Ok(());
        }

        if self.shop.catalog().is_empty() {
            writeln!(self.out, "The shelf is empty.")?;
        }
        for (id, book) in self.shop.catalog().iter() {
            let stock = if book.is_in_stock() {
                format!("{} on hand", book.quantity())
            } else {
                "out of stock".to_string()
            };
            writeln!(self.out, "{:>3}. {}  ({})", id.position(), book, stock)?;
        }
        Ok(())
    }

    fn print_cart(&mut self) -> Result<()> {
        let catalog = self.shop.catalog();
        let items: Vec<&str> = self
            .shop
            .cart()
            .items()
            .iter()
            .filter_map(|id| catalog.get(*id).map(Book::name))
            .collect();
        let total = self.shop.cart().display_total();

        if self.json {
            serde_json::to_writer(&mut self.out, &CartView { items, total })
                .map_err(std::io::Error::from)?;
            writeln!(self.out)?;
            return Ok(());
        }

        if items.is_empty() {
            writeln!(self.out, "The cart is empty.")?;
        }
        for name in &items {
            writeln!(self.out, "  {}", name)?;
        }
        writeln!(self.out, "Total: {}", total)?;
        Ok(())
    }

    fn book_label(&self, id: BookId) -> String {
        self.shop
            .book(id)
            .map(ToString::to_string)
            .unwrap_or_else(|| id.to_string())
    }
}
