use crate::core::catalog::Catalog;
use crate::domain::model::Book;
use crate::domain::ports::CatalogStore;
use crate::utils::error::{Result, StoreError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Reads and writes catalogs as `name, price, quantity` lines.
///
/// Names cannot contain commas; there is no quoting or escaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatFileStore;

impl FlatFileStore {
    pub fn new() -> Self {
        Self
    }
}

impl CatalogStore for FlatFileStore {
    fn load(&self, path: &Path) -> Result<Catalog> {
        tracing::debug!("Opening catalog file {}", path.display());
        let file = File::open(path).map_err(|source| StoreError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let mut books = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| read_error(path, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            // 只有空白的行直接略過
            if record.len() == 1 && record[0].is_empty() {
                continue;
            }
            if record.len() != 3 {
                return Err(StoreError::Format {
                    line,
                    reason: format!(
                        "expected 3 fields (name, price, quantity), found {}",
                        record.len()
                    ),
                });
            }

            let book = Book::parse(&record[0], &record[1], &record[2])
                .map_err(|reason| StoreError::Format { line, reason })?;
            books.push(book);
        }

        tracing::info!("📚 Loaded {} books from {}", books.len(), path.display());
        Ok(Catalog::from_books(books).with_source(path))
    }

    fn save(&self, catalog: &Catalog, path: &Path) -> Result<()> {
        if let Some(source) = catalog.source() {
            if same_file(source, path) {
                return Err(StoreError::Write {
                    path: path.to_path_buf(),
                    reason: "refusing to overwrite the catalog's source file".to_string(),
                });
            }
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // 先寫暫存檔再改名，失敗時不會留下寫一半的輸出檔
        let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_error(path, e))?;
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            for book in catalog.books() {
                writeln!(writer, "{}", book.to_line()).map_err(|e| write_error(path, e))?;
            }
            writer.flush().map_err(|e| write_error(path, e))?;
        }
        staged
            .as_file()
            .sync_all()
            .map_err(|e| write_error(path, e))?;
        staged
            .persist(path)
            .map_err(|e| write_error(path, e.error))?;

        tracing::info!("💾 Saved {} books to {}", catalog.len(), path.display());
        Ok(())
    }
}

/// Default output name: the input's stem plus `suffix`, same extension and
/// directory (`Books.txt` becomes `BooksOut.txt`).
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}{}", stem, suffix);
    if let Some(ext) = input.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    input.with_file_name(name)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn read_error(path: &Path, err: csv::Error) -> StoreError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => StoreError::NotFound {
            path: path.to_path_buf(),
            source,
        },
        _ => StoreError::Format { line, reason },
    }
}

fn write_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Write {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
