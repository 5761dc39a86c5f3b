use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Catalog file not found or unreadable: {}: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog line {line}: {reason}")]
    Format { line: u64, reason: String },

    #[error("Could not write catalog to {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    #[error("Insufficient stock for \"{name}\": requested {requested}, on hand {available}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("Invalid cart count {count}: at least one unit must be selected")]
    InvalidCount { count: u32 },

    #[error("No book at catalog position {position}")]
    UnknownBook { position: usize },

    #[error("Amount overflow while computing {context}")]
    AmountOverflow { context: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Storage,
    Data,
    Cart,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StoreError::NotFound { .. } | StoreError::Write { .. } | StoreError::IoError(_) => {
                ErrorCategory::Storage
            }
            StoreError::Format { .. } => ErrorCategory::Data,
            StoreError::InsufficientStock { .. }
            | StoreError::InvalidCount { .. }
            | StoreError::UnknownBook { .. }
            | StoreError::AmountOverflow { .. } => ErrorCategory::Cart,
            StoreError::ConfigValidationError { .. }
            | StoreError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 購物車操作失敗只影響單一指令
            ErrorCategory::Cart => ErrorSeverity::Low,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for an error that ends the session. `0` for errors
    /// that only warrant a warning.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StoreError::NotFound { path, .. } => {
                format!("Could not open the book database '{}'", path.display())
            }
            StoreError::Format { line, .. } => {
                format!("The book database is malformed at line {}", line)
            }
            StoreError::Write { path, .. } => {
                format!("Could not save the updated stock to '{}'", path.display())
            }
            StoreError::InsufficientStock {
                name, available, ..
            } if *available == 0 => format!("\"{}\" is not in stock.", name),
            StoreError::InsufficientStock {
                name, available, ..
            } => format!("Only {} of \"{}\" left in stock.", available, name),
            StoreError::InvalidCount { .. } => "Select at least one copy.".to_string(),
            StoreError::UnknownBook { position } => {
                format!("There is no book number {}", position)
            }
            StoreError::AmountOverflow { .. } => {
                "That would push the cart total past what can be priced.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Storage => "Check that the file exists and the directory is writable",
            ErrorCategory::Data => {
                "Each line must read '<name>, <price>, <quantity>' with a whole-number quantity"
            }
            ErrorCategory::Cart => "Pick a listed book and a count no larger than its stock",
            ErrorCategory::Configuration => "Fix the configuration value and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
