// Adapters layer: concrete implementations for external systems.

pub mod flat_file;

pub use flat_file::{derive_output_path, FlatFileStore};
