// Presentation side: drives the bookstore one command at a time.

pub mod shell;

pub use shell::{Command, Shell};
