//! SQLite storage module for crawled datasets
//!
//! Each dataset is one document: a CSV blob plus the composite key fields it
//! was first stored under.

pub mod repository;
pub mod schema;

pub use repository::{DatasetDocument, DatasetRepository, DatasetStore, NewDataset};
