//! Flat-file codec for the financial-inclusion tables.
//!
//! Reads the unified table and the reference vocabulary into [`fi_core`]
//! types, writes the enriched table and derived artifacts, and keeps the
//! Markdown enrichment change log. Pure synchronous I/O.
//!
//! # Quick start
//!
//! ```no_run
//! use fi_table::{read_rows_from_path, read_vocabulary_from_path};
//!
//! let vocabulary = read_vocabulary_from_path("data/reference_codes.csv").unwrap();
//! let rows = read_rows_from_path("data/unified.csv").unwrap();
//! let loaded = fi_core::normalize(&rows, &vocabulary);
//! println!("{} records, {} rejected", loaded.dataset.len(), loaded.rejected.len());
//! ```

pub mod artifact;
pub mod changelog;
pub mod error;
mod reference;
mod unified;

pub use error::{Error, Result};
pub use reference::{read_vocabulary, read_vocabulary_from_path};
pub use unified::{
  COLUMNS, read_rows, read_rows_from_path, write_enriched,
  write_enriched_to_path,
};

#[cfg(test)]
mod tests;
