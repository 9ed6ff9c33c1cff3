//! Error types for the fi-table codec.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to read {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed table: {0}")]
  Csv(#[from] csv::Error),

  #[error("table is missing required columns: {}", .0.join(", "))]
  MissingColumns(Vec<String>),

  #[error("invalid unit {unit:?} for code {code}")]
  InvalidUnit { code: String, unit: String },
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
