//! Error types for `fi-core`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A row that could not be admitted into the dataset.
///
/// `row_id` is the record id, or `line N` when the row has no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
  pub row_id: String,
  pub field:  &'static str,
  pub reason: String,
}

impl ValidationError {
  pub fn new(
    row_id: impl Into<String>,
    field: &'static str,
    reason: impl Into<String>,
  ) -> Self {
    Self {
      row_id: row_id.into(),
      field,
      reason: reason.into(),
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "row {}: field `{}`: {}", self.row_id, self.field, self.reason)
  }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(ValidationError),

  #[error("{count} rows rejected, first: {first}")]
  Rejected {
    count: usize,
    first: ValidationError,
  },

  #[error("unknown {field} value: {value:?}")]
  UnknownVariant { field: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
