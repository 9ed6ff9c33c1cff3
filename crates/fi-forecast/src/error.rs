//! Error types for `fi-forecast`.

use serde::Serialize;
use thiserror::Error;

/// Why a trend model could not be fitted.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FitError {
  #[error("need at least {required} points, got {actual}")]
  TooFewPoints { required: usize, actual: usize },

  #[error("singular design: {detail}")]
  Singular { detail: String },

  #[error("non-finite {what}")]
  NonFinite { what: &'static str },
}

/// A per-indicator failure. Never aborts the rest of a run.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorError {
  #[error("insufficient data: {points} observation(s), at least 2 required")]
  InsufficientData { points: usize },

  #[error("model fit failed: {source}")]
  ModelFit {
    #[from]
    source: FitError,
  },
}

impl IndicatorError {
  pub fn kind(&self) -> &'static str {
    match self {
      Self::InsufficientData { .. } => "insufficient_data",
      Self::ModelFit { .. } => "model_fit_error",
    }
  }
}
