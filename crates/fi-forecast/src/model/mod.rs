//! Trend model families for short, irregularly spaced series.
//!
//! All families fit on `(t, value)` points where `t` is a fractional year, and
//! report the same [`FitDiagnostic`], so the engine can apply one family
//! uniformly across indicators and compare fits in the output.
//!
//! ## Families
//!
//! - [`ModelKind::Linear`]: ordinary least squares trend. Baseline.
//! - [`ModelKind::Logarithmic`]: linear in `ln(2 + t - t0)`; growth slows
//!   with time, which suits ownership rates approaching saturation.
//! - [`ModelKind::Damped`]: Holt's linear method with a damped trend, adapted
//!   to uneven spacing.

mod damped;
mod linear;

use serde::{Deserialize, Serialize};

pub use damped::DampedParams;
use damped::DampedTrend;
use linear::{LinearTrend, LogTrend};

use crate::FitError;

/// An observation on the continuous time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  pub t:     f64,
  pub value: f64,
}

impl Point {
  pub fn new(t: f64, value: f64) -> Self { Self { t, value } }
}

/// In-sample fit quality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitDiagnostic {
  /// Root mean squared residual, in the indicator's own unit.
  pub rmse:      f64,
  /// Coefficient of determination; `1.0` for a flat, perfectly fitted series.
  pub r_squared: f64,
  pub n_points:  usize,
}

impl std::fmt::Display for FitDiagnostic {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "rmse={:.3};r2={:.3};n={}",
      self.rmse, self.r_squared, self.n_points
    )
  }
}

/// A fitted model that can be evaluated anywhere on the time axis.
pub trait FittedTrend: Send + Sync {
  fn predict(&self, t: f64) -> f64;

  /// Half-width of the prediction interval at `t` for normal quantile `z`.
  fn margin(&self, t: f64, z: f64) -> f64;

  fn diagnostic(&self) -> FitDiagnostic;
}

/// The model family, chosen once per run.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
  #[default]
  Linear,
  Logarithmic,
  Damped,
}

impl ModelKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Linear => "linear",
      Self::Logarithmic => "logarithmic",
      Self::Damped => "damped",
    }
  }

  pub const ALL: [ModelKind; 3] = [Self::Linear, Self::Logarithmic, Self::Damped];

  /// Fit this family to `points`, which must be sorted by `t`.
  pub fn fit(
    self,
    points: &[Point],
    damped: &DampedParams,
  ) -> Result<Box<dyn FittedTrend>, FitError> {
    if points.len() < 2 {
      return Err(FitError::TooFewPoints {
        required: 2,
        actual:   points.len(),
      });
    }
    Ok(match self {
      Self::Linear => Box::new(LinearTrend::fit(points)?),
      Self::Logarithmic => Box::new(LogTrend::fit(points)?),
      Self::Damped => Box::new(DampedTrend::fit(points, damped)?),
    })
  }
}

impl std::str::FromStr for ModelKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    Self::ALL
      .into_iter()
      .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
      .or_else(|| s.eq_ignore_ascii_case("log").then_some(Self::Logarithmic))
      .ok_or_else(|| format!("unknown model `{s}` (linear, logarithmic, damped)"))
  }
}

impl std::fmt::Display for ModelKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Shared statistics ───────────────────────────────────────────────────────

/// Population standard deviation (divides by `n`).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
  if values.is_empty() {
    return 0.0;
  }
  let n = values.len() as f64;
  let mean = values.iter().sum::<f64>() / n;
  (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

pub(crate) fn diagnostic(actual: &[f64], fitted: &[f64]) -> FitDiagnostic {
  let n = actual.len();
  let residuals: Vec<f64> =
    actual.iter().zip(fitted).map(|(y, f)| y - f).collect();
  let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
  let mean = actual.iter().sum::<f64>() / n.max(1) as f64;
  let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();

  FitDiagnostic {
    rmse:      (ss_res / n.max(1) as f64).sqrt(),
    r_squared: if ss_tot > 1e-10 { 1.0 - ss_res / ss_tot } else { 1.0 },
    n_points:  n,
  }
}

/// Two-sided normal quantile for common confidence levels.
pub fn z_score(confidence_level: f64) -> f64 {
  if confidence_level >= 0.99 {
    2.576
  } else if confidence_level >= 0.95 {
    1.96
  } else if confidence_level >= 0.90 {
    1.645
  } else if confidence_level >= 0.80 {
    1.282
  } else {
    1.0
  }
}
