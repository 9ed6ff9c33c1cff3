//! Holt's linear method with a damped trend, on an uneven time axis.
//!
//! The trend is held per year. Between two observations `dt` years apart the
//! level advances by `trend · Σ φ^k` over the gap, the continuous analogue of
//! summing the damped increments of `dt` yearly steps.

use serde::{Deserialize, Serialize};

use super::{FitDiagnostic, FittedTrend, Point, diagnostic, std_dev};
use crate::FitError;

/// Smoothing weights for [`super::ModelKind::Damped`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DampedParams {
  /// Level smoothing, `0 < alpha <= 1`.
  pub alpha: f64,
  /// Trend smoothing, `0 < beta <= 1`.
  pub beta:  f64,
  /// Yearly trend damping, `0 < phi <= 1`; `1` is undamped Holt.
  pub phi:   f64,
}

impl Default for DampedParams {
  fn default() -> Self {
    Self {
      alpha: 0.8,
      beta:  0.2,
      phi:   0.9,
    }
  }
}

#[derive(Debug, Clone)]
pub(crate) struct DampedTrend {
  params:     DampedParams,
  /// Time of the last observation.
  t_last:     f64,
  level:      f64,
  trend:      f64,
  sigma:      f64,
  diagnostic: FitDiagnostic,
}

/// `Σ_{k=1..h} φ^k` extended to real `h`.
fn damped_sum(phi: f64, h: f64) -> f64 {
  if (phi - 1.0).abs() < 1e-12 {
    h
  } else {
    phi * (1.0 - phi.powf(h)) / (1.0 - phi)
  }
}

/// Merge points that share a time into their mean so every step has `dt > 0`.
fn collapse_ties(points: &[Point]) -> Vec<Point> {
  let mut out: Vec<(f64, f64, usize)> = Vec::with_capacity(points.len());
  for p in points {
    match out.last_mut() {
      Some((t, sum, count)) if (*t - p.t).abs() < 1e-9 => {
        *sum += p.value;
        *count += 1;
      }
      _ => out.push((p.t, p.value, 1)),
    }
  }
  out
    .into_iter()
    .map(|(t, sum, count)| Point::new(t, sum / count as f64))
    .collect()
}

impl DampedTrend {
  pub(crate) fn fit(
    points: &[Point],
    params: &DampedParams,
  ) -> Result<Self, FitError> {
    let in_range = |v: f64| v > 0.0 && v <= 1.0;
    if !(in_range(params.alpha) && in_range(params.beta) && in_range(params.phi))
    {
      return Err(FitError::Singular {
        detail: format!(
          "smoothing parameters out of range: alpha={} beta={} phi={}",
          params.alpha, params.beta, params.phi
        ),
      });
    }

    let points = collapse_ties(points);
    if points.len() < 2 {
      return Err(FitError::Singular {
        detail: "all observations share one date".to_string(),
      });
    }

    let mut level = points[0].value;
    let mut trend = (points[1].value - points[0].value) / (points[1].t - points[0].t);

    let mut actual = Vec::with_capacity(points.len() - 1);
    let mut fitted = Vec::with_capacity(points.len() - 1);
    for pair in points.windows(2) {
      let dt = pair[1].t - pair[0].t;
      let predicted = level + trend * damped_sum(params.phi, dt);
      actual.push(pair[1].value);
      fitted.push(predicted);

      let prev_level = level;
      level = params.alpha * pair[1].value + (1.0 - params.alpha) * predicted;
      trend = params.beta * (level - prev_level) / dt
        + (1.0 - params.beta) * params.phi.powf(dt) * trend;
    }

    if !level.is_finite() || !trend.is_finite() {
      return Err(FitError::NonFinite {
        what: "level or trend",
      });
    }

    let residuals: Vec<f64> =
      actual.iter().zip(&fitted).map(|(y, f)| y - f).collect();
    Ok(Self {
      params: *params,
      t_last: points[points.len() - 1].t,
      level,
      trend,
      sigma: std_dev(&residuals),
      diagnostic: FitDiagnostic {
        n_points: points.len(),
        ..diagnostic(&actual, &fitted)
      },
    })
  }
}

impl FittedTrend for DampedTrend {
  fn predict(&self, t: f64) -> f64 {
    let h = t - self.t_last;
    self.level + self.trend * damped_sum(self.params.phi, h)
  }

  /// Residual spread growing with the square root of the horizon in years.
  fn margin(&self, t: f64, z: f64) -> f64 {
    let h = (t - self.t_last).max(1.0);
    z * self.sigma * h.sqrt()
  }

  fn diagnostic(&self) -> FitDiagnostic { self.diagnostic }
}
