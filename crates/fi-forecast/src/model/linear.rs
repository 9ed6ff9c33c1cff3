//! Least-squares trends: plain linear and log-time.

use super::{FitDiagnostic, FittedTrend, Point, diagnostic, std_dev};
use crate::FitError;

/// `value = mean + slope · (t - t_mean)`, fitted by OLS.
#[derive(Debug, Clone)]
pub(crate) struct LinearTrend {
  t_mean:     f64,
  y_mean:     f64,
  slope:      f64,
  /// Σ (t - t_mean)²
  sxx:        f64,
  /// Standard deviation of the residuals.
  sigma:      f64,
  diagnostic: FitDiagnostic,
}

impl LinearTrend {
  pub(crate) fn fit(points: &[Point]) -> Result<Self, FitError> {
    let n = points.len() as f64;
    let t_mean = points.iter().map(|p| p.t).sum::<f64>() / n;
    let y_mean = points.iter().map(|p| p.value).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|p| (p.t - t_mean).powi(2)).sum();
    let sxy: f64 = points
      .iter()
      .map(|p| (p.t - t_mean) * (p.value - y_mean))
      .sum();

    if sxx < 1e-12 {
      return Err(FitError::Singular {
        detail: "all observations share one date".to_string(),
      });
    }
    let slope = sxy / sxx;
    if !slope.is_finite() || !y_mean.is_finite() {
      return Err(FitError::NonFinite {
        what: "trend coefficients",
      });
    }

    let actual: Vec<f64> = points.iter().map(|p| p.value).collect();
    let fitted: Vec<f64> = points
      .iter()
      .map(|p| y_mean + slope * (p.t - t_mean))
      .collect();
    let residuals: Vec<f64> =
      actual.iter().zip(&fitted).map(|(y, f)| y - f).collect();

    Ok(Self {
      t_mean,
      y_mean,
      slope,
      sxx,
      sigma: std_dev(&residuals),
      diagnostic: diagnostic(&actual, &fitted),
    })
  }

  #[cfg(test)]
  pub(crate) fn slope(&self) -> f64 { self.slope }
}

impl FittedTrend for LinearTrend {
  fn predict(&self, t: f64) -> f64 { self.y_mean + self.slope * (t - self.t_mean) }

  fn margin(&self, t: f64, z: f64) -> f64 {
    let n = self.diagnostic.n_points as f64;
    z * self.sigma
      * (1.0 + 1.0 / n + (t - self.t_mean).powi(2) / self.sxx).sqrt()
  }

  fn diagnostic(&self) -> FitDiagnostic { self.diagnostic }
}

/// Linear in `ln(2 + t - t0)`, where `t0` is the first observation.
///
/// Equal steps in time add ever smaller increments, a simple stand-in for
/// diminishing returns as an indicator approaches saturation.
#[derive(Debug, Clone)]
pub(crate) struct LogTrend {
  t0:    f64,
  inner: LinearTrend,
}

impl LogTrend {
  fn axis(t0: f64, t: f64) -> f64 { (t - t0 + 1.0).ln_1p() }

  pub(crate) fn fit(points: &[Point]) -> Result<Self, FitError> {
    let t0 = points
      .iter()
      .map(|p| p.t)
      .fold(f64::INFINITY, f64::min);
    let transformed: Vec<Point> = points
      .iter()
      .map(|p| Point::new(Self::axis(t0, p.t), p.value))
      .collect();
    Ok(Self {
      t0,
      inner: LinearTrend::fit(&transformed)?,
    })
  }
}

impl FittedTrend for LogTrend {
  fn predict(&self, t: f64) -> f64 { self.inner.predict(Self::axis(self.t0, t)) }

  fn margin(&self, _t: f64, z: f64) -> f64 { z * self.inner.sigma }

  fn diagnostic(&self) -> FitDiagnostic { self.inner.diagnostic }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Account ownership, Findex waves 2011–2024.
  fn ownership() -> Vec<Point> {
    [(2011.0, 14.0), (2014.0, 22.0), (2017.0, 35.0), (2021.0, 46.0), (2024.0, 49.0)]
      .into_iter()
      .map(|(t, v)| Point::new(t, v))
      .collect()
  }

  #[test]
  fn exact_line_is_recovered() {
    let points: Vec<Point> =
      (0..5).map(|i| Point::new(2010.0 + i as f64, 10.0 + 2.0 * i as f64)).collect();
    let m = LinearTrend::fit(&points).unwrap();
    assert!((m.slope() - 2.0).abs() < 1e-9);
    assert!((m.predict(2015.0) - 20.0).abs() < 1e-9);
    assert!(m.diagnostic().rmse < 1e-9);
    assert!((m.diagnostic().r_squared - 1.0).abs() < 1e-9);
    assert!(m.margin(2015.0, 1.96) < 1e-9);
  }

  #[test]
  fn ownership_slope_is_about_three_points_a_year() {
    let m = LinearTrend::fit(&ownership()).unwrap();
    assert!(m.slope() > 2.5 && m.slope() < 3.0, "slope {}", m.slope());
    assert!(m.diagnostic().r_squared > 0.9);
  }

  #[test]
  fn margin_widens_away_from_the_data() {
    let m = LinearTrend::fit(&ownership()).unwrap();
    assert!(m.margin(2027.0, 1.96) > m.margin(2025.0, 1.96));
  }

  #[test]
  fn repeated_date_is_singular() {
    let points = [Point::new(2021.0, 46.0), Point::new(2021.0, 47.0)];
    assert!(matches!(
      LinearTrend::fit(&points),
      Err(FitError::Singular { .. })
    ));
  }

  #[test]
  fn log_trend_grows_more_slowly_than_linear() {
    let lin = LinearTrend::fit(&ownership()).unwrap();
    let log = LogTrend::fit(&ownership()).unwrap();
    let lin_step = lin.predict(2027.0) - lin.predict(2026.0);
    let log_step = log.predict(2027.0) - log.predict(2026.0);
    assert!(log_step > 0.0);
    assert!(log_step < lin_step);
  }
}
