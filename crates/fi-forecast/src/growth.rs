//! Period-over-period growth of an observed series.

use chrono::NaiveDate;
use serde::Serialize;

use crate::year_fraction;

/// Change between two consecutive observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPeriod {
  pub start:        NaiveDate,
  pub end:          NaiveDate,
  /// Length of the period in years.
  pub years:        f64,
  pub start_value:  f64,
  pub end_value:    f64,
  /// `end_value - start_value`, in the indicator's unit.
  pub total_change: f64,
  /// `total_change` per year; `None` when both observations share a date.
  pub annual_rate:  Option<f64>,
}

/// Growth between each pair of neighbouring points of a date-sorted series.
pub fn growth_rates(series: &[(NaiveDate, f64)]) -> Vec<GrowthPeriod> {
  series
    .windows(2)
    .map(|pair| {
      let (start, start_value) = pair[0];
      let (end, end_value) = pair[1];
      let years = year_fraction(end) - year_fraction(start);
      let total_change = end_value - start_value;
      GrowthPeriod {
        start,
        end,
        years,
        start_value,
        end_value,
        total_change,
        annual_rate: (years > 0.0).then(|| total_change / years),
      }
    })
    .collect()
}
