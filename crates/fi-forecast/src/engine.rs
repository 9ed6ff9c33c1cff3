//! Per-indicator forecasting over a whole dataset.

use chrono::NaiveDate;
use fi_core::{
  Dataset, IndicatorCode, IndicatorUnit, RecordId, Target, Vocabulary,
};
use fi_impact::{ImpactEntry, ImpactMatrix};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  FitError, IndicatorError, ImpactDeltas, year_fraction,
  adjust::adjustment,
  model::{DampedParams, FitDiagnostic, ModelKind, Point, z_score},
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
  pub model:            ModelKind,
  /// Forecast years; each is evaluated at 31 December.
  pub horizons:         Vec<i32>,
  /// Two-sided coverage of the `lower`/`upper` band.
  pub confidence_level: f64,
  pub damped:           DampedParams,
  pub deltas:           ImpactDeltas,
  /// Add event effects on top of the base trend.
  pub adjust:           bool,
}

impl Default for ForecastConfig {
  fn default() -> Self {
    Self {
      model:            ModelKind::default(),
      horizons:         vec![2025, 2026, 2027],
      confidence_level: 0.95,
      damped:           DampedParams::default(),
      deltas:           ImpactDeltas::default(),
      adjust:           true,
    }
  }
}

impl ForecastConfig {
  /// Horizon dates in ascending order, without duplicates. Each indicator is
  /// only forecast at the dates after its last observation.
  pub fn dates(&self) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = self
      .horizons
      .iter()
      .filter_map(|year| NaiveDate::from_ymd_opt(*year, 12, 31))
      .collect();
    dates.sort();
    dates.dedup();
    dates
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// One indicator at one forecast date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
  pub date:          NaiveDate,
  /// Trend value, clipped to the indicator's unit.
  pub base:          f64,
  /// `base` plus event effects, clipped to the indicator's unit.
  pub adjusted:      f64,
  pub lower:         f64,
  pub upper:         f64,
  /// Unclipped sum of event effects.
  pub adjustment:    f64,
  /// Impact links that contributed to `adjustment`.
  pub applied_links: Vec<RecordId>,
}

/// Distance from a policy target to the adjusted forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetGap {
  pub target_id:      RecordId,
  pub target_date:    NaiveDate,
  pub target_value:   f64,
  /// The first forecast date on or after the target date, else the last one.
  pub forecast_date:  NaiveDate,
  pub forecast_value: f64,
  /// `target_value - forecast_value`; positive means short of target.
  pub gap:            f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorForecast {
  pub indicator_code: IndicatorCode,
  pub unit:           IndicatorUnit,
  pub model:          ModelKind,
  pub diagnostic:     FitDiagnostic,
  pub last_observed:  NaiveDate,
  pub points:         Vec<ForecastPoint>,
  pub targets:        Vec<TargetGap>,
}

/// An indicator that produced no forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorIssue {
  pub indicator_code: IndicatorCode,
  pub error:          IndicatorError,
}

/// Everything one engine run produced, ordered by indicator code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastRun {
  pub series: Vec<IndicatorForecast>,
  pub issues: Vec<IndicatorIssue>,
}

/// Header of the forecast output table.
pub const FORECAST_COLUMNS: [&str; 8] = [
  "indicator_code",
  "date",
  "model",
  "base_estimate",
  "adjusted_estimate",
  "lower",
  "upper",
  "diagnostic",
];

/// A flat row of the forecast output table. Numbers are blank on failure rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow<'a> {
  pub indicator_code:    &'a str,
  pub date:              Option<String>,
  pub model:             &'static str,
  pub base_estimate:     Option<f64>,
  pub adjusted_estimate: Option<f64>,
  pub lower:             Option<f64>,
  pub upper:             Option<f64>,
  pub diagnostic:        String,
}

impl ForecastRun {
  pub fn forecast(&self, code: &IndicatorCode) -> Option<&IndicatorForecast> {
    self.series.iter().find(|s| &s.indicator_code == code)
  }

  pub fn issue(&self, code: &IndicatorCode) -> Option<&IndicatorIssue> {
    self.issues.iter().find(|i| &i.indicator_code == code)
  }

  pub fn target_gaps(
    &self,
  ) -> impl Iterator<Item = (&IndicatorCode, &TargetGap)> {
    self
      .series
      .iter()
      .flat_map(|s| s.targets.iter().map(move |g| (&s.indicator_code, g)))
  }

  /// Output table rows: one per forecast point, plus one blank row per
  /// indicator whose model failed to fit. Insufficient-data indicators are
  /// reported through [`ForecastRun::issues`] only.
  pub fn rows(&self, model: ModelKind) -> Vec<ForecastRow<'_>> {
    let mut rows: Vec<ForecastRow<'_>> = Vec::new();
    for forecast in &self.series {
      let diagnostic = forecast.diagnostic.to_string();
      for point in &forecast.points {
        rows.push(ForecastRow {
          indicator_code:    forecast.indicator_code.as_str(),
          date:              Some(point.date.format("%Y-%m-%d").to_string()),
          model:             forecast.model.as_str(),
          base_estimate:     Some(round(point.base)),
          adjusted_estimate: Some(round(point.adjusted)),
          lower:             Some(round(point.lower)),
          upper:             Some(round(point.upper)),
          diagnostic:        diagnostic.clone(),
        });
      }
    }
    for issue in &self.issues {
      if let IndicatorError::ModelFit { .. } = issue.error {
        rows.push(ForecastRow {
          indicator_code:    issue.indicator_code.as_str(),
          date:              None,
          model:             model.as_str(),
          base_estimate:     None,
          adjusted_estimate: None,
          lower:             None,
          upper:             None,
          diagnostic:        format!("{}: {}", issue.error.kind(), issue.error),
        });
      }
    }
    // Stable: each indicator's points stay in date order.
    rows.sort_by(|a, b| a.indicator_code.cmp(b.indicator_code));
    rows
  }
}

fn round(value: f64) -> f64 { (value * 10_000.0).round() / 10_000.0 }

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct ForecastEngine {
  config: ForecastConfig,
}

impl ForecastEngine {
  pub fn new(config: ForecastConfig) -> Self { Self { config } }

  /// Forecast every observed indicator in `dataset`.
  ///
  /// With no `matrix`, or with adjustment switched off, adjusted estimates
  /// equal the base.
  pub fn run(
    &self,
    dataset: &Dataset,
    vocabulary: &Vocabulary,
    matrix: Option<&ImpactMatrix>,
  ) -> ForecastRun {
    let dates = self.config.dates();
    let mut run = ForecastRun::default();

    for code in dataset.observed_indicators() {
      let entries = match matrix {
        Some(m) if self.config.adjust => m.for_indicator(code),
        _ => &[],
      };
      let targets: Vec<&Target> = dataset.targets_for(code).collect();

      match self.forecast_indicator(
        code,
        &dataset.series(code),
        vocabulary.unit(code),
        entries,
        &targets,
        &dates,
      ) {
        Ok(forecast) => {
          debug!(
            indicator = %code,
            diagnostic = %forecast.diagnostic,
            points = forecast.points.len(),
            "forecast fitted"
          );
          run.series.push(forecast);
        }
        Err(error) => {
          warn!(indicator = %code, %error, "indicator not forecast");
          run.issues.push(IndicatorIssue {
            indicator_code: code.clone(),
            error,
          });
        }
      }
    }

    info!(
      model = self.config.model.as_str(),
      forecast = run.series.len(),
      issues = run.issues.len(),
      "forecast run complete"
    );
    run
  }

  fn forecast_indicator(
    &self,
    code: &IndicatorCode,
    series: &[(NaiveDate, f64)],
    unit: IndicatorUnit,
    entries: &[ImpactEntry],
    targets: &[&Target],
    dates: &[NaiveDate],
  ) -> Result<IndicatorForecast, IndicatorError> {
    let Some(&(last_observed, _)) = series.last() else {
      return Err(IndicatorError::InsufficientData { points: 0 });
    };
    if series.len() < 2 {
      return Err(IndicatorError::InsufficientData {
        points: series.len(),
      });
    }

    let points: Vec<Point> = series
      .iter()
      .map(|(date, value)| Point::new(year_fraction(*date), *value))
      .collect();
    let fitted = self.config.model.fit(&points, &self.config.damped)?;
    let z = z_score(self.config.confidence_level);

    let skipped = dates.iter().filter(|d| **d <= last_observed).count();
    if skipped > 0 {
      warn!(
        indicator = %code,
        %last_observed,
        skipped,
        "horizon dates not after the last observation, skipping"
      );
    }

    let mut out = Vec::with_capacity(dates.len() - skipped);
    for &date in dates.iter().filter(|d| **d > last_observed) {
      let t = year_fraction(date);
      let raw = fitted.predict(t);
      let margin = fitted.margin(t, z);
      if !raw.is_finite() || !margin.is_finite() {
        return Err(FitError::NonFinite {
          what: "prediction",
        }
        .into());
      }

      let base = unit.clip(raw);
      let adj = adjustment(
        entries,
        &self.config.deltas,
        unit,
        base,
        last_observed,
        date,
      );
      if !adj.links.is_empty() {
        debug!(indicator = %code, %date, shift = adj.shift, links = adj.links.len(), "applied event effects");
      }

      out.push(ForecastPoint {
        date,
        base,
        adjusted: unit.clip(base + adj.shift),
        lower: unit.clip(raw - margin),
        upper: unit.clip(raw + margin),
        adjustment: adj.shift,
        applied_links: adj.links,
      });
    }

    let targets = targets
      .iter()
      .filter_map(|target| target_gap(target, &out))
      .collect();

    Ok(IndicatorForecast {
      indicator_code: code.clone(),
      unit,
      model: self.config.model,
      diagnostic: fitted.diagnostic(),
      last_observed,
      points: out,
      targets,
    })
  }
}

fn target_gap(target: &Target, points: &[ForecastPoint]) -> Option<TargetGap> {
  let point = points
    .iter()
    .find(|p| p.date >= target.target_date)
    .or_else(|| points.last())?;
  Some(TargetGap {
    target_id:      target.id.clone(),
    target_date:    target.target_date,
    target_value:   target.target_value,
    forecast_date:  point.date,
    forecast_value: point.adjusted,
    gap:            target.target_value - point.adjusted,
  })
}
