//! Forecast engine for indicator time series.
//!
//! For every observed indicator the engine fits one trend model family to the
//! history, projects it to the configured horizon dates, and optionally adds a
//! bounded bump for each impact-matrix event whose effect lands inside the
//! forecast window. Base and adjusted estimates are kept side by side.
//!
//! Indicators are processed independently: too little history or a failed fit
//! is recorded against that indicator and the run carries on.

mod adjust;
mod engine;
pub mod error;
mod growth;
pub mod model;
mod scenario;
mod time;

pub use adjust::ImpactDeltas;
pub use engine::{
  FORECAST_COLUMNS, ForecastConfig, ForecastEngine, ForecastPoint, ForecastRow,
  ForecastRun, IndicatorForecast, IndicatorIssue, TargetGap,
};
pub use error::{FitError, IndicatorError};
pub use growth::{GrowthPeriod, growth_rates};
pub use model::{DampedParams, FitDiagnostic, ModelKind, Point};
pub use scenario::{ScenarioConfig, ScenarioTable, scenario_paths};
pub use time::year_fraction;
