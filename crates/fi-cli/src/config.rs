//! Pipeline configuration.
//!
//! Every field has a default, so the pipeline runs with no config file at all.
//! Values are layered: defaults, then `fi.toml`, then `FI_*` environment
//! variables (nested keys use `__`, e.g. `FI_FORECAST__MODEL=damped`), then
//! command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use fi_forecast::{ForecastConfig, ScenarioConfig};
use fi_impact::MagnitudeScale;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// The unified table.
  pub data:       PathBuf,
  /// The reference vocabulary.
  pub reference:  PathBuf,
  /// Rows to append to the unified table before a full run.
  pub additions:  Option<PathBuf>,
  pub output_dir: PathBuf,
  /// Markdown log every enrichment is appended to.
  pub changelog:  PathBuf,
  pub scale:      MagnitudeScale,
  pub forecast:   ForecastConfig,
  pub scenarios:  ScenarioConfig,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      data:       PathBuf::from("data/raw/ethiopia_fi_unified_data.csv"),
      reference:  PathBuf::from("data/raw/reference_codes.csv"),
      additions:  None,
      output_dir: PathBuf::from("data/processed"),
      changelog:  PathBuf::from("data_enrichment_log.md"),
      scale:      MagnitudeScale::default(),
      forecast:   ForecastConfig::default(),
      scenarios:  ScenarioConfig::default(),
    }
  }
}

impl PipelineConfig {
  /// Read `file` (if it exists) and the `FI_*` environment.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("FI")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("forecast.horizons"),
      )
      .build()
      .with_context(|| format!("failed to read config from {}", file.display()))?
      .try_deserialize()
      .context("failed to deserialise PipelineConfig")
  }

  pub fn enriched_path(&self) -> PathBuf {
    self.output_dir.join("ethiopia_fi_enriched.csv")
  }

  pub fn matrix_path(&self) -> PathBuf { self.output_dir.join("impact_matrix.csv") }

  pub fn forecast_path(&self) -> PathBuf { self.output_dir.join("forecasts.csv") }

  pub fn scenario_path(&self) -> PathBuf { self.output_dir.join("scenarios.csv") }

  pub fn summary_path(&self) -> PathBuf { self.output_dir.join("run_summary.json") }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use fi_forecast::ModelKind;

  use super::*;

  #[test]
  fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PipelineConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.forecast.horizons, vec![2025, 2026, 2027]);
    assert_eq!(cfg.forecast.model, ModelKind::Linear);
    assert_eq!(cfg.scenarios.growth.len(), 3);
  }

  #[test]
  fn file_overrides_nested_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fi.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
      file,
      r#"
output_dir = "out"

[forecast]
model    = "damped"
horizons = [2026, 2030]

[forecast.deltas]
high = 5.0

[scale]
high = 4.0
"#
    )
    .unwrap();

    let cfg = PipelineConfig::load(&path).unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("out"));
    assert_eq!(cfg.forecast.model, ModelKind::Damped);
    assert_eq!(cfg.forecast.horizons, vec![2026, 2030]);
    assert_eq!(cfg.forecast.deltas.high, 5.0);
    assert_eq!(cfg.forecast.deltas.low, 0.5);
    assert_eq!(cfg.scale.high, 4.0);
    assert_eq!(cfg.forecast_path(), PathBuf::from("out/forecasts.csv"));
  }
}
