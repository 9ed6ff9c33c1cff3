//! The pipeline stages behind each subcommand.
//!
//! Each stage takes the resolved [`PipelineConfig`] and returns typed results;
//! text output is rendered by [`crate::report`].

use std::{fs, path::{Path, PathBuf}};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use fi_core::{
  Addition, DatasetSummary, EnrichOutcome, IndicatorCode, Normalized, RawRow,
  ValidationError, Vocabulary,
};
use fi_forecast::{
  FORECAST_COLUMNS, ForecastEngine, ForecastRun, IndicatorIssue, ModelKind,
  ScenarioTable, TargetGap, scenario_paths,
};
use fi_impact::{ImpactMatrix, MATRIX_COLUMNS};
use fi_table::{artifact, changelog};
use serde::Serialize;
use tracing::{info, warn};

use crate::PipelineConfig;

/// The vocabulary plus the unified table, both as read and normalized.
pub struct Loaded {
  pub vocabulary: Vocabulary,
  /// Every row of the table, including the ones `normalized` rejected.
  pub rows:       Vec<RawRow>,
  pub normalized: Normalized,
}

pub fn load(config: &PipelineConfig) -> anyhow::Result<Loaded> {
  let vocabulary = fi_table::read_vocabulary_from_path(&config.reference)
    .with_context(|| format!("failed to read vocabulary {}", config.reference.display()))?;
  let rows = fi_table::read_rows_from_path(&config.data)
    .with_context(|| format!("failed to read unified table {}", config.data.display()))?;
  let normalized = fi_core::normalize(&rows, &vocabulary);

  info!(
    path = %config.data.display(),
    records = normalized.dataset.len(),
    rejected = normalized.rejected.len(),
    indicators = vocabulary.len(),
    "loaded unified table"
  );
  for error in &normalized.rejected {
    warn!(%error, "row rejected");
  }
  Ok(Loaded {
    vocabulary,
    rows,
    normalized,
  })
}

// ─── Enrichment ──────────────────────────────────────────────────────────────

/// Append the rows in `additions` to the loaded table, write the enriched
/// table, and record the change in the enrichment log.
///
/// The enriched table keeps every base row as it was read, rejected ones
/// included; only validated additions are appended.
pub fn enrich(
  config: &PipelineConfig,
  base: &Loaded,
  additions: &Path,
) -> anyhow::Result<EnrichOutcome> {
  let rows = fi_table::read_rows_from_path(additions)
    .with_context(|| format!("failed to read additions {}", additions.display()))?;
  let outcome = fi_core::enrich(&base.normalized.dataset, &rows, &base.vocabulary);

  let base_digest = changelog::table_digest(&base.rows, &[])?;
  let new_digest = changelog::table_digest(&base.rows, &outcome.appended)?;

  write_enriched(config, &base.rows, &outcome.appended)?;

  let source = additions.display().to_string();
  changelog::append(&config.changelog, &changelog::ChangeLogEntry {
    at: Utc::now(),
    source: &source,
    base_digest,
    new_digest,
    appended: &outcome.appended,
    rejected: &outcome.rejected,
  })
  .with_context(|| format!("failed to append to {}", config.changelog.display()))?;

  info!(
    appended = outcome.appended.len(),
    rejected = outcome.rejected.len(),
    path = %config.enriched_path().display(),
    "wrote enriched table"
  );
  Ok(outcome)
}

fn write_enriched(
  config: &PipelineConfig,
  base: &[RawRow],
  appended: &[Addition],
) -> anyhow::Result<()> {
  let target = config.enriched_path();
  create_parent(&target)?;
  fi_table::write_enriched_to_path(base, appended, &target)
    .with_context(|| format!("failed to write {}", target.display()))
}

// ─── Derived tables ──────────────────────────────────────────────────────────

pub fn write_matrix(matrix: &ImpactMatrix, path: &Path) -> anyhow::Result<usize> {
  create_parent(path)?;
  artifact::write_table_to_path(path, &MATRIX_COLUMNS, matrix.rows())
    .with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_forecast(
  run: &ForecastRun,
  model: ModelKind,
  path: &Path,
) -> anyhow::Result<usize> {
  create_parent(path)?;
  artifact::write_table_to_path(path, &FORECAST_COLUMNS, run.rows(model))
    .with_context(|| format!("failed to write {}", path.display()))
}

/// Header of the scenario output table.
pub const SCENARIO_COLUMNS: [&str; 4] = ["indicator_code", "scenario", "year", "value"];

#[derive(Serialize)]
struct ScenarioRow<'a> {
  indicator_code: &'a str,
  scenario:       &'a str,
  year:           i32,
  value:          f64,
}

pub fn scenarios(config: &PipelineConfig, loaded: &Loaded) -> Vec<ScenarioTable> {
  scenario_paths(&loaded.normalized.dataset, &loaded.vocabulary, &config.scenarios)
}

pub fn write_scenarios(tables: &[ScenarioTable], path: &Path) -> anyhow::Result<usize> {
  create_parent(path)?;
  let rows = tables.iter().flat_map(|table| {
    table.paths.iter().flat_map(move |(scenario, values)| {
      table.years.iter().zip(values).map(move |(year, value)| ScenarioRow {
        indicator_code: table.indicator_code.as_str(),
        scenario,
        year: *year,
        value: *value,
      })
    })
  });
  artifact::write_table_to_path(path, &SCENARIO_COLUMNS, rows)
    .with_context(|| format!("failed to write {}", path.display()))
}

// ─── Full run ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EnrichmentSummary {
  pub source:   PathBuf,
  pub appended: usize,
  pub rejected: Vec<ValidationError>,
}

#[derive(Debug, Serialize)]
pub struct TargetSummary {
  pub indicator_code: IndicatorCode,
  #[serde(flatten)]
  pub gap:            TargetGap,
}

/// Contents of `run_summary.json`.
#[derive(Debug, Serialize)]
pub struct RunSummary {
  pub generated_at:  DateTime<Utc>,
  pub model:         ModelKind,
  pub dataset:       DatasetSummary,
  pub rejected:      Vec<ValidationError>,
  pub enrichment:    Option<EnrichmentSummary>,
  pub impact_links:  usize,
  pub forecast_rows: usize,
  pub issues:        Vec<IndicatorIssue>,
  pub target_gaps:   Vec<TargetSummary>,
  pub outputs:       Vec<PathBuf>,
}

/// Load, optionally enrich, build the matrix, forecast, and write every
/// output under `config.output_dir`.
pub fn run(config: &PipelineConfig) -> anyhow::Result<RunSummary> {
  let loaded = load(config)?;

  let enrichment = match &config.additions {
    Some(additions) => Some((additions, enrich(config, &loaded, additions)?)),
    None => {
      write_enriched(config, &loaded.rows, &[])?;
      None
    }
  };
  let Loaded {
    vocabulary,
    normalized,
    ..
  } = loaded;
  let (dataset, enrichment) = match enrichment {
    Some((source, outcome)) => (outcome.dataset, Some(EnrichmentSummary {
      source:   source.clone(),
      appended: outcome.appended.len(),
      rejected: outcome.rejected,
    })),
    None => (normalized.dataset, None),
  };

  let matrix = ImpactMatrix::build(&dataset);
  let engine = ForecastEngine::new(config.forecast.clone());
  let forecast = engine.run(&dataset, &vocabulary, Some(&matrix));

  write_matrix(&matrix, &config.matrix_path())?;
  let forecast_rows =
    write_forecast(&forecast, config.forecast.model, &config.forecast_path())?;

  let summary = RunSummary {
    generated_at: Utc::now(),
    model: config.forecast.model,
    dataset: dataset.summary(),
    rejected: normalized.rejected,
    enrichment,
    impact_links: matrix.len(),
    forecast_rows,
    target_gaps: forecast
      .target_gaps()
      .map(|(code, gap)| TargetSummary {
        indicator_code: code.clone(),
        gap:            gap.clone(),
      })
      .collect(),
    issues: forecast.issues,
    outputs: vec![
      config.enriched_path(),
      config.matrix_path(),
      config.forecast_path(),
      config.summary_path(),
    ],
  };

  let json = serde_json::to_string_pretty(&summary)?;
  fs::write(config.summary_path(), json)
    .with_context(|| format!("failed to write {}", config.summary_path().display()))?;

  info!(
    output_dir = %config.output_dir.display(),
    forecast_rows,
    issues = summary.issues.len(),
    "pipeline run complete"
  );
  Ok(summary)
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  Ok(())
}
