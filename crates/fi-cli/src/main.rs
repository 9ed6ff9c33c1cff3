//! `fi`: financial-inclusion data and forecasting pipeline.
//!
//! # Usage
//!
//! ```text
//! fi validate --strict
//! fi summary --json
//! fi enrich additions.csv
//! fi matrix --pivot
//! fi forecast --model damped
//! fi run --config fi.toml
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fi_cli::{PipelineConfig, pipeline, report};
use fi_core::IndicatorCode;
use fi_forecast::{ForecastEngine, ModelKind};
use fi_impact::ImpactMatrix;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "fi", version, about = "Financial inclusion data and forecasting pipeline")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "fi.toml", global = true)]
  config: PathBuf,

  /// Unified table to read instead of the configured one.
  #[arg(long, global = true, value_name = "FILE")]
  data: Option<PathBuf>,

  /// Reference vocabulary to read instead of the configured one.
  #[arg(long, global = true, value_name = "FILE")]
  reference: Option<PathBuf>,

  /// Directory for written tables.
  #[arg(long, global = true, value_name = "DIR")]
  output_dir: Option<PathBuf>,

  /// Log at DEBUG instead of INFO (RUST_LOG still wins).
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Load and validate the unified table.
  Validate {
    /// Fail if any row is rejected.
    #[arg(long)]
    strict: bool,
  },
  /// Record counts, confidence mix, and observation date range.
  Summary {
    #[arg(long)]
    json: bool,
  },
  /// Append rows from a file to the unified table and log the change.
  Enrich {
    /// Rows in the unified table layout.
    additions: PathBuf,
  },
  /// Build the impact matrix.
  Matrix {
    /// Print the event × indicator weight table instead of writing the matrix.
    #[arg(long)]
    pivot: bool,
  },
  /// Forecast every observed indicator.
  Forecast {
    /// Model family: linear, logarithmic, or damped.
    #[arg(long)]
    model: Option<ModelKind>,
    /// Report base trends only.
    #[arg(long)]
    no_adjust: bool,
  },
  /// Fixed-rate growth paths from the latest observation.
  Scenarios {
    /// Last year of each path.
    #[arg(long)]
    until: Option<i32>,
  },
  /// Period-over-period growth of observed series.
  Growth {
    /// Only this indicator.
    indicator: Option<String>,
  },
  /// Run the whole pipeline and write every output.
  Run {
    /// Rows to append before forecasting.
    #[arg(long, value_name = "FILE")]
    additions: Option<PathBuf>,
  },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  // Flags override config file, which overrides defaults.
  let mut config = PipelineConfig::load(&cli.config)?;
  if let Some(data) = cli.data {
    config.data = data;
  }
  if let Some(reference) = cli.reference {
    config.reference = reference;
  }
  if let Some(output_dir) = cli.output_dir {
    config.output_dir = output_dir;
  }

  match cli.command {
    Command::Validate { strict } => validate(&config, strict),
    Command::Summary { json } => summary(&config, json),
    Command::Enrich { additions } => {
      let loaded = pipeline::load(&config)?;
      let outcome = pipeline::enrich(&config, &loaded, &additions)?;
      println!(
        "appended {} record(s), rejected {}; wrote {}",
        outcome.appended.len(),
        outcome.rejected.len(),
        config.enriched_path().display()
      );
      for error in &outcome.rejected {
        println!("  rejected {error}");
      }
      Ok(())
    }
    Command::Matrix { pivot } => matrix(&config, pivot),
    Command::Forecast { model, no_adjust } => {
      if let Some(model) = model {
        config.forecast.model = model;
      }
      if no_adjust {
        config.forecast.adjust = false;
      }
      forecast(&config)
    }
    Command::Scenarios { until } => {
      if let Some(until) = until {
        config.scenarios.until = until;
      }
      scenarios(&config)
    }
    Command::Growth { indicator } => growth(&config, indicator.map(IndicatorCode)),
    Command::Run { additions } => {
      if additions.is_some() {
        config.additions = additions;
      }
      let summary = pipeline::run(&config)?;
      for path in &summary.outputs {
        println!("wrote {}", path.display());
      }
      for issue in &summary.issues {
        println!("  {}: {}", issue.indicator_code, issue.error);
      }
      Ok(())
    }
  }
}

// ─── Subcommands ─────────────────────────────────────────────────────────────

fn validate(config: &PipelineConfig, strict: bool) -> anyhow::Result<()> {
  let loaded = pipeline::load(config)?;
  let records = loaded.normalized.dataset.len();
  let rejected = loaded.normalized.rejected.len();
  if strict {
    loaded
      .normalized
      .into_strict()
      .context("unified table failed strict validation")?;
  }
  println!("{records} record(s) accepted, {rejected} rejected");
  Ok(())
}

fn summary(config: &PipelineConfig, json: bool) -> anyhow::Result<()> {
  let loaded = pipeline::load(config)?;
  let dataset = &loaded.normalized.dataset;
  let summary = dataset.summary();
  if json {
    println!("{}", serde_json::to_string_pretty(&summary)?);
  } else {
    print!("{}", report::summary(&summary, dataset, &loaded.vocabulary));
  }
  Ok(())
}

fn matrix(config: &PipelineConfig, pivot: bool) -> anyhow::Result<()> {
  let loaded = pipeline::load(config)?;
  let matrix = ImpactMatrix::build(&loaded.normalized.dataset);

  if pivot {
    print!("{}", report::pivot(&matrix.pivot(&config.scale)));
    return Ok(());
  }

  let path = config.matrix_path();
  let rows = pipeline::write_matrix(&matrix, &path)?;
  println!("wrote {rows} matrix row(s) to {}", path.display());
  Ok(())
}

fn forecast(config: &PipelineConfig) -> anyhow::Result<()> {
  let loaded = pipeline::load(config)?;
  let dataset = &loaded.normalized.dataset;
  let matrix = ImpactMatrix::build(dataset);
  let run = ForecastEngine::new(config.forecast.clone()).run(
    dataset,
    &loaded.vocabulary,
    Some(&matrix),
  );

  let path = config.forecast_path();
  let rows = pipeline::write_forecast(&run, config.forecast.model, &path)?;
  print!("{}", report::forecast(&run, &loaded.vocabulary));
  println!("wrote {rows} forecast row(s) to {}", path.display());
  Ok(())
}

fn scenarios(config: &PipelineConfig) -> anyhow::Result<()> {
  let loaded = pipeline::load(config)?;
  let tables = pipeline::scenarios(config, &loaded);
  print!("{}", report::scenarios(&tables, &loaded.normalized.dataset));
  let path = config.scenario_path();
  let rows = pipeline::write_scenarios(&tables, &path)?;
  println!("wrote {rows} scenario row(s) to {}", path.display());
  Ok(())
}

fn growth(config: &PipelineConfig, only: Option<IndicatorCode>) -> anyhow::Result<()> {
  let loaded = pipeline::load(config)?;
  print!("{}", report::growth(&loaded.normalized.dataset, only.as_ref()));
  Ok(())
}
