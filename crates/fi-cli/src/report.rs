//! Plain-text renderings of pipeline results for the terminal.

use std::{collections::BTreeMap, fmt::Write as _};

use fi_core::{Dataset, DatasetSummary, IndicatorCode, Vocabulary};
use fi_forecast::{ForecastRun, ScenarioTable, growth_rates};

fn description<'a>(vocabulary: &'a Vocabulary, code: &IndicatorCode) -> &'a str {
  vocabulary
    .indicator(code)
    .map(|def| def.description.as_str())
    .unwrap_or("")
}

/// Record counts, confidence shares, indicator coverage, and events per
/// category.
pub fn summary(
  summary: &DatasetSummary,
  dataset: &Dataset,
  vocabulary: &Vocabulary,
) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "records: {}", summary.total_records);
  for (record_type, count) in &summary.by_record_type {
    let _ = writeln!(out, "  {record_type:<12} {count}");
  }

  let _ = writeln!(out, "confidence:");
  for (confidence, count) in &summary.by_confidence {
    let _ = writeln!(
      out,
      "  {confidence:<12} {count} ({:.1}%)",
      summary.confidence_share(*confidence)
    );
  }

  let observed = dataset.observed_indicators();
  let _ = writeln!(
    out,
    "indicators: {} observed, {} in reference",
    summary.unique_indicators,
    vocabulary.len()
  );
  for code in &observed {
    let _ = writeln!(out, "  {:<24} {}", code.as_str(), description(vocabulary, code));
  }
  let unobserved: Vec<&str> = vocabulary
    .indicators()
    .filter(|(code, _)| !observed.contains(code))
    .map(|(code, _)| code.as_str())
    .collect();
  if !unobserved.is_empty() {
    let _ = writeln!(out, "  no observations: {}", unobserved.join(", "));
  }

  if !dataset.events.is_empty() {
    let mut by_category: BTreeMap<&'static str, usize> = BTreeMap::new();
    for event in &dataset.events {
      *by_category.entry(event.category.as_str()).or_insert(0) += 1;
    }
    let _ = writeln!(out, "events:");
    for (category, count) in by_category {
      let label = vocabulary.describe("category", category).unwrap_or("");
      let _ = writeln!(out, "  {category:<16} {count} {label}");
    }
  }

  if let (Some(first), Some(last)) =
    (summary.first_observation, summary.last_observation)
  {
    let _ = writeln!(out, "observations: {first} to {last}");
  }
  out
}

pub fn forecast(run: &ForecastRun, vocabulary: &Vocabulary) -> String {
  let mut out = String::new();
  for series in &run.series {
    let _ = writeln!(
      out,
      "{} {} [{}]",
      series.indicator_code,
      description(vocabulary, &series.indicator_code),
      series.diagnostic
    );
    for point in &series.points {
      let _ = writeln!(
        out,
        "  {}  base {:>8.2}  adjusted {:>8.2}  [{:.2}, {:.2}]",
        point.date, point.base, point.adjusted, point.lower, point.upper
      );
    }
    for gap in &series.targets {
      let _ = writeln!(
        out,
        "  target {} by {}: {:.2} short at {}",
        gap.target_value, gap.target_date, gap.gap, gap.forecast_date
      );
    }
  }
  for issue in &run.issues {
    let _ = writeln!(out, "{}: {}", issue.indicator_code, issue.error);
  }
  out
}

/// Scenario paths, plus the year each scenario first meets each target of the
/// indicator.
pub fn scenarios(tables: &[ScenarioTable], dataset: &Dataset) -> String {
  let mut out = String::new();
  for table in tables {
    let _ = writeln!(
      out,
      "{} (last {} = {:.2})",
      table.indicator_code, table.last_observed, table.start_value
    );
    for (name, values) in &table.paths {
      let cells: Vec<String> = values.iter().map(|v| format!("{v:.2}")).collect();
      let _ = writeln!(out, "  {name:<12} {}", cells.join("  "));
    }
    for target in dataset.targets_for(&table.indicator_code) {
      let reached: Vec<String> = table
        .paths
        .keys()
        .map(|name| match table.reaches(name, target.target_value) {
          Some(year) => format!("{name} {year}"),
          None => format!("{name} not reached"),
        })
        .collect();
      let _ = writeln!(
        out,
        "  target {} by {}: {}",
        target.target_value,
        target.target_date,
        reached.join(", ")
      );
    }
  }
  out
}

pub fn growth(dataset: &Dataset, only: Option<&IndicatorCode>) -> String {
  let mut out = String::new();
  for code in dataset.observed_indicators() {
    if only.is_some_and(|only| only != code) {
      continue;
    }
    let _ = writeln!(out, "{code}");
    for period in growth_rates(&dataset.series(code)) {
      let annual = period
        .annual_rate
        .map_or_else(|| "n/a".to_string(), |rate| format!("{rate:+.2}/yr"));
      let _ = writeln!(
        out,
        "  {} → {}  {:.2} → {:.2}  ({:+.2}, {annual})",
        period.start, period.end, period.start_value, period.end_value, period.total_change
      );
    }
  }
  out
}

/// Pivot table of summed signed weights, one event per line.
pub fn pivot(pivot: &fi_impact::Pivot) -> String {
  let mut out = String::new();
  let header: Vec<&str> = pivot.indicators.iter().map(IndicatorCode::as_str).collect();
  let _ = writeln!(out, "event_id,{}", header.join(","));
  for (event_id, weights) in &pivot.rows {
    let cells: Vec<String> = weights.iter().map(|w| w.to_string()).collect();
    let _ = writeln!(out, "{event_id},{}", cells.join(","));
  }
  out
}
