//! Fixed-rate "what if" paths from the latest observation.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use fi_core::{Dataset, IndicatorCode, IndicatorUnit, Vocabulary};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
  /// Last year of every path.
  pub until:  i32,
  /// Annual change per scenario name. Percentage points for percent
  /// indicators, percent of the running value for counts.
  pub growth: BTreeMap<String, f64>,
}

impl Default for ScenarioConfig {
  fn default() -> Self {
    Self {
      until:  2027,
      growth: BTreeMap::from([
        ("optimistic".to_string(), 4.0),
        ("base".to_string(), 2.5),
        ("pessimistic".to_string(), 1.0),
      ]),
    }
  }
}

/// Scenario paths for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioTable {
  pub indicator_code: IndicatorCode,
  pub unit:           IndicatorUnit,
  pub last_observed:  NaiveDate,
  pub start_value:    f64,
  /// Years after the last observation, up to `until`.
  pub years:          Vec<i32>,
  /// One value per entry of `years`, per scenario.
  pub paths:          BTreeMap<String, Vec<f64>>,
}

impl ScenarioTable {
  /// The first year a scenario reaches `target`, if it does.
  pub fn reaches(&self, scenario: &str, target: f64) -> Option<i32> {
    let path = self.paths.get(scenario)?;
    self
      .years
      .iter()
      .zip(path)
      .find(|(_, value)| **value >= target)
      .map(|(year, _)| *year)
  }
}

/// Scenario paths for every observed indicator whose latest observation
/// predates `config.until`.
pub fn scenario_paths(
  dataset: &Dataset,
  vocabulary: &Vocabulary,
  config: &ScenarioConfig,
) -> Vec<ScenarioTable> {
  let mut tables = Vec::new();
  for code in dataset.observed_indicators() {
    let Some(&(last_observed, start_value)) = dataset.series(code).last()
    else {
      continue;
    };
    let years: Vec<i32> = (last_observed.year() + 1..=config.until).collect();
    if years.is_empty() {
      debug!(indicator = %code, "latest observation is past the scenario range");
      continue;
    }

    let unit = vocabulary.unit(code);
    let paths = config
      .growth
      .iter()
      .map(|(name, rate)| (name.clone(), path(unit, start_value, *rate, years.len())))
      .collect();
    tables.push(ScenarioTable {
      indicator_code: code.clone(),
      unit,
      last_observed,
      start_value,
      years,
      paths,
    });
  }
  tables
}

fn path(unit: IndicatorUnit, start: f64, rate: f64, steps: usize) -> Vec<f64> {
  let mut value = start;
  (0..steps)
    .map(|_| {
      value = unit.clip(match unit {
        IndicatorUnit::Percent => value + rate,
        IndicatorUnit::Count => value * (1.0 + rate / 100.0),
      });
      value
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use fi_core::{Confidence, Observation, Record};

  use super::*;

  fn dataset(code: &str, points: &[(i32, f64)]) -> Dataset {
    let mut ds = Dataset::new();
    for (i, (year, value)) in points.iter().enumerate() {
      ds.push(Record::Observation(Observation {
        id:               format!("OBS{i}").as_str().into(),
        confidence:       Confidence::High,
        indicator_code:   code.into(),
        value_numeric:    *value,
        observation_date: NaiveDate::from_ymd_opt(*year, 11, 30).unwrap(),
        source_name:      None,
      }));
    }
    ds
  }

  #[test]
  fn default_scenarios_from_latest_value() {
    let ds = dataset("ACC_OWNERSHIP", &[(2021, 46.0), (2024, 49.0)]);
    let tables = scenario_paths(&ds, &Vocabulary::new(), &ScenarioConfig::default());
    assert_eq!(tables.len(), 1);

    let t = &tables[0];
    assert_eq!(t.years, vec![2025, 2026, 2027]);
    assert_eq!(t.paths["optimistic"], vec![53.0, 57.0, 61.0]);
    assert_eq!(t.paths["base"], vec![51.5, 54.0, 56.5]);
    assert_eq!(t.paths["pessimistic"], vec![50.0, 51.0, 52.0]);
    assert_eq!(t.reaches("optimistic", 55.0), Some(2026));
    assert_eq!(t.reaches("pessimistic", 55.0), None);
  }

  #[test]
  fn percent_paths_cap_at_one_hundred() {
    let ds = dataset("USG_ACTIVE", &[(2024, 97.0)]);
    let tables = scenario_paths(&ds, &Vocabulary::new(), &ScenarioConfig::default());
    assert_eq!(tables[0].paths["optimistic"], vec![100.0, 100.0, 100.0]);
  }

  #[test]
  fn count_paths_grow_proportionally() {
    let mut vocab = Vocabulary::new();
    vocab.add_indicator("ACC_AGENTS".into(), "Agents", IndicatorUnit::Count);
    let ds = dataset("ACC_AGENTS", &[(2025, 1_000.0)]);
    let config = ScenarioConfig {
      growth: BTreeMap::from([("base".to_string(), 10.0)]),
      ..ScenarioConfig::default()
    };
    let tables = scenario_paths(&ds, &vocab, &config);
    let base = &tables[0].paths["base"];
    assert_eq!(tables[0].years, vec![2026, 2027]);
    assert!((base[0] - 1_100.0).abs() < 1e-9);
    assert!((base[1] - 1_210.0).abs() < 1e-9);
  }

  #[test]
  fn nothing_when_data_reaches_the_end_year() {
    let ds = dataset("ACC_OWNERSHIP", &[(2027, 60.0)]);
    assert!(scenario_paths(&ds, &Vocabulary::new(), &ScenarioConfig::default()).is_empty());
  }
}
