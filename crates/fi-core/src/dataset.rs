//! The typed, partitioned dataset.
//!
//! Records are immutable once loaded. The only mutation is [`Dataset::push`],
//! which appends; existing records are never reordered or rewritten.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::record::{
  Confidence, Event, ImpactLink, IndicatorCode, Observation, Record, RecordId,
  RecordType, Target,
};

/// The four typed collections of the unified table, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
  pub observations: Vec<Observation>,
  pub events:       Vec<Event>,
  pub impact_links: Vec<ImpactLink>,
  pub targets:      Vec<Target>,
  /// Original row order as (collection, index) pairs.
  sequence:         Vec<(RecordType, usize)>,
}

impl Dataset {
  pub fn new() -> Self { Self::default() }

  /// Append a record to the collection for its type.
  pub fn push(&mut self, record: Record) {
    let slot = match record {
      Record::Observation(r) => {
        self.observations.push(r);
        (RecordType::Observation, self.observations.len() - 1)
      }
      Record::Event(r) => {
        self.events.push(r);
        (RecordType::Event, self.events.len() - 1)
      }
      Record::ImpactLink(r) => {
        self.impact_links.push(r);
        (RecordType::ImpactLink, self.impact_links.len() - 1)
      }
      Record::Target(r) => {
        self.targets.push(r);
        (RecordType::Target, self.targets.len() - 1)
      }
    };
    self.sequence.push(slot);
  }

  pub fn len(&self) -> usize { self.sequence.len() }

  pub fn is_empty(&self) -> bool { self.sequence.is_empty() }

  /// All records in the order they were added.
  pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
    self.sequence.iter().map(|&(kind, i)| match kind {
      RecordType::Observation => Record::Observation(self.observations[i].clone()),
      RecordType::Event => Record::Event(self.events[i].clone()),
      RecordType::ImpactLink => Record::ImpactLink(self.impact_links[i].clone()),
      RecordType::Target => Record::Target(self.targets[i].clone()),
    })
  }

  pub fn event(&self, id: &RecordId) -> Option<&Event> {
    self.events.iter().find(|e| &e.id == id)
  }

  /// Every record id in the dataset.
  pub fn ids(&self) -> BTreeSet<&RecordId> {
    self
      .observations
      .iter()
      .map(|r| &r.id)
      .chain(self.events.iter().map(|r| &r.id))
      .chain(self.impact_links.iter().map(|r| &r.id))
      .chain(self.targets.iter().map(|r| &r.id))
      .collect()
  }

  /// Indicator codes that have at least one observation, ascending.
  pub fn observed_indicators(&self) -> BTreeSet<&IndicatorCode> {
    self.observations.iter().map(|o| &o.indicator_code).collect()
  }

  /// The `(date, value)` series of one indicator, oldest first.
  ///
  /// Observations sharing a date keep their table order.
  pub fn series(&self, code: &IndicatorCode) -> Vec<(NaiveDate, f64)> {
    let mut points: Vec<(NaiveDate, f64)> = self
      .observations
      .iter()
      .filter(|o| &o.indicator_code == code)
      .map(|o| (o.observation_date, o.value_numeric))
      .collect();
    points.sort_by_key(|(date, _)| *date);
    points
  }

  pub fn targets_for<'a>(
    &'a self,
    code: &'a IndicatorCode,
  ) -> impl Iterator<Item = &'a Target> + 'a {
    self.targets.iter().filter(move |t| &t.indicator_code == code)
  }

  pub fn summary(&self) -> DatasetSummary {
    let mut by_record_type = BTreeMap::new();
    let mut by_confidence = BTreeMap::new();
    for record in self.records() {
      *by_record_type.entry(record.record_type()).or_insert(0) += 1;
      *by_confidence.entry(record.confidence()).or_insert(0) += 1;
    }
    let dates = self.observations.iter().map(|o| o.observation_date);

    DatasetSummary {
      total_records: self.len(),
      by_record_type,
      by_confidence,
      unique_indicators: self.observed_indicators().len(),
      first_observation: dates.clone().min(),
      last_observation: dates.max(),
    }
  }
}

/// Headline counts for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
  pub total_records:     usize,
  pub by_record_type:    BTreeMap<RecordType, usize>,
  pub by_confidence:     BTreeMap<Confidence, usize>,
  pub unique_indicators: usize,
  pub first_observation: Option<NaiveDate>,
  pub last_observation:  Option<NaiveDate>,
}

impl DatasetSummary {
  /// Share of records with the given confidence, in percent.
  pub fn confidence_share(&self, confidence: Confidence) -> f64 {
    if self.total_records == 0 {
      return 0.0;
    }
    let n = self.by_confidence.get(&confidence).copied().unwrap_or(0);
    n as f64 / self.total_records as f64 * 100.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::EventCategory;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn obs(id: &str, code: &str, value: f64, on: NaiveDate) -> Record {
    Record::Observation(Observation {
      id:               id.into(),
      confidence:       Confidence::High,
      indicator_code:   code.into(),
      value_numeric:    value,
      observation_date: on,
      source_name:      None,
    })
  }

  #[test]
  fn records_preserve_insertion_order_across_types() {
    let mut ds = Dataset::new();
    ds.push(obs("OBS1", "ACC_OWNERSHIP", 14.0, date(2011, 12, 31)));
    ds.push(Record::Event(Event {
      id:          "EVT1".into(),
      confidence:  Confidence::Medium,
      category:    EventCategory::ProductLaunch,
      event_date:  date(2021, 5, 11),
      value_text:  Some("Telebirr launch".into()),
      source_name: None,
    }));
    ds.push(obs("OBS2", "ACC_OWNERSHIP", 22.0, date(2014, 12, 31)));

    let ids: Vec<String> = ds.records().map(|r| r.id().to_string()).collect();
    assert_eq!(ids, ["OBS1", "EVT1", "OBS2"]);
    assert_eq!(ds.observations.len(), 2);
    assert_eq!(ds.events.len(), 1);
  }

  #[test]
  fn series_is_sorted_by_date() {
    let mut ds = Dataset::new();
    ds.push(obs("OBS2", "ACC_OWNERSHIP", 35.0, date(2017, 12, 31)));
    ds.push(obs("OBS1", "ACC_OWNERSHIP", 14.0, date(2011, 12, 31)));
    ds.push(obs("OBS3", "USG_DIGITAL_PAYMENT", 20.0, date(2021, 12, 31)));

    let series = ds.series(&"ACC_OWNERSHIP".into());
    assert_eq!(series, vec![(date(2011, 12, 31), 14.0), (date(2017, 12, 31), 35.0)]);
  }

  #[test]
  fn summary_counts_types_and_confidence() {
    let mut ds = Dataset::new();
    ds.push(obs("OBS1", "ACC_OWNERSHIP", 14.0, date(2011, 12, 31)));
    ds.push(obs("OBS2", "USG_DIGITAL_PAYMENT", 20.0, date(2021, 12, 31)));

    let summary = ds.summary();
    assert_eq!(summary.total_records, 2);
    assert_eq!(summary.by_record_type[&RecordType::Observation], 2);
    assert_eq!(summary.unique_indicators, 2);
    assert_eq!(summary.first_observation, Some(date(2011, 12, 31)));
    assert_eq!(summary.last_observation, Some(date(2021, 12, 31)));
    assert_eq!(summary.confidence_share(Confidence::High), 100.0);
  }
}
