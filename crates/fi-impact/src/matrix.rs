//! Projection of impact links into an indicator → events matrix.

use std::collections::{BTreeMap, HashMap};

use chrono::{Months, NaiveDate};
use fi_core::{
  Dataset, Event, EventCategory, ImpactDirection, ImpactMagnitude,
  IndicatorCode, RecordId,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::MagnitudeScale;

// ─── Entries ─────────────────────────────────────────────────────────────────

/// One impact link joined with its parent event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactEntry {
  pub event_id:   RecordId,
  pub link_id:    RecordId,
  pub category:   EventCategory,
  pub direction:  ImpactDirection,
  pub magnitude:  ImpactMagnitude,
  pub lag_months: u32,
  pub event_date: NaiveDate,
}

impl ImpactEntry {
  /// The date the effect is expected to show up: `event_date + lag_months`.
  pub fn onset(&self) -> NaiveDate {
    self
      .event_date
      .checked_add_months(Months::new(self.lag_months))
      .unwrap_or(NaiveDate::MAX)
  }
}

/// Header of the impact matrix output table.
pub const MATRIX_COLUMNS: [&str; 7] = [
  "event_id",
  "indicator_code",
  "direction",
  "magnitude",
  "lag_months",
  "event_date",
  "category",
];

/// A flat row of the impact matrix output table.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixRow<'a> {
  pub event_id:       &'a str,
  pub indicator_code: &'a str,
  pub direction:      &'static str,
  pub magnitude:      &'static str,
  pub lag_months:     u32,
  pub event_date:     String,
  pub category:       &'static str,
}

// ─── Matrix ──────────────────────────────────────────────────────────────────

/// Impact links grouped by indicator, each group ordered by event date.
///
/// Several links from one event to one indicator are all kept; their effects
/// add up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpactMatrix {
  by_indicator: BTreeMap<IndicatorCode, Vec<ImpactEntry>>,
}

impl ImpactMatrix {
  pub fn build(dataset: &Dataset) -> Self {
    let events: HashMap<&RecordId, &Event> =
      dataset.events.iter().map(|e| (&e.id, e)).collect();

    let mut by_indicator: BTreeMap<IndicatorCode, Vec<ImpactEntry>> =
      BTreeMap::new();
    for link in &dataset.impact_links {
      let Some(event) = events.get(&link.parent_id) else {
        warn!(link = %link.id, parent = %link.parent_id, "impact link has no parent event, skipping");
        continue;
      };
      by_indicator
        .entry(link.related_indicator.clone())
        .or_default()
        .push(ImpactEntry {
          event_id:   event.id.clone(),
          link_id:    link.id.clone(),
          category:   event.category,
          direction:  link.impact_direction,
          magnitude:  link.impact_magnitude,
          lag_months: link.lag_months,
          event_date: event.event_date,
        });
    }

    // Stable: links on the same date keep table order.
    for entries in by_indicator.values_mut() {
      entries.sort_by_key(|e| e.event_date);
    }

    debug!(
      indicators = by_indicator.len(),
      links = dataset.impact_links.len(),
      "built impact matrix"
    );
    Self { by_indicator }
  }

  /// Entries for `code`, oldest event first. Empty when nothing links to it.
  pub fn for_indicator(&self, code: &IndicatorCode) -> &[ImpactEntry] {
    self
      .by_indicator
      .get(code)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  pub fn indicators(&self) -> impl Iterator<Item = &IndicatorCode> {
    self.by_indicator.keys()
  }

  /// Every entry, by indicator code then event date.
  pub fn entries(&self) -> impl Iterator<Item = (&IndicatorCode, &ImpactEntry)> {
    self
      .by_indicator
      .iter()
      .flat_map(|(code, entries)| entries.iter().map(move |e| (code, e)))
  }

  pub fn len(&self) -> usize {
    self.by_indicator.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  pub fn rows(&self) -> impl Iterator<Item = MatrixRow<'_>> {
    self.entries().map(|(code, e)| MatrixRow {
      event_id:       e.event_id.as_str(),
      indicator_code: code.as_str(),
      direction:      e.direction.as_str(),
      magnitude:      e.magnitude.as_str(),
      lag_months:     e.lag_months,
      event_date:     e.event_date.format("%Y-%m-%d").to_string(),
      category:       e.category.as_str(),
    })
  }

  /// Event × indicator table of summed signed weights (the association
  /// heat map). Events are ordered by date, then id.
  pub fn pivot(&self, scale: &MagnitudeScale) -> Pivot {
    let indicators: Vec<IndicatorCode> = self.indicators().cloned().collect();
    let mut cells: BTreeMap<(NaiveDate, RecordId), Vec<f64>> = BTreeMap::new();

    for (column, code) in indicators.iter().enumerate() {
      for e in self.for_indicator(code) {
        let row = cells
          .entry((e.event_date, e.event_id.clone()))
          .or_insert_with(|| vec![0.0; indicators.len()]);
        row[column] += scale.signed_weight(e.direction, e.magnitude);
      }
    }

    Pivot {
      indicators,
      rows: cells
        .into_iter()
        .map(|((_, event_id), weights)| (event_id, weights))
        .collect(),
    }
  }
}

/// See [`ImpactMatrix::pivot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot {
  pub indicators: Vec<IndicatorCode>,
  pub rows:       Vec<(RecordId, Vec<f64>)>,
}

#[cfg(test)]
mod tests {
  use fi_core::{Confidence, ImpactLink, Record};

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn event(id: &str, on: NaiveDate) -> Record {
    Record::Event(Event {
      id:          id.into(),
      confidence:  Confidence::High,
      category:    EventCategory::ProductLaunch,
      event_date:  on,
      value_text:  None,
      source_name: None,
    })
  }

  fn link(
    id: &str,
    parent: &str,
    indicator: &str,
    direction: ImpactDirection,
    magnitude: ImpactMagnitude,
    lag: u32,
  ) -> Record {
    Record::ImpactLink(ImpactLink {
      id:                id.into(),
      confidence:        Confidence::Medium,
      parent_id:         parent.into(),
      related_indicator: indicator.into(),
      impact_direction:  direction,
      impact_magnitude:  magnitude,
      lag_months:        lag,
      source_name:       None,
    })
  }

  fn dataset() -> Dataset {
    use ImpactDirection::*;
    use ImpactMagnitude::*;

    let mut ds = Dataset::new();
    ds.push(event("EVT_MPESA", date(2023, 8, 1)));
    ds.push(event("EVT_TELEBIRR", date(2021, 5, 11)));
    ds.push(link("IMP1", "EVT_MPESA", "ACC_OWNERSHIP", Positive, Medium, 12));
    ds.push(link("IMP2", "EVT_TELEBIRR", "ACC_OWNERSHIP", Positive, High, 24));
    ds.push(link("IMP3", "EVT_TELEBIRR", "USG_DIGITAL_PAYMENT", Positive, High, 6));
    ds.push(link("IMP4", "EVT_TELEBIRR", "USG_DIGITAL_PAYMENT", Negative, Low, 0));
    ds
  }

  #[test]
  fn entries_are_ordered_by_event_date() {
    let m = ImpactMatrix::build(&dataset());
    let ids: Vec<&str> = m
      .for_indicator(&"ACC_OWNERSHIP".into())
      .iter()
      .map(|e| e.event_id.as_str())
      .collect();
    assert_eq!(ids, ["EVT_TELEBIRR", "EVT_MPESA"]);
  }

  #[test]
  fn duplicate_event_indicator_links_are_kept() {
    let m = ImpactMatrix::build(&dataset());
    let entries = m.for_indicator(&"USG_DIGITAL_PAYMENT".into());
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].link_id.as_str(), "IMP3");
    assert_eq!(entries[1].link_id.as_str(), "IMP4");
  }

  #[test]
  fn indicator_without_links_is_empty() {
    let m = ImpactMatrix::build(&dataset());
    assert!(m.for_indicator(&"ACC_MM_ACCOUNTS".into()).is_empty());
  }

  #[test]
  fn every_entry_resolves_to_an_input_event() {
    let ds = dataset();
    let m = ImpactMatrix::build(&ds);
    assert_eq!(m.len(), ds.impact_links.len());
    for (_, entry) in m.entries() {
      let event = ds.event(&entry.event_id).expect("event exists");
      assert_eq!(event.event_date, entry.event_date);
    }
  }

  #[test]
  fn onset_adds_lag_months() {
    let m = ImpactMatrix::build(&dataset());
    let telebirr = &m.for_indicator(&"ACC_OWNERSHIP".into())[0];
    assert_eq!(telebirr.onset(), date(2023, 5, 11));
  }

  #[test]
  fn pivot_sums_signed_weights() {
    let m = ImpactMatrix::build(&dataset());
    let p = m.pivot(&MagnitudeScale::default());
    assert_eq!(p.indicators.len(), 2);
    let (first, weights) = &p.rows[0];
    assert_eq!(first.as_str(), "EVT_TELEBIRR");
    // ACC_OWNERSHIP: high positive; USG_DIGITAL_PAYMENT: high positive + low negative.
    assert_eq!(weights, &vec![3.0, 2.0]);
  }

  #[test]
  fn rows_flatten_in_indicator_order() {
    let m = ImpactMatrix::build(&dataset());
    let rows: Vec<_> = m.rows().collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].indicator_code, "ACC_OWNERSHIP");
    assert_eq!(rows[0].event_date, "2021-05-11");
    assert_eq!(rows[3].direction, "negative");
  }
}
