//! Event adjustments layered on top of a base trend.

use chrono::NaiveDate;
use fi_core::{ImpactMagnitude, IndicatorUnit, RecordId};
use fi_impact::ImpactEntry;
use serde::{Deserialize, Serialize};

/// Size of one event's effect, in percentage points, per magnitude tier.
///
/// For count indicators the same numbers are read as a percent of the base
/// estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactDeltas {
  pub low:    f64,
  pub medium: f64,
  pub high:   f64,
}

impl Default for ImpactDeltas {
  fn default() -> Self {
    Self {
      low:    0.5,
      medium: 1.5,
      high:   3.0,
    }
  }
}

impl ImpactDeltas {
  pub fn delta(&self, magnitude: ImpactMagnitude) -> f64 {
    match magnitude {
      ImpactMagnitude::Low => self.low,
      ImpactMagnitude::Medium => self.medium,
      ImpactMagnitude::High => self.high,
    }
  }
}

/// The summed effect of every link that qualifies for one forecast date.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Adjustment {
  /// Signed shift in the indicator's own unit.
  pub shift: f64,
  pub links: Vec<RecordId>,
}

/// Links whose onset falls after `last_observed` and on or before `date` each
/// contribute once. The history already reflects anything with an earlier
/// onset.
pub(crate) fn adjustment(
  entries: &[ImpactEntry],
  deltas: &ImpactDeltas,
  unit: IndicatorUnit,
  base: f64,
  last_observed: NaiveDate,
  date: NaiveDate,
) -> Adjustment {
  let mut out = Adjustment::default();
  for entry in entries {
    let onset = entry.onset();
    if onset <= last_observed || onset > date {
      continue;
    }
    let points = entry.direction.sign() * deltas.delta(entry.magnitude);
    out.shift += match unit {
      IndicatorUnit::Percent => points,
      IndicatorUnit::Count => base * points / 100.0,
    };
    out.links.push(entry.link_id.clone());
  }
  out
}

#[cfg(test)]
mod tests {
  use fi_core::{EventCategory, ImpactDirection};

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn entry(
    link: &str,
    direction: ImpactDirection,
    magnitude: ImpactMagnitude,
    event_date: NaiveDate,
    lag_months: u32,
  ) -> ImpactEntry {
    ImpactEntry {
      event_id: RecordId::from("EVT"),
      link_id: RecordId::from(link),
      category: EventCategory::ProductLaunch,
      direction,
      magnitude,
      lag_months,
      event_date,
    }
  }

  #[test]
  fn only_links_landing_in_the_window_count() {
    let entries = [
      // onset before the last observation: already in the data
      entry("L1", ImpactDirection::Positive, ImpactMagnitude::High, date(2021, 5, 1), 12),
      // onset 2025-06-01: in the window
      entry("L2", ImpactDirection::Positive, ImpactMagnitude::Medium, date(2024, 6, 1), 12),
      // onset 2028-01-01: after the forecast date
      entry("L3", ImpactDirection::Positive, ImpactMagnitude::High, date(2027, 1, 1), 12),
    ];
    let adj = adjustment(
      &entries,
      &ImpactDeltas::default(),
      IndicatorUnit::Percent,
      50.0,
      date(2024, 11, 30),
      date(2025, 12, 31),
    );
    assert_eq!(adj.shift, 1.5);
    assert_eq!(adj.links, vec![RecordId::from("L2")]);
  }

  #[test]
  fn directions_add_up() {
    let entries = [
      entry("L1", ImpactDirection::Positive, ImpactMagnitude::High, date(2025, 1, 1), 0),
      entry("L2", ImpactDirection::Negative, ImpactMagnitude::Low, date(2025, 2, 1), 0),
      entry("L3", ImpactDirection::Neutral, ImpactMagnitude::High, date(2025, 3, 1), 0),
    ];
    let adj = adjustment(
      &entries,
      &ImpactDeltas::default(),
      IndicatorUnit::Percent,
      50.0,
      date(2024, 12, 31),
      date(2025, 12, 31),
    );
    assert_eq!(adj.shift, 2.5);
    assert_eq!(adj.links.len(), 3);
  }

  #[test]
  fn count_indicators_scale_with_the_base() {
    let entries = [entry(
      "L1",
      ImpactDirection::Positive,
      ImpactMagnitude::High,
      date(2025, 1, 1),
      0,
    )];
    let adj = adjustment(
      &entries,
      &ImpactDeltas::default(),
      IndicatorUnit::Count,
      2_000.0,
      date(2024, 12, 31),
      date(2025, 12, 31),
    );
    assert_eq!(adj.shift, 60.0);
  }
}
