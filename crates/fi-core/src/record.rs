//! Record types: the typed rows of the unified table.
//!
//! Every row of the flat table carries a `record_type` discriminator. Here each
//! record type is its own struct, so the fields a variant needs are always
//! present and the fields it does not use cannot be set.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Unique record identifier, e.g. `OBS032`, `EVT011`, `IMP015`.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for RecordId {
  fn from(s: &str) -> Self { Self(s.to_string()) }
}

/// A code from the indicator vocabulary, e.g. `ACC_OWNERSHIP`.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IndicatorCode(pub String);

impl IndicatorCode {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for IndicatorCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for IndicatorCode {
  fn from(s: &str) -> Self { Self(s.to_string()) }
}

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Implements `as_str` and `FromStr` for a fieldless enum using the same
/// snake_case spelling that serde uses.
macro_rules! text_enum {
  ($ty:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
    impl $ty {
      pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

      pub fn as_str(self) -> &'static str {
        match self {
          $($ty::$variant => $text),+
        }
      }
    }

    impl FromStr for $ty {
      type Err = Error;

      fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
          $($text => Ok($ty::$variant),)+
          _ => Err(Error::UnknownVariant {
            field: $field,
            value: s.to_string(),
          }),
        }
      }
    }

    impl fmt::Display for $ty {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
      }
    }
  };
}

/// The discriminator column of the unified table.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
  Observation,
  Event,
  ImpactLink,
  Target,
}

text_enum!(RecordType, "record_type", {
  Observation => "observation",
  Event => "event",
  ImpactLink => "impact_link",
  Target => "target",
});

/// Reliability of the source a record came from.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
  High,
  Medium,
  Low,
}

text_enum!(Confidence, "confidence", {
  High => "high",
  Medium => "medium",
  Low => "low",
});

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
  ProductLaunch,
  Policy,
  Infrastructure,
  Milestone,
  MarketEntry,
}

text_enum!(EventCategory, "category", {
  ProductLaunch => "product_launch",
  Policy => "policy",
  Infrastructure => "infrastructure",
  Milestone => "milestone",
  MarketEntry => "market_entry",
});

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ImpactDirection {
  Positive,
  Negative,
  Neutral,
}

text_enum!(ImpactDirection, "impact_direction", {
  Positive => "positive",
  Negative => "negative",
  Neutral => "neutral",
});

impl ImpactDirection {
  /// `+1`, `-1` or `0`.
  pub fn sign(self) -> f64 {
    match self {
      Self::Positive => 1.0,
      Self::Negative => -1.0,
      Self::Neutral => 0.0,
    }
  }
}

/// Qualitative size of an expected effect.
///
/// Ordinal only (`Low < Medium < High`). Callers that need numbers supply
/// their own weight table.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ImpactMagnitude {
  Low,
  Medium,
  High,
}

text_enum!(ImpactMagnitude, "impact_magnitude", {
  Low => "low",
  Medium => "medium",
  High => "high",
});

// ─── Record variants ─────────────────────────────────────────────────────────

/// A measured indicator value at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
  pub id:               RecordId,
  pub confidence:       Confidence,
  pub indicator_code:   IndicatorCode,
  pub value_numeric:    f64,
  pub observation_date: NaiveDate,
  pub source_name:      Option<String>,
}

/// Something that happened in the market: a launch, a policy, a milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub id:          RecordId,
  pub confidence:  Confidence,
  pub category:    EventCategory,
  pub event_date:  NaiveDate,
  pub value_text:  Option<String>,
  pub source_name: Option<String>,
}

/// A modelled effect of an event on an indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactLink {
  pub id:                RecordId,
  pub confidence:        Confidence,
  /// The [`Event`] this link belongs to.
  pub parent_id:         RecordId,
  pub related_indicator: IndicatorCode,
  pub impact_direction:  ImpactDirection,
  pub impact_magnitude:  ImpactMagnitude,
  /// Months between the event and the expected change in the indicator.
  pub lag_months:        u32,
  pub source_name:       Option<String>,
}

/// An official policy goal. Used as a reference overlay, never for fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
  pub id:             RecordId,
  pub confidence:     Confidence,
  pub indicator_code: IndicatorCode,
  pub target_value:   f64,
  pub target_date:    NaiveDate,
  pub source_name:    Option<String>,
}

/// One row of the unified table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
pub enum Record {
  Observation(Observation),
  Event(Event),
  ImpactLink(ImpactLink),
  Target(Target),
}

impl Record {
  pub fn record_type(&self) -> RecordType {
    match self {
      Self::Observation(_) => RecordType::Observation,
      Self::Event(_) => RecordType::Event,
      Self::ImpactLink(_) => RecordType::ImpactLink,
      Self::Target(_) => RecordType::Target,
    }
  }

  pub fn id(&self) -> &RecordId {
    match self {
      Self::Observation(r) => &r.id,
      Self::Event(r) => &r.id,
      Self::ImpactLink(r) => &r.id,
      Self::Target(r) => &r.id,
    }
  }

  pub fn confidence(&self) -> Confidence {
    match self {
      Self::Observation(r) => r.confidence,
      Self::Event(r) => r.confidence,
      Self::ImpactLink(r) => r.confidence,
      Self::Target(r) => r.confidence,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enums_parse_case_insensitively() {
    assert_eq!(
      "Impact_Link".parse::<RecordType>().unwrap(),
      RecordType::ImpactLink
    );
    assert_eq!(" HIGH ".parse::<Confidence>().unwrap(), Confidence::High);
    assert_eq!(
      "market_entry".parse::<EventCategory>().unwrap(),
      EventCategory::MarketEntry
    );
  }

  #[test]
  fn unknown_variant_names_the_field() {
    let err = "sideways".parse::<ImpactDirection>().unwrap_err();
    let Error::UnknownVariant { field, value } = err else {
      panic!("expected UnknownVariant");
    };
    assert_eq!(field, "impact_direction");
    assert_eq!(value, "sideways");
  }

  #[test]
  fn magnitude_is_ordinal() {
    assert!(ImpactMagnitude::Low < ImpactMagnitude::Medium);
    assert!(ImpactMagnitude::Medium < ImpactMagnitude::High);
  }

  #[test]
  fn as_str_matches_serde_spelling() {
    for category in EventCategory::ALL {
      let json = serde_json::to_string(category).unwrap();
      assert_eq!(json, format!("\"{}\"", category.as_str()));
    }
  }

  #[test]
  fn display_honours_width() {
    assert_eq!(format!("{:<8}|", Confidence::High), "high    |");
    assert_eq!(format!("{:>12}", RecordType::Event), "       event");
  }
}
