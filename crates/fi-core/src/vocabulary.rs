//! The reference vocabulary of indicator codes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::IndicatorCode;

/// The value domain of an indicator; forecasts are clipped to it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorUnit {
  /// A share in `[0, 100]`.
  #[default]
  Percent,
  /// A non-negative count (accounts, agents, transactions).
  Count,
}

impl IndicatorUnit {
  /// Clamp `value` into this unit's valid domain.
  pub fn clip(self, value: f64) -> f64 {
    match self {
      Self::Percent => value.clamp(0.0, 100.0),
      Self::Count => value.max(0.0),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDef {
  pub description: String,
  pub unit:        IndicatorUnit,
}

/// Known indicator codes plus descriptions for any other coded field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
  indicators: BTreeMap<IndicatorCode, IndicatorDef>,
  /// `(field, code)` → description, for fields other than indicators.
  other:      BTreeMap<(String, String), String>,
}

impl Vocabulary {
  pub fn new() -> Self { Self::default() }

  pub fn add_indicator(
    &mut self,
    code: IndicatorCode,
    description: impl Into<String>,
    unit: IndicatorUnit,
  ) {
    self.indicators.insert(
      code,
      IndicatorDef {
        description: description.into(),
        unit,
      },
    );
  }

  pub fn add_code(
    &mut self,
    field: impl Into<String>,
    code: impl Into<String>,
    description: impl Into<String>,
  ) {
    self
      .other
      .insert((field.into(), code.into()), description.into());
  }

  pub fn contains(&self, code: &IndicatorCode) -> bool {
    self.indicators.contains_key(code)
  }

  pub fn indicator(&self, code: &IndicatorCode) -> Option<&IndicatorDef> {
    self.indicators.get(code)
  }

  /// The unit of `code`, falling back to [`IndicatorUnit::Percent`].
  pub fn unit(&self, code: &IndicatorCode) -> IndicatorUnit {
    self
      .indicators
      .get(code)
      .map(|d| d.unit)
      .unwrap_or_default()
  }

  pub fn describe(&self, field: &str, code: &str) -> Option<&str> {
    self
      .other
      .get(&(field.to_string(), code.to_string()))
      .map(String::as_str)
  }

  pub fn indicators(
    &self,
  ) -> impl Iterator<Item = (&IndicatorCode, &IndicatorDef)> {
    self.indicators.iter()
  }

  pub fn len(&self) -> usize { self.indicators.len() }

  pub fn is_empty(&self) -> bool { self.indicators.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clip_respects_unit_domain() {
    assert_eq!(IndicatorUnit::Percent.clip(104.2), 100.0);
    assert_eq!(IndicatorUnit::Percent.clip(-3.0), 0.0);
    assert_eq!(IndicatorUnit::Count.clip(-3.0), 0.0);
    assert_eq!(IndicatorUnit::Count.clip(1.5e6), 1.5e6);
  }

  #[test]
  fn unknown_indicator_defaults_to_percent() {
    let mut vocab = Vocabulary::new();
    vocab.add_indicator(
      "ACC_MM_ACCOUNTS".into(),
      "Registered mobile money accounts",
      IndicatorUnit::Count,
    );
    assert_eq!(vocab.unit(&"ACC_MM_ACCOUNTS".into()), IndicatorUnit::Count);
    assert_eq!(vocab.unit(&"ACC_OWNERSHIP".into()), IndicatorUnit::Percent);
    assert!(!vocab.contains(&"ACC_OWNERSHIP".into()));
  }
}
