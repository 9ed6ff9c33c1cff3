//! Explicit numeric weights for ordinal impact magnitudes.

use fi_core::{ImpactDirection, ImpactMagnitude};
use serde::{Deserialize, Serialize};

/// Weight per magnitude tier. The default is `low = 1, medium = 2, high = 3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnitudeScale {
  pub low:    f64,
  pub medium: f64,
  pub high:   f64,
}

impl Default for MagnitudeScale {
  fn default() -> Self {
    Self {
      low:    1.0,
      medium: 2.0,
      high:   3.0,
    }
  }
}

impl MagnitudeScale {
  pub fn weight(&self, magnitude: ImpactMagnitude) -> f64 {
    match magnitude {
      ImpactMagnitude::Low => self.low,
      ImpactMagnitude::Medium => self.medium,
      ImpactMagnitude::High => self.high,
    }
  }

  /// Weight with the direction's sign applied; neutral links weigh zero.
  pub fn signed_weight(
    &self,
    direction: ImpactDirection,
    magnitude: ImpactMagnitude,
  ) -> f64 {
    direction.sign() * self.weight(magnitude)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_scale_is_one_two_three() {
    let s = MagnitudeScale::default();
    assert_eq!(s.weight(ImpactMagnitude::Low), 1.0);
    assert_eq!(s.weight(ImpactMagnitude::Medium), 2.0);
    assert_eq!(s.weight(ImpactMagnitude::High), 3.0);
  }

  #[test]
  fn direction_sets_sign() {
    let s = MagnitudeScale::default();
    assert_eq!(
      s.signed_weight(ImpactDirection::Negative, ImpactMagnitude::High),
      -3.0
    );
    assert_eq!(
      s.signed_weight(ImpactDirection::Neutral, ImpactMagnitude::High),
      0.0
    );
  }
}
