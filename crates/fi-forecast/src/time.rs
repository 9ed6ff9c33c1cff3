use chrono::{Datelike, NaiveDate};

/// A date as a fractional year: `2024-07-02` → about `2024.5`.
///
/// Series are irregularly spaced (survey waves every three years, operator
/// reports every quarter), so models work on this continuous axis rather than
/// on observation indices.
pub fn year_fraction(date: NaiveDate) -> f64 {
  let days = if date.leap_year() { 366.0 } else { 365.0 };
  date.year() as f64 + date.ordinal0() as f64 / days
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn start_and_middle_of_year() {
    let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(year_fraction(jan1), 2024.0);
    let jul2 = NaiveDate::from_ymd_opt(2023, 7, 2).unwrap();
    assert!((year_fraction(jul2) - 2023.4986).abs() < 1e-3);
  }

  #[test]
  fn is_monotonic_across_year_end() {
    let dec31 = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let jan1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    assert!(year_fraction(dec31) < year_fraction(jan1));
  }
}
