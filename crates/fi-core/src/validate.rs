//! Row validation: raw table rows → typed records.
//!
//! Pipeline:
//!   &[RawRow]
//!     └─ parse_row()        → Record (field-level checks, vocabulary)
//!          └─ duplicate ids → rejected
//!               └─ resolve impact_link.parent_id against accepted events
//!
//! A rejected row produces exactly one [`ValidationError`] and never stops the
//! remaining rows from being admitted.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::{
  Dataset, Error, RawRow, Result, ValidationError, Vocabulary,
  record::{
    Confidence, Event, EventCategory, ImpactDirection, ImpactLink,
    ImpactMagnitude, IndicatorCode, Observation, Record, RecordId, RecordType,
    Target,
  },
};

// ─── Public API ──────────────────────────────────────────────────────────────

/// The outcome of normalizing a table: admitted records plus rejections.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
  pub dataset:  Dataset,
  pub rejected: Vec<ValidationError>,
}

impl Normalized {
  /// Return the dataset only if every row was admitted.
  pub fn into_strict(self) -> Result<Dataset> {
    let count = self.rejected.len();
    match self.rejected.into_iter().next() {
      None => Ok(self.dataset),
      Some(first) if count == 1 => Err(Error::Validation(first)),
      Some(first) => Err(Error::Rejected { count, first }),
    }
  }
}

/// Partition `rows` into a typed [`Dataset`], validating codes, dates and
/// references.
pub fn normalize(rows: &[RawRow], vocabulary: &Vocabulary) -> Normalized {
  let (accepted, rejected) = admit(&Dataset::new(), rows, vocabulary);
  let mut dataset = Dataset::new();
  for (_, record) in accepted {
    dataset.push(record);
  }
  debug!(
    admitted = dataset.len(),
    rejected = rejected.len(),
    "normalized unified table"
  );
  Normalized { dataset, rejected }
}

/// Validate `rows` as additions to `base`.
///
/// Ids must be unique across `base` and the new rows; impact links may point
/// at events in either. Returns the admitted records in row order, each paired
/// with the index of the row it came from.
pub(crate) fn admit(
  base: &Dataset,
  rows: &[RawRow],
  vocabulary: &Vocabulary,
) -> (Vec<(usize, Record)>, Vec<ValidationError>) {
  let mut seen: HashSet<RecordId> = base.ids().into_iter().cloned().collect();
  let mut parsed: Vec<std::result::Result<Record, ValidationError>> =
    Vec::with_capacity(rows.len());

  for row in rows {
    let result = parse_row(row, vocabulary).and_then(|record| {
      if seen.insert(record.id().clone()) {
        Ok(record)
      } else {
        Err(ValidationError::new(row.label(), "id", "duplicate record id"))
      }
    });
    parsed.push(result);
  }

  let events: HashSet<RecordId> = base
    .events
    .iter()
    .map(|e| e.id.clone())
    .chain(parsed.iter().filter_map(|r| match r {
      Ok(Record::Event(e)) => Some(e.id.clone()),
      _ => None,
    }))
    .collect();

  let mut accepted = Vec::new();
  let mut rejected = Vec::new();
  for (index, result) in parsed.into_iter().enumerate() {
    match result {
      Ok(Record::ImpactLink(link)) if !events.contains(&link.parent_id) => {
        rejected.push(ValidationError::new(
          link.id.to_string(),
          "parent_id",
          format!("{} does not resolve to an event", link.parent_id),
        ));
      }
      Ok(record) => accepted.push((index, record)),
      Err(e) => rejected.push(e),
    }
  }
  (accepted, rejected)
}

// ─── Row parser ──────────────────────────────────────────────────────────────

type RowResult<T> = std::result::Result<T, ValidationError>;

fn parse_row(row: &RawRow, vocabulary: &Vocabulary) -> RowResult<Record> {
  let label = row.label();
  let cx = Cx { label: &label };

  let record_type: RecordType = cx
    .required("record_type", &row.record_type)?
    .parse()
    .map_err(|e: Error| cx.error("record_type", e.to_string()))?;
  let id = RecordId(cx.required("id", &row.id)?.to_string());
  let confidence: Confidence = cx.parsed("confidence", &row.confidence)?;
  let source_name = row.source_name.clone();

  let record = match record_type {
    RecordType::Observation => Record::Observation(Observation {
      id,
      confidence,
      indicator_code: cx.indicator(
        "indicator_code",
        &row.indicator_code,
        vocabulary,
      )?,
      value_numeric: cx.number("value_numeric", &row.value_numeric)?,
      observation_date: cx.date("observation_date", &row.observation_date)?,
      source_name,
    }),
    RecordType::Event => Record::Event(Event {
      id,
      confidence,
      category: cx.parsed::<EventCategory>("category", &row.category)?,
      event_date: cx.date("event_date", &row.event_date)?,
      value_text: row.value_text.clone(),
      source_name,
    }),
    RecordType::ImpactLink => Record::ImpactLink(ImpactLink {
      id,
      confidence,
      parent_id: RecordId(cx.required("parent_id", &row.parent_id)?.to_string()),
      related_indicator: cx.indicator(
        "related_indicator",
        &row.related_indicator,
        vocabulary,
      )?,
      impact_direction: cx
        .parsed::<ImpactDirection>("impact_direction", &row.impact_direction)?,
      impact_magnitude: cx
        .parsed::<ImpactMagnitude>("impact_magnitude", &row.impact_magnitude)?,
      lag_months: cx.lag("lag_months", &row.lag_months)?,
      source_name,
    }),
    RecordType::Target => Record::Target(Target {
      id,
      confidence,
      indicator_code: cx.indicator(
        "indicator_code",
        &row.indicator_code,
        vocabulary,
      )?,
      target_value: cx.number("value_numeric", &row.value_numeric)?,
      target_date: cx.date("observation_date", &row.observation_date)?,
      source_name,
    }),
  };
  Ok(record)
}

/// Field-parsing helpers that stamp errors with the row label.
struct Cx<'a> {
  label: &'a str,
}

impl Cx<'_> {
  fn error(&self, field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::new(self.label, field, reason)
  }

  fn required<'v>(
    &self,
    field: &'static str,
    value: &'v Option<String>,
  ) -> RowResult<&'v str> {
    value
      .as_deref()
      .filter(|v| !v.is_empty())
      .ok_or_else(|| self.error(field, "missing value"))
  }

  fn parsed<T>(&self, field: &'static str, value: &Option<String>) -> RowResult<T>
  where
    T: std::str::FromStr<Err = Error>,
  {
    self
      .required(field, value)?
      .parse()
      .map_err(|e: Error| self.error(field, e.to_string()))
  }

  fn indicator(
    &self,
    field: &'static str,
    value: &Option<String>,
    vocabulary: &Vocabulary,
  ) -> RowResult<IndicatorCode> {
    let code = IndicatorCode(self.required(field, value)?.to_string());
    if vocabulary.contains(&code) {
      Ok(code)
    } else {
      Err(self.error(field, format!("unknown indicator code {code}")))
    }
  }

  fn number(&self, field: &'static str, value: &Option<String>) -> RowResult<f64> {
    let text = self.required(field, value)?;
    match text.replace(',', "").parse::<f64>() {
      Ok(n) if n.is_finite() => Ok(n),
      _ => Err(self.error(field, format!("not a finite number: {text:?}"))),
    }
  }

  fn date(&self, field: &'static str, value: &Option<String>) -> RowResult<NaiveDate> {
    let text = self.required(field, value)?;
    parse_date(text)
      .ok_or_else(|| self.error(field, format!("unrecognised date: {text:?}")))
  }

  /// Blank lags mean "immediate". Whole-number floats (`12.0`) are accepted
  /// because spreadsheet exports often write them that way.
  fn lag(&self, field: &'static str, value: &Option<String>) -> RowResult<u32> {
    let Some(text) = value.as_deref().filter(|v| !v.is_empty()) else {
      return Ok(0);
    };
    if let Ok(n) = text.parse::<u32>() {
      return Ok(n);
    }
    match text.parse::<f64>() {
      Ok(n) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => {
        Ok(n as u32)
      }
      _ => Err(self.error(
        field,
        format!("expected a non-negative whole number of months, got {text:?}"),
      )),
    }
  }
}

/// Parse `YYYY-MM-DD`, `YYYY/MM/DD` or `YYYY-MM-DD HH:MM:SS`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
  let text = text.trim();
  NaiveDate::parse_from_str(text, "%Y-%m-%d")
    .or_else(|_| NaiveDate::parse_from_str(text, "%Y/%m/%d"))
    .or_else(|_| {
      NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
    })
    .ok()
}
