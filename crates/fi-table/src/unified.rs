//! The unified table: one header row, fifteen columns, one record per row.

use std::{
  fs::File,
  io::{Read, Write},
  path::Path,
};

use fi_core::{Addition, RawRow, Record};
use tracing::debug;

use crate::{Error, Result};

/// Required columns, in the order they are written.
pub const COLUMNS: [&str; 15] = [
  "record_type",
  "id",
  "indicator_code",
  "value_numeric",
  "observation_date",
  "source_name",
  "confidence",
  "category",
  "event_date",
  "value_text",
  "parent_id",
  "related_indicator",
  "impact_direction",
  "impact_magnitude",
  "lag_months",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Reading ─────────────────────────────────────────────────────────────────

/// Column positions resolved from the header row.
struct Layout {
  required:  [usize; 15],
  notes:     Option<usize>,
  collector: Option<usize>,
}

impl Layout {
  fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
    let find = |name: &str| {
      headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let mut required = [0usize; 15];
    let mut missing = Vec::new();
    for (slot, name) in required.iter_mut().zip(COLUMNS) {
      match find(name) {
        Some(i) => *slot = i,
        None => missing.push(name.to_string()),
      }
    }
    if !missing.is_empty() {
      return Err(Error::MissingColumns(missing));
    }

    Ok(Self {
      required,
      notes: find("notes"),
      collector: find("collected_by"),
    })
  }
}

fn cell(record: &csv::StringRecord, index: usize) -> Option<String> {
  record
    .get(index)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}

/// Read every row of a unified table. Fails only on schema-level problems:
/// unreadable input, malformed CSV, or missing columns.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
  let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
  let layout = Layout::from_headers(reader.headers()?)?;

  let mut rows = Vec::new();
  for result in reader.records() {
    let record = result?;
    if record.iter().all(|f| f.trim().is_empty()) {
      continue;
    }
    let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
    let [
      record_type,
      id,
      indicator_code,
      value_numeric,
      observation_date,
      source_name,
      confidence,
      category,
      event_date,
      value_text,
      parent_id,
      related_indicator,
      impact_direction,
      impact_magnitude,
      lag_months,
    ] = layout.required.map(|i| cell(&record, i));

    rows.push(RawRow {
      line,
      record_type,
      id,
      indicator_code,
      value_numeric,
      observation_date,
      source_name,
      confidence,
      category,
      event_date,
      value_text,
      parent_id,
      related_indicator,
      impact_direction,
      impact_magnitude,
      lag_months,
      notes: layout.notes.and_then(|i| cell(&record, i)),
      collected_by: layout.collector.and_then(|i| cell(&record, i)),
    });
  }
  debug!(rows = rows.len(), "read unified table");
  Ok(rows)
}

pub fn read_rows_from_path(path: impl AsRef<Path>) -> Result<Vec<RawRow>> {
  let path = path.as_ref();
  let file = File::open(path).map_err(|e| Error::io(path, e))?;
  read_rows(file)
}

// ─── Writing ─────────────────────────────────────────────────────────────────

fn to_cells(record: &Record) -> [String; 15] {
  let opt = |s: &Option<String>| s.clone().unwrap_or_default();
  let mut cells: [String; 15] = Default::default();
  cells[0] = record.record_type().as_str().to_string();
  cells[1] = record.id().to_string();
  cells[6] = record.confidence().as_str().to_string();

  match record {
    Record::Observation(o) => {
      cells[2] = o.indicator_code.to_string();
      cells[3] = o.value_numeric.to_string();
      cells[4] = o.observation_date.format(DATE_FORMAT).to_string();
      cells[5] = opt(&o.source_name);
    }
    Record::Event(e) => {
      cells[5] = opt(&e.source_name);
      cells[7] = e.category.as_str().to_string();
      cells[8] = e.event_date.format(DATE_FORMAT).to_string();
      cells[9] = opt(&e.value_text);
    }
    Record::ImpactLink(l) => {
      cells[5] = opt(&l.source_name);
      cells[10] = l.parent_id.to_string();
      cells[11] = l.related_indicator.to_string();
      cells[12] = l.impact_direction.as_str().to_string();
      cells[13] = l.impact_magnitude.as_str().to_string();
      cells[14] = l.lag_months.to_string();
    }
    Record::Target(t) => {
      cells[2] = t.indicator_code.to_string();
      cells[3] = t.target_value.to_string();
      cells[4] = t.target_date.format(DATE_FORMAT).to_string();
      cells[5] = opt(&t.source_name);
    }
  }
  cells
}

/// The cells of a row exactly as read; blank cells stay blank.
fn raw_cells(row: &RawRow) -> [&str; 15] {
  [
    &row.record_type,
    &row.id,
    &row.indicator_code,
    &row.value_numeric,
    &row.observation_date,
    &row.source_name,
    &row.confidence,
    &row.category,
    &row.event_date,
    &row.value_text,
    &row.parent_id,
    &row.related_indicator,
    &row.impact_direction,
    &row.impact_magnitude,
    &row.lag_months,
  ]
  .map(|cell| cell.as_deref().unwrap_or(""))
}

/// Write the enriched unified table: every `base` row as it was read, including
/// rows that failed validation, followed by the `appended` records.
pub fn write_enriched<W: Write>(
  base: &[RawRow],
  appended: &[Addition],
  writer: W,
) -> Result<()> {
  let mut writer = csv::Writer::from_writer(writer);
  writer.write_record(COLUMNS)?;
  for row in base {
    writer.write_record(raw_cells(row))?;
  }
  for addition in appended {
    writer.write_record(to_cells(&addition.record))?;
  }
  writer.flush().map_err(csv::Error::from)?;
  Ok(())
}

pub fn write_enriched_to_path(
  base: &[RawRow],
  appended: &[Addition],
  path: impl AsRef<Path>,
) -> Result<()> {
  let path = path.as_ref();
  let file = File::create(path).map_err(|e| Error::io(path, e))?;
  write_enriched(base, appended, file)
}
