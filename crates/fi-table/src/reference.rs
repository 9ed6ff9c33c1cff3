//! The reference vocabulary file: `field,code,description[,unit]`.

use std::{fs::File, io::Read, path::Path};

use fi_core::{IndicatorCode, IndicatorUnit, Vocabulary};
use tracing::debug;

use crate::{Error, Result};

/// `field` values that declare an indicator code.
const INDICATOR_FIELDS: [&str; 3] =
  ["indicator_code", "indicator", "related_indicator"];

fn parse_unit(code: &str, text: Option<&str>) -> Result<IndicatorUnit> {
  match text.map(str::trim).unwrap_or("").to_ascii_lowercase().as_str() {
    "" | "percent" | "percentage" | "pct" | "%" => Ok(IndicatorUnit::Percent),
    "count" | "number" => Ok(IndicatorUnit::Count),
    other => Err(Error::InvalidUnit {
      code: code.to_string(),
      unit: other.to_string(),
    }),
  }
}

/// Read a reference vocabulary. Rows whose `field` names an indicator column
/// become known indicator codes; every other row is kept as a description.
pub fn read_vocabulary<R: Read>(reader: R) -> Result<Vocabulary> {
  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(reader);

  let headers = reader.headers()?.clone();
  let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
  let (Some(field_col), Some(code_col)) = (find("field"), find("code")) else {
    let missing = ["field", "code"]
      .into_iter()
      .filter(|c| find(c).is_none())
      .map(str::to_string)
      .collect();
    return Err(Error::MissingColumns(missing));
  };
  let description_col = find("description");
  let unit_col = find("unit");

  let mut vocabulary = Vocabulary::new();
  for result in reader.records() {
    let record = result?;
    let (Some(field), Some(code)) = (record.get(field_col), record.get(code_col))
    else {
      continue;
    };
    if code.is_empty() {
      continue;
    }
    let description = description_col
      .and_then(|i| record.get(i))
      .unwrap_or_default();

    if INDICATOR_FIELDS.iter().any(|f| field.eq_ignore_ascii_case(f)) {
      let unit = parse_unit(code, unit_col.and_then(|i| record.get(i)))?;
      vocabulary.add_indicator(IndicatorCode(code.to_string()), description, unit);
    } else {
      vocabulary.add_code(field, code, description);
    }
  }
  debug!(indicators = vocabulary.len(), "read reference vocabulary");
  Ok(vocabulary)
}

pub fn read_vocabulary_from_path(path: impl AsRef<Path>) -> Result<Vocabulary> {
  let path = path.as_ref();
  let file = File::open(path).map_err(|e| Error::io(path, e))?;
  read_vocabulary(file)
}
