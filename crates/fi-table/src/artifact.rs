//! Derived output tables.
//!
//! The impact matrix and forecast tables are written from plain `Serialize`
//! row structs owned by the crates that compute them. The header is written
//! explicitly so that an empty table still carries its schema.

use std::{fs::File, io::Write, path::Path};

use serde::Serialize;

use crate::{Error, Result};

pub fn write_table<W, T, I>(writer: W, header: &[&str], rows: I) -> Result<usize>
where
  W: Write,
  T: Serialize,
  I: IntoIterator<Item = T>,
{
  let mut writer = csv::WriterBuilder::new()
    .has_headers(false)
    .from_writer(writer);
  writer.write_record(header)?;
  let mut count = 0;
  for row in rows {
    writer.serialize(row)?;
    count += 1;
  }
  writer.flush().map_err(csv::Error::from)?;
  Ok(count)
}

/// Write a table to `path`, returning the number of data rows written.
pub fn write_table_to_path<T, I>(
  path: impl AsRef<Path>,
  header: &[&str],
  rows: I,
) -> Result<usize>
where
  T: Serialize,
  I: IntoIterator<Item = T>,
{
  let path = path.as_ref();
  let file = File::create(path).map_err(|e| Error::io(path, e))?;
  write_table(file, header, rows)
}
