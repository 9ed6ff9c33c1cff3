//! The enrichment change log.
//!
//! Each enrichment run appends one Markdown section recording when it ran,
//! SHA-256 digests of the table before and after, and one bullet per added
//! record. The "before" digest lets a reader check that the base rows of the
//! enriched table are the ones that were reviewed.

use std::{
  fmt::Write as _,
  fs::OpenOptions,
  io::Write as _,
  path::Path,
};

use chrono::{DateTime, Utc};
use fi_core::{Addition, RawRow, ValidationError};
use sha2::{Digest, Sha256};

use crate::{Error, Result, write_enriched};

/// SHA-256 of the enriched table built from `base` and `appended`, hex-encoded.
///
/// With no additions this is the digest of the base table itself. Stable: the
/// same rows in the same order always hash the same.
pub fn table_digest(base: &[RawRow], appended: &[Addition]) -> Result<String> {
  let mut bytes = Vec::new();
  write_enriched(base, appended, &mut bytes)?;
  let hash = Sha256::digest(&bytes);
  Ok(hex::encode(hash))
}

/// One enrichment run, ready to be rendered.
pub struct ChangeLogEntry<'a> {
  pub at:          DateTime<Utc>,
  pub source:      &'a str,
  pub base_digest: String,
  pub new_digest:  String,
  pub appended:    &'a [Addition],
  pub rejected:    &'a [ValidationError],
}

impl ChangeLogEntry<'_> {
  pub fn render(&self) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Enrichment {}", self.at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out);
    let _ = writeln!(out, "- source: `{}`", self.source);
    let _ = writeln!(out, "- base sha256: `{}`", self.base_digest);
    let _ = writeln!(out, "- enriched sha256: `{}`", self.new_digest);
    let _ = writeln!(
      out,
      "- appended: {}, rejected: {}",
      self.appended.len(),
      self.rejected.len()
    );
    let _ = writeln!(out);

    for addition in self.appended {
      let record = &addition.record;
      let _ = write!(out, "- `{}` ({})", record.id(), record.record_type());
      if let Some(note) = &addition.note {
        let _ = write!(out, ": {note}");
      }
      if let Some(who) = &addition.collected_by {
        let _ = write!(out, " [{who}]");
      }
      let _ = writeln!(out);
    }
    for e in self.rejected {
      let _ = writeln!(out, "- rejected {e}");
    }
    let _ = writeln!(out);
    out
  }
}

/// Append `entry` to the Markdown log at `path`, creating it if needed.
pub fn append(path: impl AsRef<Path>, entry: &ChangeLogEntry<'_>) -> Result<()> {
  let path = path.as_ref();
  let is_new = !path.exists();
  let mut file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .map_err(|e| Error::io(path, e))?;

  let mut text = String::new();
  if is_new {
    text.push_str("# Data enrichment log\n\n");
  }
  text.push_str(&entry.render());
  file
    .write_all(text.as_bytes())
    .map_err(|e| Error::io(path, e))
}
