//! Enrichment: appending curated records to an existing dataset.
//!
//! Additions are validated against the base (ids stay unique, links may point
//! at base events or new ones) and appended after every base record. Base
//! records are never touched, so enriching twice with disjoint additions is
//! the same as enriching once with both.

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
  Dataset, RawRow, ValidationError, Vocabulary, record::Record,
  validate::admit,
};

/// A record added during curation, with its change-log annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Addition {
  pub record:       Record,
  pub note:         Option<String>,
  pub collected_by: Option<String>,
}

/// The result of [`enrich`].
#[derive(Debug, Clone)]
pub struct EnrichOutcome {
  /// Base records followed by the accepted additions.
  pub dataset:  Dataset,
  pub appended: Vec<Addition>,
  pub rejected: Vec<ValidationError>,
}

/// Validate `rows` against `base` and append the ones that pass.
pub fn enrich(
  base: &Dataset,
  rows: &[RawRow],
  vocabulary: &Vocabulary,
) -> EnrichOutcome {
  let (accepted, rejected) = admit(base, rows, vocabulary);

  for e in &rejected {
    warn!(row = %e.row_id, field = e.field, reason = %e.reason, "addition rejected");
  }

  let mut dataset = base.clone();
  let appended: Vec<Addition> = accepted
    .into_iter()
    .map(|(index, record)| {
      dataset.push(record.clone());
      Addition {
        record,
        note: rows[index].notes.clone(),
        collected_by: rows[index].collected_by.clone(),
      }
    })
    .collect();

  debug!(
    base = base.len(),
    appended = appended.len(),
    rejected = rejected.len(),
    "enriched dataset"
  );

  EnrichOutcome {
    dataset,
    appended,
    rejected,
  }
}
