//! The untyped shape of a unified-table row, before validation.

/// One row of the unified table, every column as optional trimmed text.
///
/// Blank cells are `None`. `line` is the 1-based line number in the source
/// file (header is line 1) and is used to name rows that lack an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
  pub line:              usize,
  pub record_type:       Option<String>,
  pub id:                Option<String>,
  pub indicator_code:    Option<String>,
  pub value_numeric:     Option<String>,
  pub observation_date:  Option<String>,
  pub source_name:       Option<String>,
  pub confidence:        Option<String>,
  pub category:          Option<String>,
  pub event_date:        Option<String>,
  pub value_text:        Option<String>,
  pub parent_id:         Option<String>,
  pub related_indicator: Option<String>,
  pub impact_direction:  Option<String>,
  pub impact_magnitude:  Option<String>,
  pub lag_months:        Option<String>,
  /// Free-text curation note; only read from enrichment files.
  pub notes:             Option<String>,
  /// Who collected the record; only read from enrichment files.
  pub collected_by:      Option<String>,
}

impl RawRow {
  /// The name used for this row in validation errors.
  pub fn label(&self) -> String {
    match &self.id {
      Some(id) => id.clone(),
      None => format!("line {}", self.line),
    }
  }
}
