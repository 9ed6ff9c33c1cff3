//! Table-level tests: reading, writing, and the enrichment round trip.

use chrono::{TimeZone, Utc};
use fi_core::{
  Addition, Dataset, Record, RecordType, Vocabulary, enrich, normalize,
};

use crate::{
  Error,
  changelog::{self, ChangeLogEntry, table_digest},
  read_rows, read_rows_from_path, read_vocabulary, write_enriched,
  write_enriched_to_path,
};

const REFERENCE: &str = "\
field,code,description,unit
indicator_code,ACC_OWNERSHIP,Account ownership rate,percent
indicator_code,USG_DIGITAL_PAYMENT,Made or received a digital payment,percent
indicator_code,ACC_MM_ACCOUNTS,Registered mobile money accounts,count
category,product_launch,Product launch,
";

const UNIFIED: &str = "\
record_type,id,indicator_code,value_numeric,observation_date,source_name,confidence,category,event_date,value_text,parent_id,related_indicator,impact_direction,impact_magnitude,lag_months
observation,OBS001,ACC_OWNERSHIP,14,2011-12-31,Global Findex 2011,high,,,,,,,,
observation,OBS002,ACC_OWNERSHIP,22,2014-12-31,Global Findex 2014,high,,,,,,,,
observation,OBS003,ACC_OWNERSHIP,35,2017-12-31,Global Findex 2017,high,,,,,,,,
event,EVT001,,,,Ethio Telecom,high,product_launch,2021-05-11,\"Telebirr launch, mobile money\",,,,,
impact_link,IMP001,,,,,medium,,,,EVT001,ACC_OWNERSHIP,positive,high,24
target,TGT001,ACC_OWNERSHIP,60,2025-12-31,NFIS-II,high,,,,,,,,
";

fn vocab() -> Vocabulary { read_vocabulary(REFERENCE.as_bytes()).unwrap() }

fn load(text: &str) -> Dataset {
  let rows = read_rows(text.as_bytes()).unwrap();
  normalize(&rows, &vocab()).into_strict().unwrap()
}

// ─── Reference vocabulary ────────────────────────────────────────────────────

#[test]
fn vocabulary_reads_indicators_and_units() {
  let v = vocab();
  assert_eq!(v.len(), 3);
  assert_eq!(
    v.unit(&"ACC_MM_ACCOUNTS".into()),
    fi_core::IndicatorUnit::Count
  );
  assert_eq!(v.describe("category", "product_launch"), Some("Product launch"));
}

#[test]
fn vocabulary_rejects_unknown_unit() {
  let text = "field,code,description,unit\nindicator_code,X,x,furlongs\n";
  let err = read_vocabulary(text.as_bytes()).unwrap_err();
  assert!(matches!(err, Error::InvalidUnit { .. }));
}

// ─── Unified table ───────────────────────────────────────────────────────────

#[test]
fn reads_all_record_types() {
  let ds = load(UNIFIED);
  assert_eq!(ds.len(), 6);
  assert_eq!(ds.observations.len(), 3);
  assert_eq!(
    ds.events[0].value_text.as_deref(),
    Some("Telebirr launch, mobile money")
  );
  assert_eq!(ds.impact_links[0].lag_months, 24);
  assert_eq!(ds.targets[0].target_value, 60.0);
}

#[test]
fn header_order_is_free_and_extra_columns_are_ignored() {
  let text = "\
id,record_type,pillar,confidence,indicator_code,value_numeric,observation_date,source_name,category,event_date,value_text,parent_id,related_indicator,impact_direction,impact_magnitude,lag_months
OBS001,observation,ACCESS,high,ACC_OWNERSHIP,14,2011-12-31,Findex,,,,,,,,
";
  let ds = load(text);
  assert_eq!(ds.observations[0].value_numeric, 14.0);
}

#[test]
fn missing_columns_fail_the_whole_read() {
  let text = "record_type,id,indicator_code\nobservation,OBS1,ACC_OWNERSHIP\n";
  let Err(Error::MissingColumns(missing)) = read_rows(text.as_bytes()) else {
    panic!("expected MissingColumns");
  };
  assert!(missing.contains(&"value_numeric".to_string()));
  assert!(missing.contains(&"lag_months".to_string()));
}

#[test]
fn row_lines_are_reported() {
  let rows = read_rows(UNIFIED.as_bytes()).unwrap();
  assert_eq!(rows[0].line, 2);
  assert_eq!(rows[5].line, 7);
}

#[test]
fn bad_rows_do_not_stop_good_rows() {
  let text = format!(
    "{UNIFIED}observation,OBS004,UNKNOWN_CODE,3,2020-01-01,x,high,,,,,,,,\n\
     observation,OBS005,ACC_OWNERSHIP,46,2021-12-31,Global Findex 2021,high,,,,,,,,\n"
  );
  let rows = read_rows(text.as_bytes()).unwrap();
  let out = normalize(&rows, &vocab());
  assert_eq!(out.dataset.observations.len(), 4);
  assert_eq!(out.rejected.len(), 1);
  assert_eq!(out.rejected[0].row_id, "OBS004");
}

#[test]
fn appended_records_read_back_identically() {
  let ds = load(UNIFIED);
  let appended: Vec<Addition> = ds
    .records()
    .map(|record| Addition {
      record,
      note: None,
      collected_by: None,
    })
    .collect();
  let mut out = Vec::new();
  write_enriched(&[], &appended, &mut out).unwrap();
  let again = load(std::str::from_utf8(&out).unwrap());
  assert_eq!(ds, again);
}

#[test]
fn base_rows_are_written_as_read_even_when_rejected() {
  let text = format!(
    "{UNIFIED}observation,OBS004,UNKNOWN_CODE,3,2020-01-01,x,high,,,,,,,,\n"
  );
  let rows = read_rows(text.as_bytes()).unwrap();
  assert_eq!(normalize(&rows, &vocab()).rejected.len(), 1);

  let mut out = Vec::new();
  write_enriched(&rows, &[], &mut out).unwrap();
  let again = read_rows(out.as_slice()).unwrap();
  assert_eq!(again, rows);
  assert_eq!(again.last().and_then(|r| r.id.as_deref()), Some("OBS004"));
}

// ─── Enrichment round trip ───────────────────────────────────────────────────

#[test]
fn enrich_write_reload_adds_exactly_one_record() {
  let dir = tempfile::tempdir().unwrap();
  let base_path = dir.path().join("unified.csv");
  let enriched_path = dir.path().join("enriched.csv");
  std::fs::write(&base_path, UNIFIED).unwrap();

  let vocabulary = vocab();
  let rows_base = read_rows_from_path(&base_path).unwrap();
  let base = normalize(&rows_base, &vocabulary).into_strict().unwrap();

  let additions = "\
record_type,id,indicator_code,value_numeric,observation_date,source_name,confidence,category,event_date,value_text,parent_id,related_indicator,impact_direction,impact_magnitude,lag_months,notes,collected_by
observation,OBS010,ACC_OWNERSHIP,49,2024-11-29,Global Findex 2024,high,,,,,,,,,Latest Findex wave,analyst
";
  let rows = read_rows(additions.as_bytes()).unwrap();
  let outcome = enrich(&base, &rows, &vocabulary);
  assert!(outcome.rejected.is_empty());
  write_enriched_to_path(&rows_base, &outcome.appended, &enriched_path)
    .unwrap();

  let reloaded =
    normalize(&read_rows_from_path(&enriched_path).unwrap(), &vocabulary)
      .into_strict()
      .unwrap();
  assert_eq!(reloaded.len(), base.len() + 1);

  let prior: Vec<Record> = reloaded.records().take(base.len()).collect();
  let original: Vec<Record> = base.records().collect();
  assert_eq!(prior, original);

  let last = reloaded.records().last().unwrap();
  assert_eq!(last.record_type(), RecordType::Observation);
  assert_eq!(last.id().as_str(), "OBS010");
}

// ─── Change log ──────────────────────────────────────────────────────────────

#[test]
fn digest_is_stable_and_sensitive_to_content() {
  let rows = read_rows(UNIFIED.as_bytes()).unwrap();
  let a = table_digest(&rows, &[]).unwrap();
  let b = table_digest(&read_rows(UNIFIED.as_bytes()).unwrap(), &[]).unwrap();
  assert_eq!(a, b);
  assert_eq!(a.len(), 64);

  let ds = load(UNIFIED);
  let mut extra = ds.observations[0].clone();
  extra.id = "OBS999".into();
  let appended = [Addition {
    record:       Record::Observation(extra),
    note:         None,
    collected_by: None,
  }];
  assert_ne!(a, table_digest(&rows, &appended).unwrap());
}

#[test]
fn changelog_appends_sections() {
  let dir = tempfile::tempdir().unwrap();
  let log_path = dir.path().join("enrichment_log.md");
  let base_rows = read_rows(UNIFIED.as_bytes()).unwrap();
  let base = load(UNIFIED);
  let rows = read_rows(
    "record_type,id,indicator_code,value_numeric,observation_date,source_name,confidence,category,event_date,value_text,parent_id,related_indicator,impact_direction,impact_magnitude,lag_months,notes\n\
     observation,OBS010,ACC_OWNERSHIP,49,2024-11-29,Findex,high,,,,,,,,,Findex 2024\n"
      .as_bytes(),
  )
  .unwrap();
  let outcome = enrich(&base, &rows, &vocab());

  let entry = ChangeLogEntry {
    at:          Utc.with_ymd_and_hms(2025, 2, 1, 9, 30, 0).unwrap(),
    source:      "additions.csv",
    base_digest: table_digest(&base_rows, &[]).unwrap(),
    new_digest:  table_digest(&base_rows, &outcome.appended).unwrap(),
    appended:    &outcome.appended,
    rejected:    &outcome.rejected,
  };
  changelog::append(&log_path, &entry).unwrap();
  changelog::append(&log_path, &entry).unwrap();

  let text = std::fs::read_to_string(&log_path).unwrap();
  assert!(text.starts_with("# Data enrichment log\n"));
  assert_eq!(text.matches("## Enrichment 2025-02-01 09:30:00 UTC").count(), 2);
  assert!(text.contains("- `OBS010` (observation): Findex 2024"));
}
