//! Core types for the financial-inclusion dataset.
//!
//! The unified table stores four kinds of record in one flat shape. This crate
//! turns those rows into a typed [`Dataset`], validates every cross reference
//! against the indicator [`Vocabulary`], and appends curated additions.
//!
//! This crate is free of file-format dependencies; `fi-table` does the
//! reading and writing.

pub mod dataset;
pub mod enrich;
pub mod error;
pub mod raw;
pub mod record;
pub mod validate;
pub mod vocabulary;

pub use dataset::{Dataset, DatasetSummary};
pub use enrich::{Addition, EnrichOutcome, enrich};
pub use error::{Error, Result, ValidationError};
pub use raw::RawRow;
pub use record::{
  Confidence, Event, EventCategory, ImpactDirection, ImpactLink,
  ImpactMagnitude, IndicatorCode, Observation, Record, RecordId, RecordType,
  Target,
};
pub use validate::{Normalized, normalize};
pub use vocabulary::{IndicatorDef, IndicatorUnit, Vocabulary};
