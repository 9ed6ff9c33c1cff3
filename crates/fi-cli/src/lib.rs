//! Pipeline orchestration for the `fi` binary.
//!
//! Wires the flat-file codec, the impact matrix, and the forecast engine
//! together under one [`PipelineConfig`].

pub mod config;
pub mod pipeline;
pub mod report;

pub use config::PipelineConfig;
