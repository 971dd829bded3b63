//! Backend payload adapters
//!
//! This module provides adapters that parse stored measurement records as the
//! backend serves them and map them to canonical [`MeasurementRecord`]s.

mod backend;

pub use backend::JsonRecordAdapter;

use crate::error::ComputeError;
use crate::types::MeasurementRecord;

/// Trait for backend payload adapters
pub trait BackendAdapter {
    /// Parse raw JSON and convert to canonical records
    fn parse(&self, raw_json: &str) -> Result<Vec<MeasurementRecord>, ComputeError>;
}
