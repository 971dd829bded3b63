//! Error types for kinanthro

use crate::types::MetricId;
use thiserror::Error;

/// Rejections raised at the measurement-entry boundary.
///
/// None of these are ever coerced into a zero value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Empty value for {metric}")]
    Empty { metric: String },

    #[error("Value {raw:?} for {metric} is not numeric")]
    NotNumeric { metric: String, raw: String },

    #[error("Value for {metric} is not a finite number")]
    NotFinite { metric: String },

    #[error("Negative value {value} for {metric}")]
    Negative { metric: String, value: f64 },

    #[error("Value {value} for {metric} outside plausible range {min}..={max}")]
    OutOfRange {
        metric: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Metric {metric} does not belong to section {section}")]
    SectionMismatch { metric: String, section: String },
}

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid measurement: {0}")]
    Validation(#[from] ValidationError),

    #[error("Incomplete measurement, third trial required for: {}", format_metrics(.0))]
    IncompleteMeasurement(Vec<MetricId>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse backend payload: {0}")]
    ParseError(String),

    #[error("No measurement records for client {0}")]
    NoRecords(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

fn format_metrics(metrics: &[MetricId]) -> String {
    metrics
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
