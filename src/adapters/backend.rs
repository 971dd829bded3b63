//! JSON record adapter
//!
//! Parses backend measurement records and maps them to canonical records.
//!
//! ```json
//! [{
//!   "id": "6f1c…",            // optional, generated when absent
//!   "clientId": "client-1",
//!   "date": "2024-03-01",
//!   "evaluator": "evaluator-1",
//!   "basic":     { "mass": 78.5, "sittingHeight": "92,0" },
//!   "skinfolds": { "triceps": 11, "iliac_crest": null },
//!   "girths":    { … },
//!   "breadths":  { … }
//! }]
//! ```
//!
//! A bare array or an object with a `records` array are both accepted.

use crate::error::{ComputeError, ValidationError};
use crate::types::{AnthropometricData, MeasurementRecord, MetricId, Section};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::BackendAdapter;

/// Backend JSON record adapter
pub struct JsonRecordAdapter;

impl BackendAdapter for JsonRecordAdapter {
    fn parse(&self, raw_json: &str) -> Result<Vec<MeasurementRecord>, ComputeError> {
        let payload: BackendPayload = serde_json::from_str(raw_json)?;
        let raw_records = match payload {
            BackendPayload::List(records) => records,
            BackendPayload::Wrapped { records } => records,
        };

        let records = raw_records
            .into_iter()
            .map(convert_record)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = records.len(), "parsed backend records");
        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BackendPayload {
    List(Vec<BackendRecord>),
    Wrapped { records: Vec<BackendRecord> },
}

#[derive(Debug, Deserialize)]
struct BackendRecord {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(alias = "clientId")]
    client_id: String,
    date: String,
    #[serde(default)]
    evaluator: Option<String>,
    #[serde(default)]
    basic: Option<Map<String, Value>>,
    #[serde(default)]
    skinfolds: Option<Map<String, Value>>,
    #[serde(default)]
    girths: Option<Map<String, Value>>,
    #[serde(default)]
    breadths: Option<Map<String, Value>>,
}

fn convert_record(raw: BackendRecord) -> Result<MeasurementRecord, ComputeError> {
    let date = parse_date(&raw.date)?;

    let sections = [
        (Section::Basic, &raw.basic),
        (Section::Skinfolds, &raw.skinfolds),
        (Section::Girths, &raw.girths),
        (Section::Breadths, &raw.breadths),
    ];

    let mut values = Vec::new();
    for (section, fields) in sections {
        let Some(fields) = fields else { continue };
        for (key, value) in fields {
            let metric = parse_metric_key(key)?;
            if metric.section() != section {
                return Err(ValidationError::SectionMismatch {
                    metric: metric.to_string(),
                    section: section.to_string(),
                }
                .into());
            }
            if let Some(number) = parse_value(metric, value)? {
                values.push((metric, number));
            }
        }
    }

    let data = AnthropometricData::new(values)?;
    let evaluator = raw.evaluator.unwrap_or_default();
    let mut record = MeasurementRecord::new(raw.client_id, date, evaluator, data);
    if let Some(id) = raw.id {
        record.id = id;
    }
    Ok(record)
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp whose calendar date is kept
fn parse_date(raw: &str) -> Result<NaiveDate, ComputeError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| ComputeError::ParseError(format!("invalid record date: {trimmed}")))
}

/// Accepts `sitting_height` as well as `sittingHeight`
fn parse_metric_key(key: &str) -> Result<MetricId, ValidationError> {
    let mut snake = String::with_capacity(key.len() + 4);
    for ch in key.trim().chars() {
        if ch.is_ascii_uppercase() {
            if !snake.is_empty() {
                snake.push('_');
            }
            snake.push(ch.to_ascii_lowercase());
        } else {
            snake.push(ch);
        }
    }
    snake.parse()
}

/// Number, numeric string, or absent (`null` / blank string)
fn parse_value(metric: MetricId, value: &Value) -> Result<Option<f64>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or(ValidationError::NotFinite {
            metric: metric.to_string(),
        }),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ValidationError::NotNumeric {
                metric: metric.to_string(),
                raw: s.clone(),
            }),
        other => Err(ValidationError::NotNumeric {
            metric: metric.to_string(),
            raw: other.to_string(),
        }),
    }
}
