//! Report encoding
//!
//! This module encodes a record comparison into the report payload consumed by
//! the PDF/Excel renderers. Ensures producer, provenance and quality metadata
//! are always present.

use crate::config::{EngineConfig, MissingDataPolicy};
use crate::error::ComputeError;
use crate::types::{
    AnthropometricData, ComparisonReport, MeasurementRecord, QualityFlag, ReportPayload,
    ReportProducer, ReportProvenance, ReportQuality, Section,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report encoder for producing renderer payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a comparison of `current` into a report payload
    pub fn encode(
        &self,
        current: &MeasurementRecord,
        comparison: &ComparisonReport,
        config: &EngineConfig,
    ) -> Result<ReportPayload, ComputeError> {
        self.encode_at(current, comparison, config, Utc::now())
    }

    /// Encode with an explicit computation timestamp
    pub fn encode_at(
        &self,
        current: &MeasurementRecord,
        comparison: &ComparisonReport,
        config: &EngineConfig,
        computed_at: DateTime<Utc>,
    ) -> Result<ReportPayload, ComputeError> {
        if comparison.current_record_id != current.id {
            return Err(ComputeError::EncodingError(format!(
                "comparison was built for record {}, not {}",
                comparison.current_record_id, current.id
            )));
        }

        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            client_id: current.client_id.clone(),
            evaluator: current.evaluator.clone(),
            current_record_id: current.id.to_string(),
            previous_record_id: comparison.previous_record_id.map(|id| id.to_string()),
            computed_at_utc: computed_at.to_rfc3339(),
        };

        let quality = ReportQuality {
            coverage: current.data.coverage(),
            flags: quality_flags(
                &current.data,
                comparison.previous_record_id.is_some(),
                config.missing_data_policy,
            ),
        };

        Ok(ReportPayload {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            quality,
            comparison: comparison.clone(),
        })
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        current: &MeasurementRecord,
        comparison: &ComparisonReport,
        config: &EngineConfig,
    ) -> Result<String, ComputeError> {
        let payload = self.encode(current, comparison, config)?;
        serde_json::to_string_pretty(&payload).map_err(ComputeError::JsonError)
    }
}

/// Data-quality flags for the current record
pub fn quality_flags(
    data: &AnthropometricData,
    has_previous: bool,
    policy: MissingDataPolicy,
) -> Vec<QualityFlag> {
    let mut flags = Vec::new();
    let missing = data.missing();

    for section in Section::ALL {
        if missing.iter().any(|m| m.section() == section) {
            flags.push(match section {
                Section::Basic => QualityFlag::MissingBasicData,
                Section::Skinfolds => QualityFlag::MissingSkinfoldData,
                Section::Girths => QualityFlag::MissingGirthData,
                Section::Breadths => QualityFlag::MissingBreadthData,
            });
        }
    }

    if !has_previous {
        flags.push(QualityFlag::NoPreviousRecord);
    }

    if policy == MissingDataPolicy::ZeroFill && !missing.is_empty() {
        flags.push(QualityFlag::ZeroFilledInputs);
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::RecordAggregator;
    use crate::derived::test_support::{sample_data, sample_data_without, sample_profile};
    use crate::reference::ReferenceTable;
    use crate::types::MetricId;
    use chrono::{NaiveDate, TimeZone};

    fn make_test_record(data: AnthropometricData) -> MeasurementRecord {
        MeasurementRecord::new(
            "client-1",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "evaluator-1",
            data,
        )
    }

    fn make_test_comparison(record: &MeasurementRecord) -> ComparisonReport {
        RecordAggregator::compare(
            record,
            None,
            &sample_profile(),
            &EngineConfig::default(),
            ReferenceTable::standard(),
        )
    }

    #[test]
    fn test_encode_report_payload() {
        let record = make_test_record(sample_data());
        let comparison = make_test_comparison(&record);
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let computed_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let payload = encoder
            .encode_at(&record, &comparison, &EngineConfig::default(), computed_at)
            .unwrap();

        assert_eq!(payload.report_version, REPORT_VERSION);
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.version, ENGINE_VERSION);
        assert_eq!(payload.producer.instance_id, "test-instance");

        assert_eq!(payload.provenance.client_id, "client-1");
        assert_eq!(payload.provenance.evaluator, "evaluator-1");
        assert_eq!(payload.provenance.current_record_id, record.id.to_string());
        assert_eq!(payload.provenance.previous_record_id, None);
        assert_eq!(payload.provenance.computed_at_utc, computed_at.to_rfc3339());

        assert_eq!(payload.quality.coverage, 1.0);
        assert_eq!(payload.quality.flags, vec![QualityFlag::NoPreviousRecord]);
    }

    #[test]
    fn test_quality_flags_for_gaps() {
        let data = sample_data_without(&[MetricId::Wrist, MetricId::Biceps]);
        let flags = quality_flags(&data, true, MissingDataPolicy::Strict);
        assert_eq!(
            flags,
            vec![QualityFlag::MissingSkinfoldData, QualityFlag::MissingBreadthData]
        );

        let flags = quality_flags(&data, true, MissingDataPolicy::ZeroFill);
        assert!(flags.contains(&QualityFlag::ZeroFilledInputs));
    }

    #[test]
    fn test_mismatched_comparison_rejected() {
        let record = make_test_record(sample_data());
        let other = make_test_record(sample_data());
        let comparison = make_test_comparison(&other);
        let err = ReportEncoder::new()
            .encode(&record, &comparison, &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, ComputeError::EncodingError(_)));
    }

    #[test]
    fn test_encode_to_json() {
        let record = make_test_record(sample_data());
        let comparison = make_test_comparison(&record);
        let json = ReportEncoder::new()
            .encode_to_json(&record, &comparison, &EngineConfig::default())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("report_version").is_some());
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("provenance").is_some());
        assert!(parsed.get("quality").is_some());
        assert!(parsed["comparison"]["metrics"].is_array());
        assert_eq!(
            parsed["comparison"]["current_derived"]["z_scores"]["wrist"]["status"],
            "no_reference"
        );
        assert_eq!(
            parsed["comparison"]["current_derived"]["proportional_z_scores"]["femur"]["status"],
            "scored"
        );

        let mass_row = parsed["comparison"]["metrics"]
            .as_array()
            .unwrap()
            .iter()
            .find(|row| row["metric"] == "mass")
            .unwrap();
        assert_eq!(mass_row["proportional_z_score"]["status"], "scored");
        assert!(mass_row["proportional_z_score"]["value"].is_number());
    }
}
