//! Pipeline orchestration
//!
//! This module provides the public API for kinanthro.
//! It orchestrates the full pipeline from stored records or raw trials to the
//! report payload.

use crate::adapters::{BackendAdapter, JsonRecordAdapter};
use crate::aggregator::{ClientHistory, RecordAggregator};
use crate::config::EngineConfig;
use crate::derived::DerivedCalculator;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::reconciliation::Reconciler;
use crate::reference::ReferenceTable;
use crate::types::{
    ClientProfile, ComparisonReport, DashboardSummary, DerivedResult, MeasurementRecord,
    SittingInput,
};
use tracing::{debug, info};

/// Convert a client's stored records to a report payload.
///
/// # Arguments
/// * `records_json` - Backend records (array, or object with a `records` array)
/// * `profile_json` - Client profile `{client_id, age, sex?}`
/// * `config` - Engine configuration
///
/// # Returns
/// Report JSON comparing the client's latest record with the one before it
///
/// # Example
/// ```ignore
/// let report = records_to_report(
///     records_json,
///     r#"{"client_id": "client-1", "age": 30}"#.to_string(),
///     &EngineConfig::default(),
/// )?;
/// ```
pub fn records_to_report(
    records_json: String,
    profile_json: String,
    config: &EngineConfig,
) -> Result<String, ComputeError> {
    let profile: ClientProfile = serde_json::from_str(&profile_json)?;
    let records = JsonRecordAdapter.parse(&records_json)?;
    let history = ClientHistory::from_records(records);

    build_report(
        &history,
        &profile,
        config,
        ReferenceTable::standard(),
        &ReportEncoder::new(),
    )
}

/// Reconcile the trials of one sitting.
///
/// Returns the sitting outcome JSON: every reconciliation, the metrics still
/// waiting on a third trial and the metrics never entered.
pub fn reconcile_sitting_json(
    sitting_json: &str,
    config: &EngineConfig,
) -> Result<String, ComputeError> {
    let sitting: SittingInput = serde_json::from_str(sitting_json)?;
    let outcome = Reconciler::reconcile_sitting(&sitting, &config.tolerances)?;
    serde_json::to_string_pretty(&outcome).map_err(ComputeError::JsonError)
}

/// Reconcile and finalize a sitting into a record JSON.
///
/// Fails with [`ComputeError::IncompleteMeasurement`] while any metric still
/// needs a third trial.
pub fn finalize_sitting_json(
    sitting_json: &str,
    config: &EngineConfig,
) -> Result<String, ComputeError> {
    let sitting: SittingInput = serde_json::from_str(sitting_json)?;
    let record = Reconciler::record_from_sitting(&sitting, config)?;
    serde_json::to_string_pretty(&record).map_err(ComputeError::JsonError)
}

/// Process history through the report stages.
///
/// Pipeline stages:
/// 1. ClientHistory - Select current and previous records
/// 2. DerivedCalculator - Derive every output for both records
/// 3. RecordAggregator - Build metric and derived comparisons
/// 4. ReportEncoder - Encode to report JSON
fn build_report(
    history: &ClientHistory,
    profile: &ClientProfile,
    config: &EngineConfig,
    reference: &ReferenceTable,
    encoder: &ReportEncoder,
) -> Result<String, ComputeError> {
    let (current, previous) = history
        .current_and_previous(&profile.client_id)
        .ok_or_else(|| ComputeError::NoRecords(profile.client_id.clone()))?;

    debug!(
        client_id = profile.client_id.as_str(),
        records = history.for_client(&profile.client_id).len(),
        "building report"
    );

    let comparison = RecordAggregator::compare(current, previous, profile, config, reference);
    encoder.encode_to_json(current, &comparison, config)
}

/// Stateful engine holding a client history between calls.
///
/// Use this when records arrive one sitting at a time and the history must
/// survive across calls.
pub struct AnthropometricEngine {
    config: EngineConfig,
    reference: ReferenceTable,
    history: ClientHistory,
    encoder: ReportEncoder,
}

impl Default for AnthropometricEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnthropometricEngine {
    /// Create an engine with default configuration and the phantom reference table
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            reference: ReferenceTable::standard().clone(),
            history: ClientHistory::new(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Replace the population reference table
    #[must_use]
    pub fn with_reference(mut self, reference: ReferenceTable) -> Self {
        self.reference = reference;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &ClientHistory {
        &self.history
    }

    /// Load history from JSON
    pub fn load_history(&mut self, json: &str) -> Result<(), ComputeError> {
        self.history =
            serde_json::from_str(json).map_err(|e| ComputeError::ParseError(e.to_string()))?;
        Ok(())
    }

    /// Save history to JSON
    pub fn save_history(&self) -> Result<String, ComputeError> {
        serde_json::to_string(&self.history).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Import backend records into the history
    pub fn import_records(&mut self, records_json: &str) -> Result<usize, ComputeError> {
        let records = JsonRecordAdapter.parse(records_json)?;
        let count = records.len();
        for record in records {
            self.history.push(record);
        }
        Ok(count)
    }

    pub fn add_record(&mut self, record: MeasurementRecord) {
        self.history.push(record);
    }

    /// Reconcile a sitting, finalize it and add the record to the history
    pub fn record_sitting(
        &mut self,
        sitting: &SittingInput,
    ) -> Result<MeasurementRecord, ComputeError> {
        let record = Reconciler::record_from_sitting(sitting, &self.config)?;
        info!(
            client_id = record.client_id.as_str(),
            record_id = %record.id,
            "sitting finalized"
        );
        self.history.push(record.clone());
        Ok(record)
    }

    /// Derived outputs of one record
    pub fn derive(&self, record: &MeasurementRecord, profile: &ClientProfile) -> DerivedResult {
        DerivedCalculator::derive(&record.data, profile, &self.config, &self.reference)
    }

    /// Comparison of the client's latest record with the one before it
    pub fn compare_latest(
        &self,
        profile: &ClientProfile,
    ) -> Result<ComparisonReport, ComputeError> {
        self.history
            .compare_latest(profile, &self.config, &self.reference)
            .ok_or_else(|| ComputeError::NoRecords(profile.client_id.clone()))
    }

    /// Report JSON for the client's latest record
    pub fn report(&self, profile: &ClientProfile) -> Result<String, ComputeError> {
        build_report(
            &self.history,
            profile,
            &self.config,
            &self.reference,
            &self.encoder,
        )
    }

    pub fn dashboard_summary(&self, client_id: &str) -> Option<DashboardSummary> {
        self.history.dashboard_summary(client_id, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MetricId, Trial};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn sample_records_json() -> &'static str {
        r#"[
            {
                "clientId": "client-1",
                "date": "2024-01-10",
                "evaluator": "evaluator-1",
                "basic": { "mass": 80.0, "stature": 178, "sittingHeight": 92, "armSpan": 181 },
                "skinfolds": {
                    "triceps": 12, "subscapular": 13, "biceps": 5, "iliacCrest": 17,
                    "supraspinale": 10, "abdominal": 20, "thigh": 15, "calf": 9
                },
                "girths": {
                    "armRelaxed": 31, "armFlexed": 33, "waist": 84, "hip": 99,
                    "midThigh": 56, "calfGirth": 38
                },
                "breadths": { "humerus": 7.0, "femur": 9.8, "wrist": 5.8 }
            },
            {
                "clientId": "client-1",
                "date": "2024-03-01",
                "evaluator": "evaluator-1",
                "basic": { "mass": 78.5, "stature": 178, "sittingHeight": 92, "armSpan": 181 },
                "skinfolds": {
                    "triceps": 11, "subscapular": 12, "biceps": 5, "iliacCrest": 16,
                    "supraspinale": 9, "abdominal": 18, "thigh": 14, "calf": 8
                },
                "girths": {
                    "armRelaxed": 31, "armFlexed": 33.5, "waist": 82, "hip": 98,
                    "midThigh": 56, "calfGirth": 38
                },
                "breadths": { "humerus": 7.0, "femur": 9.8, "wrist": 5.8 }
            }
        ]"#
    }

    fn sample_profile_json() -> String {
        r#"{"clientId": "client-1", "age": 30}"#.to_string()
    }

    #[test]
    fn test_records_to_report() {
        let json = records_to_report(
            sample_records_json().to_string(),
            sample_profile_json(),
            &EngineConfig::default(),
        )
        .unwrap();

        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(payload["report_version"], "1.0.0");
        assert_eq!(payload["producer"]["name"], "kinanthro");
        assert_eq!(payload["comparison"]["current_date"], "2024-03-01");
        assert_eq!(payload["comparison"]["previous_date"], "2024-01-10");

        let derived = &payload["comparison"]["current_derived"];
        let bf = derived["composition"]["body_fat_percent"].as_f64().unwrap();
        assert!((bf - 13.433).abs() < 1e-9);

        let bmr = derived["energy"]["bmr_kcal"].as_f64().unwrap();
        let tdee = derived["energy"]["tdee_kcal"].as_f64().unwrap();
        assert!((bmr - 1833.759).abs() < 1e-6);
        assert!((tdee - 1.5 * bmr).abs() < 1e-9);

        let mass = payload["comparison"]["metrics"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["metric"] == "mass")
            .unwrap();
        assert_eq!(mass["diff"].as_f64(), Some(-1.5));
    }

    #[test]
    fn test_unknown_client_has_no_records() {
        let result = records_to_report(
            sample_records_json().to_string(),
            r#"{"client_id": "client-2", "age": 41}"#.to_string(),
            &EngineConfig::default(),
        );
        assert!(matches!(result, Err(ComputeError::NoRecords(_))));
    }

    #[test]
    fn test_invalid_json() {
        let result = records_to_report(
            "not json".to_string(),
            sample_profile_json(),
            &EngineConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reconcile_sitting_json() {
        let json = r#"{
            "client_id": "client-1",
            "date": "2024-03-01",
            "evaluator": "evaluator-1",
            "trials": {
                "triceps": {"v1": 11.0, "v2": 11.6},
                "humerus": {"v1": 6.5, "v2": 6.8}
            }
        }"#;
        let outcome = reconcile_sitting_json(json, &EngineConfig::default()).unwrap();
        let outcome: serde_json::Value = serde_json::from_str(&outcome).unwrap();

        let reconciliations = outcome["reconciliations"].as_array().unwrap();
        assert_eq!(reconciliations.len(), 2);
        let humerus = reconciliations
            .iter()
            .find(|r| r["metric"] == "humerus")
            .unwrap();
        assert_eq!(humerus["needs_third"], true);
        assert!(humerus["final_value"].is_null());
        assert_eq!(outcome["missing"].as_array().unwrap().len(), 19);

        let finalized = finalize_sitting_json(json, &EngineConfig::default());
        assert!(matches!(
            finalized,
            Err(ComputeError::IncompleteMeasurement(_))
        ));
    }

    #[test]
    fn test_engine_history_roundtrip() {
        let mut engine = AnthropometricEngine::new();
        assert_eq!(engine.import_records(sample_records_json()).unwrap(), 2);

        let saved = engine.save_history().unwrap();
        let mut restored = AnthropometricEngine::new();
        restored.load_history(&saved).unwrap();
        assert_eq!(restored.history().len(), 2);

        let profile: ClientProfile = serde_json::from_str(&sample_profile_json()).unwrap();
        let comparison = restored.compare_latest(&profile).unwrap();
        assert!(comparison.previous_record_id.is_some());

        let summary = restored.dashboard_summary("client-1").unwrap();
        assert_eq!(summary.mass_kg, Some(78.5));
    }

    #[test]
    fn test_engine_record_sitting() {
        let mut engine = AnthropometricEngine::with_config(EngineConfig {
            require_complete_sitting: false,
            ..EngineConfig::default()
        });
        let trials = BTreeMap::from([
            (MetricId::Mass, Trial::new(78.4, 78.6)),
            (MetricId::Stature, Trial::new(178.0, 178.2)),
        ]);
        let sitting = SittingInput {
            client_id: "client-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            evaluator: "evaluator-1".to_string(),
            trials,
        };

        let record = engine.record_sitting(&sitting).unwrap();
        assert_eq!(engine.history().len(), 1);
        assert!((record.data.get(MetricId::Mass).unwrap() - 78.5).abs() < 1e-9);

        let profile = ClientProfile {
            client_id: "client-1".to_string(),
            age: 30,
            sex: None,
        };
        let derived = engine.derive(&record, &profile);
        assert!(derived.indices.bmi.is_some());
        assert_eq!(derived.composition.body_fat_percent, None);

        let report: serde_json::Value =
            serde_json::from_str(&engine.report(&profile).unwrap()).unwrap();
        assert!(report["quality"]["flags"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f == "no_previous_record"));
    }
}
