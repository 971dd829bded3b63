//! Record aggregation
//!
//! This module compares a client's current record with the previous one.
//! History is kept as plain records; derived values are recomputed on demand
//! and never stored.

use crate::config::EngineConfig;
use crate::derived::composition::compute_composition;
use crate::derived::{DerivedCalculator, Inputs};
use crate::reference::ReferenceTable;
use crate::types::{
    ClientProfile, ComparisonReport, DashboardSummary, DerivedComparison, DerivedResult,
    MeasurementRecord, MetricComparison, MetricId, ZScore,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregator for building current-vs-previous comparisons
pub struct RecordAggregator;

impl RecordAggregator {
    /// Compare the current record with an optional previous one.
    ///
    /// Without a previous record every diff and percent change is `None`.
    pub fn compare(
        current: &MeasurementRecord,
        previous: Option<&MeasurementRecord>,
        profile: &ClientProfile,
        config: &EngineConfig,
        reference: &ReferenceTable,
    ) -> ComparisonReport {
        let current_derived = DerivedCalculator::derive(&current.data, profile, config, reference);
        let previous_derived =
            previous.map(|p| DerivedCalculator::derive(&p.data, profile, config, reference));

        debug!(
            client_id = current.client_id.as_str(),
            has_previous = previous.is_some(),
            "comparing records"
        );

        let metrics = MetricId::ALL
            .into_iter()
            .map(|metric| {
                let now = current.data.get(metric);
                let before = previous.and_then(|p| p.data.get(metric));
                MetricComparison {
                    metric,
                    section: metric.section(),
                    current: now,
                    previous: before,
                    diff: difference(now, before),
                    percent_change: percent_change(now, before),
                    z_score: lookup_z(&current_derived.z_scores, metric),
                    proportional_z_score: lookup_z(&current_derived.proportional_z_scores, metric),
                }
            })
            .collect();

        let derived = compare_derived(&current_derived, previous_derived.as_ref());

        ComparisonReport {
            client_id: current.client_id.clone(),
            current_record_id: current.id,
            current_date: current.date,
            previous_record_id: previous.map(|p| p.id),
            previous_date: previous.map(|p| p.date),
            metrics,
            derived,
            current_derived,
            previous_derived,
        }
    }
}

fn lookup_z(scores: &BTreeMap<MetricId, ZScore>, metric: MetricId) -> ZScore {
    scores
        .get(&metric)
        .copied()
        .unwrap_or_else(ZScore::missing_value)
}

/// current − previous, when both exist
pub fn difference(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(current? - previous?)
}

/// Change relative to previous as a percentage; undefined for a zero previous value
pub fn percent_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(curr), Some(prev)) if prev != 0.0 => Some((curr - prev) / prev * 100.0),
        _ => None,
    }
}

fn compare_derived(
    current: &DerivedResult,
    previous: Option<&DerivedResult>,
) -> Vec<DerivedComparison> {
    let before = previous.map(DerivedResult::flatten).unwrap_or_default();
    current
        .flatten()
        .into_iter()
        .map(|(name, now)| {
            let prev = before.get(name).copied().flatten();
            DerivedComparison {
                name: name.to_string(),
                current: now,
                previous: prev,
                diff: difference(now, prev),
                percent_change: percent_change(now, prev),
            }
        })
        .collect()
}

/// Finalized records of one or more clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientHistory {
    records: Vec<MeasurementRecord>,
}

impl ClientHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = MeasurementRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    pub fn push(&mut self, record: MeasurementRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A client's records, oldest first. Records sharing a date keep their
    /// insertion order, so the later insertion counts as more recent.
    pub fn for_client(&self, client_id: &str) -> Vec<&MeasurementRecord> {
        let mut records: Vec<&MeasurementRecord> = self
            .records
            .iter()
            .filter(|r| r.client_id == client_id)
            .collect();
        records.sort_by_key(|r| r.date);
        records
    }

    /// Most recent record and the one before it
    pub fn current_and_previous(
        &self,
        client_id: &str,
    ) -> Option<(&MeasurementRecord, Option<&MeasurementRecord>)> {
        let records = self.for_client(client_id);
        let (current, rest) = records.split_last()?;
        Some((*current, rest.last().copied()))
    }

    pub fn latest(&self, client_id: &str) -> Option<&MeasurementRecord> {
        self.current_and_previous(client_id).map(|(current, _)| current)
    }

    /// Compare the client's two most recent records
    pub fn compare_latest(
        &self,
        profile: &ClientProfile,
        config: &EngineConfig,
        reference: &ReferenceTable,
    ) -> Option<ComparisonReport> {
        let (current, previous) = self.current_and_previous(&profile.client_id)?;
        Some(RecordAggregator::compare(
            current, previous, profile, config, reference,
        ))
    }

    /// Headline numbers of the latest record
    pub fn dashboard_summary(
        &self,
        client_id: &str,
        config: &EngineConfig,
    ) -> Option<DashboardSummary> {
        let latest = self.latest(client_id)?;
        let inputs = Inputs::new(&latest.data, config.missing_data_policy);
        let composition = compute_composition(&inputs, config.bone_mass_fraction);

        Some(DashboardSummary {
            client_id: latest.client_id.clone(),
            record_id: latest.id,
            date: latest.date,
            mass_kg: latest.data.get(MetricId::Mass),
            body_fat_percent: composition.body_fat_percent,
        })
    }
}
