//! Z-score normalization
//!
//! This module scores measured values against the population reference table.
//! - Plain standard scores `(value - mean) / sd`
//! - Phantom proportional scores, scaling the value to phantom stature first
//! - Explicit status for unscored metrics, never a silent zero
//!
//! Scores always read the measured record directly. A missing-data policy
//! never turns an unmeasured metric into a score.

use crate::reference::{ReferenceEntry, ReferenceTable, PHANTOM_STATURE_CM};
use crate::types::{AnthropometricData, MetricId, ZScore};
use std::collections::BTreeMap;

/// Normalizer for scoring values against a reference table
pub struct ZScoreNormalizer;

impl ZScoreNormalizer {
    /// Raw standard score. Unavailable when the SD is not positive.
    pub fn score(value: f64, mean: f64, standard_deviation: f64) -> Option<f64> {
        if standard_deviation > 0.0 {
            Some((value - mean) / standard_deviation)
        } else {
            None
        }
    }

    /// Z-score of one metric
    pub fn z_score(metric: MetricId, value: Option<f64>, table: &ReferenceTable) -> ZScore {
        let Some(entry) = table.lookup(metric) else {
            return ZScore::no_reference();
        };
        let Some(value) = value else {
            return ZScore::missing_value();
        };
        score_entry(entry, value)
    }

    /// Z-score of every metric in the proforma
    pub fn z_scores(
        data: &AnthropometricData,
        table: &ReferenceTable,
    ) -> BTreeMap<MetricId, ZScore> {
        MetricId::ALL
            .into_iter()
            .map(|metric| (metric, Self::z_score(metric, data.get(metric), table)))
            .collect()
    }

    /// Phantom proportional z-score of every metric, scaled by the record's stature
    pub fn proportional_z_scores(
        data: &AnthropometricData,
        table: &ReferenceTable,
    ) -> BTreeMap<MetricId, ZScore> {
        let stature = data.get(MetricId::Stature);
        MetricId::ALL
            .into_iter()
            .map(|metric| {
                let z = Self::proportional_z(metric, data.get(metric), stature, table);
                (metric, z)
            })
            .collect()
    }

    /// Phantom proportional z-score.
    ///
    /// The value is scaled by `(170.18 / stature)^d` before scoring, where `d`
    /// is the metric's geometric dimension.
    pub fn proportional_z(
        metric: MetricId,
        value: Option<f64>,
        stature_cm: Option<f64>,
        table: &ReferenceTable,
    ) -> ZScore {
        let Some(entry) = table.lookup(metric) else {
            return ZScore::no_reference();
        };
        let (Some(value), Some(stature)) = (value, stature_cm.filter(|s| *s > 0.0)) else {
            return ZScore::missing_value();
        };
        let scaled = value * (PHANTOM_STATURE_CM / stature).powi(i32::from(entry.dimension));
        score_entry(entry, scaled)
    }
}

fn score_entry(entry: &ReferenceEntry, value: f64) -> ZScore {
    match ZScoreNormalizer::score(value, entry.mean, entry.standard_deviation) {
        Some(z) => ZScore::scored(z),
        None => ZScore::no_reference(),
    }
}
