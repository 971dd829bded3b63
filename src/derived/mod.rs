//! Derived metric calculation
//!
//! This module derives every secondary output from one reconciled record:
//! - corrected limb girths
//! - body composition (Faulkner body fat, fat/muscle/bone mass)
//! - Heath-Carter somatotype and category
//! - regional adipose and muscle distribution
//! - energy expenditure
//! - health and performance indices
//! - plain and phantom proportional z-scores against the reference table
//!
//! Calculators are independent pure functions. A missing input only makes the
//! outputs that depend on it unavailable.

pub mod composition;
pub mod distribution;
pub mod energy;
pub mod girths;
pub mod indices;
pub mod somatotype;

use crate::config::{EngineConfig, MissingDataPolicy};
use crate::reference::ReferenceTable;
use crate::types::{AnthropometricData, ClientProfile, DerivedResult, MetricId};
use crate::zscore::ZScoreNormalizer;
use tracing::debug;

/// Read access to a record under a missing-data policy
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'a> {
    data: &'a AnthropometricData,
    policy: MissingDataPolicy,
}

impl<'a> Inputs<'a> {
    pub fn new(data: &'a AnthropometricData, policy: MissingDataPolicy) -> Self {
        Self { data, policy }
    }

    /// Strict view: missing stays missing
    pub fn strict(data: &'a AnthropometricData) -> Self {
        Self::new(data, MissingDataPolicy::Strict)
    }

    pub fn get(&self, metric: MetricId) -> Option<f64> {
        match (self.data.get(metric), self.policy) {
            (Some(value), _) => Some(value),
            (None, MissingDataPolicy::ZeroFill) => Some(0.0),
            (None, MissingDataPolicy::Strict) => None,
        }
    }

    /// Sum of the given metrics, available only when all of them are
    pub fn sum(&self, metrics: &[MetricId]) -> Option<f64> {
        metrics.iter().map(|m| self.get(*m)).sum()
    }

    /// Whether any value would be substituted by the policy
    pub fn zero_filled(&self) -> bool {
        self.policy == MissingDataPolicy::ZeroFill && self.data.len() < MetricId::ALL.len()
    }
}

/// Guarded division: unavailable unless both sides exist and the
/// denominator is strictly positive
pub(crate) fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d > 0.0 {
        Some(n / d).filter(|v| v.is_finite())
    } else {
        None
    }
}

/// Calculator for the full derived result
pub struct DerivedCalculator;

impl DerivedCalculator {
    /// Derive every output from one record and the client's profile
    pub fn derive(
        data: &AnthropometricData,
        profile: &ClientProfile,
        config: &EngineConfig,
        reference: &ReferenceTable,
    ) -> DerivedResult {
        let inputs = Inputs::new(data, config.missing_data_policy);
        if inputs.zero_filled() {
            debug!(
                client_id = profile.client_id.as_str(),
                missing = data.missing().len(),
                "reading missing metrics as zero"
            );
        }

        let corrected_girths = girths::compute_corrected_girths(&inputs);
        let composition = composition::compute_composition(&inputs, config.bone_mass_fraction);
        let somatotype = somatotype::compute_somatotype(&inputs);
        let adipose_distribution = distribution::compute_adipose_distribution(&inputs);
        let muscle_distribution = distribution::compute_muscle_distribution(&corrected_girths);
        let energy = energy::compute_energy(&inputs, profile, config);
        let indices = indices::compute_indices(&inputs, &composition);
        let z_scores = ZScoreNormalizer::z_scores(data, reference);
        let proportional_z_scores = ZScoreNormalizer::proportional_z_scores(data, reference);

        DerivedResult {
            corrected_girths,
            composition,
            somatotype,
            adipose_distribution,
            muscle_distribution,
            energy,
            indices,
            z_scores,
            proportional_z_scores,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{AnthropometricData, ClientProfile, MetricId};

    /// Complete record of a trained adult male
    pub fn sample_data() -> AnthropometricData {
        AnthropometricData::new([
            (MetricId::Mass, 78.5),
            (MetricId::Stature, 178.0),
            (MetricId::SittingHeight, 92.0),
            (MetricId::ArmSpan, 181.0),
            (MetricId::Triceps, 11.0),
            (MetricId::Subscapular, 12.0),
            (MetricId::Biceps, 5.0),
            (MetricId::IliacCrest, 16.0),
            (MetricId::Supraspinale, 9.0),
            (MetricId::Abdominal, 18.0),
            (MetricId::Thigh, 14.0),
            (MetricId::Calf, 8.0),
            (MetricId::ArmRelaxed, 31.0),
            (MetricId::ArmFlexed, 33.5),
            (MetricId::Waist, 82.0),
            (MetricId::Hip, 98.0),
            (MetricId::MidThigh, 56.0),
            (MetricId::CalfGirth, 38.0),
            (MetricId::Humerus, 7.0),
            (MetricId::Femur, 9.8),
            (MetricId::Wrist, 5.8),
        ])
        .unwrap()
    }

    pub fn sample_profile() -> ClientProfile {
        ClientProfile {
            client_id: "client-1".to_string(),
            age: 30,
            sex: None,
        }
    }

    /// Sample record with some metrics removed
    pub fn sample_data_without(removed: &[MetricId]) -> AnthropometricData {
        AnthropometricData::new(
            sample_data()
                .iter()
                .filter(|(m, _)| !removed.contains(m)),
        )
        .unwrap()
    }
}
