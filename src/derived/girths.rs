//! Skinfold-corrected limb girths

use super::Inputs;
use crate::types::{CorrectedGirths, MetricId};
use std::f64::consts::PI;

/// Remove the subcutaneous fat ring from a limb circumference.
///
/// `girth_cm - π × (skinfold_mm / 10)`
pub fn corrected_girth(girth_cm: f64, skinfold_mm: f64) -> f64 {
    girth_cm - PI * (skinfold_mm / 10.0)
}

/// Corrected arm (relaxed), mid-thigh and calf girths
pub fn compute_corrected_girths(inputs: &Inputs<'_>) -> CorrectedGirths {
    let correct = |girth: MetricId, fold: MetricId| {
        Some(corrected_girth(inputs.get(girth)?, inputs.get(fold)?))
    };

    CorrectedGirths {
        arm: correct(MetricId::ArmRelaxed, MetricId::Triceps),
        thigh: correct(MetricId::MidThigh, MetricId::Thigh),
        calf: correct(MetricId::CalfGirth, MetricId::Calf),
    }
}
