//! Health and performance indices
//!
//! Ratios of basic measures and girths plus the composition-based indices.
//! Every division goes through [`ratio`] so a zero or missing denominator
//! leaves the index unavailable.

use super::{ratio, Inputs};
use crate::types::{BmiCategory, BodyComposition, HealthIndices, MetricId};

/// Body mass index from mass (kg) and stature (cm)
pub fn bmi(mass_kg: Option<f64>, stature_cm: Option<f64>) -> Option<f64> {
    let stature_m = stature_cm.map(|s| s / 100.0);
    ratio(mass_kg, stature_m.map(|s| s * s))
}

/// WHO adult class for a BMI value
pub fn bmi_category(bmi: f64) -> BmiCategory {
    match bmi {
        b if b < 18.5 => BmiCategory::Underweight,
        b if b < 25.0 => BmiCategory::Normal,
        b if b < 30.0 => BmiCategory::Overweight,
        b if b < 35.0 => BmiCategory::ObesityClassI,
        b if b < 40.0 => BmiCategory::ObesityClassII,
        _ => BmiCategory::ObesityClassIII,
    }
}

/// Valdez conicity index: waist (m) / (0.109 · √(mass / stature (m)))
pub fn conicity_index(
    waist_cm: Option<f64>,
    mass_kg: Option<f64>,
    stature_cm: Option<f64>,
) -> Option<f64> {
    let waist_m = waist_cm.map(|w| w / 100.0);
    let stature_m = stature_cm.map(|s| s / 100.0);
    let denominator = ratio(mass_kg, stature_m).map(|v| 0.109 * v.sqrt());
    ratio(waist_m, denominator)
}

/// DuBois body surface area (m²)
pub fn body_surface_area(mass_kg: f64, stature_cm: f64) -> Option<f64> {
    if mass_kg > 0.0 && stature_cm > 0.0 {
        Some(0.007184 * mass_kg.powf(0.425) * stature_cm.powf(0.725))
    } else {
        None
    }
}

pub fn compute_indices(inputs: &Inputs<'_>, composition: &BodyComposition) -> HealthIndices {
    let mass = inputs.get(MetricId::Mass);
    let stature = inputs.get(MetricId::Stature);
    let sitting = inputs.get(MetricId::SittingHeight);
    let waist = inputs.get(MetricId::Waist);

    let bmi = bmi(mass, stature);
    let leg_length = match (stature, sitting) {
        (Some(stature), Some(sitting)) => Some(stature - sitting),
        _ => None,
    };

    HealthIndices {
        waist_hip_ratio: ratio(waist, inputs.get(MetricId::Hip)),
        conicity_index: conicity_index(waist, mass, stature),
        bmi,
        bmi_category: bmi.map(bmi_category),
        cormic_index: ratio(sitting, stature),
        manouvrier_index: ratio(leg_length, sitting).map(|v| v * 100.0),
        relative_span: ratio(inputs.get(MetricId::ArmSpan), stature),
        body_surface_area_m2: match (mass, stature) {
            (Some(mass), Some(stature)) => body_surface_area(mass, stature),
            _ => None,
        },
        adipose_muscle_index: ratio(composition.fat_mass_kg, composition.muscle_mass_kg),
        muscle_bone_index: ratio(composition.muscle_mass_kg, composition.bone_mass_kg),
    }
}
