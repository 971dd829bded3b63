//! Body composition
//!
//! Faulkner (1968) four-site body fat and a two-compartment split of body mass.
//! The muscle figure is mass minus fat mass and the bone figure is a fixed share
//! of mass; both are screening approximations, not a validated multi-component
//! model.

use super::Inputs;
use crate::types::{BodyComposition, MetricId};

pub const FAULKNER_SITES: [MetricId; 4] = [
    MetricId::Triceps,
    MetricId::Subscapular,
    MetricId::Supraspinale,
    MetricId::Abdominal,
];

pub const SUM6_SITES: [MetricId; 6] = [
    MetricId::Triceps,
    MetricId::Subscapular,
    MetricId::Supraspinale,
    MetricId::Abdominal,
    MetricId::Thigh,
    MetricId::Calf,
];

pub const SUM8_SITES: [MetricId; 8] = [
    MetricId::Triceps,
    MetricId::Subscapular,
    MetricId::Biceps,
    MetricId::IliacCrest,
    MetricId::Supraspinale,
    MetricId::Abdominal,
    MetricId::Thigh,
    MetricId::Calf,
];

/// Faulkner body fat percentage from the four-site skinfold sum (mm)
pub fn faulkner_body_fat(sum4_mm: f64) -> f64 {
    sum4_mm * 0.153 + 5.783
}

pub fn compute_composition(inputs: &Inputs<'_>, bone_mass_fraction: f64) -> BodyComposition {
    let sum4_skinfolds = inputs.sum(&FAULKNER_SITES);
    let body_fat_percent = sum4_skinfolds.map(faulkner_body_fat);
    let mass = inputs.get(MetricId::Mass);

    let fat_mass_kg = match (mass, body_fat_percent) {
        (Some(mass), Some(bf)) => Some(mass * bf / 100.0),
        _ => None,
    };
    let muscle_mass_kg = match (mass, fat_mass_kg) {
        (Some(mass), Some(fat)) => Some(mass - fat),
        _ => None,
    };

    BodyComposition {
        sum4_skinfolds,
        sum6_skinfolds: inputs.sum(&SUM6_SITES),
        sum8_skinfolds: inputs.sum(&SUM8_SITES),
        body_fat_percent,
        fat_mass_kg,
        muscle_mass_kg,
        bone_mass_kg: mass.map(|m| m * bone_mass_fraction),
    }
}
