//! Energy expenditure
//!
//! Harris-Benedict basal metabolic rate and total daily energy expenditure.
//! The default equation uses the male constants for every client; the
//! sex-specific variant is opt-in through [`BmrEquation::HarrisBenedictBySex`].

use super::Inputs;
use crate::config::EngineConfig;
use crate::types::{BmrEquation, ClientProfile, EnergyExpenditure, MetricId, Sex};

/// Basal metabolic rate (kcal/day) from mass (kg), stature (cm) and age (years)
pub fn bmr(
    mass_kg: f64,
    stature_cm: f64,
    age_years: f64,
    sex: Option<Sex>,
    equation: BmrEquation,
) -> f64 {
    match (equation, sex) {
        (BmrEquation::HarrisBenedictBySex, Some(Sex::Female)) => {
            655.1 + 9.563 * mass_kg + 1.850 * stature_cm - 4.676 * age_years
        }
        _ => 66.5 + 13.75 * mass_kg + 5.003 * stature_cm - 6.755 * age_years,
    }
}

pub fn compute_energy(
    inputs: &Inputs<'_>,
    profile: &ClientProfile,
    config: &EngineConfig,
) -> EnergyExpenditure {
    let bmr_kcal = match (inputs.get(MetricId::Mass), inputs.get(MetricId::Stature)) {
        (Some(mass), Some(stature)) => Some(bmr(
            mass,
            stature,
            f64::from(profile.age),
            profile.sex,
            config.bmr_equation,
        )),
        _ => None,
    };

    EnergyExpenditure {
        bmr_kcal,
        tdee_kcal: bmr_kcal.map(|b| b * config.activity_factor),
        activity_factor: config.activity_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActivityLevel;
    use crate::derived::test_support::{sample_data, sample_data_without, sample_profile};

    #[test]
    fn test_bmr_reference_vector() {
        let value = bmr(78.5, 178.0, 30.0, None, BmrEquation::SexNeutral);
        assert!((value - 1833.759).abs() < 1e-6);
    }

    #[test]
    fn test_tdee_uses_activity_factor() {
        let data = sample_data();
        let e = compute_energy(&Inputs::strict(&data), &sample_profile(), &EngineConfig::default());
        assert!((e.tdee_kcal.unwrap() - 1833.759 * 1.5).abs() < 1e-6);
        assert_eq!(e.activity_factor, 1.5);

        let config = EngineConfig::default().with_activity_level(ActivityLevel::Sedentary);
        let e = compute_energy(&Inputs::strict(&data), &sample_profile(), &config);
        assert!((e.tdee_kcal.unwrap() - 1833.759 * 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_sex_specific_equation() {
        let female = bmr(60.0, 165.0, 30.0, Some(Sex::Female), BmrEquation::HarrisBenedictBySex);
        assert!((female - (655.1 + 9.563 * 60.0 + 1.850 * 165.0 - 4.676 * 30.0)).abs() < 1e-9);

        // Sex is ignored under the default equation
        let neutral = bmr(60.0, 165.0, 30.0, Some(Sex::Female), BmrEquation::SexNeutral);
        let male = bmr(60.0, 165.0, 30.0, Some(Sex::Male), BmrEquation::HarrisBenedictBySex);
        assert_eq!(neutral, male);
    }

    #[test]
    fn test_missing_stature() {
        let data = sample_data_without(&[MetricId::Stature]);
        let e = compute_energy(&Inputs::strict(&data), &sample_profile(), &EngineConfig::default());
        assert_eq!(e.bmr_kcal, None);
        assert_eq!(e.tdee_kcal, None);
    }
}
