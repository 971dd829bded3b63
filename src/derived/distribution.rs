//! Regional adipose and muscle distribution
//!
//! Adipose distribution splits the eight-site skinfold sum into upper body,
//! trunk and lower limb shares. Muscle distribution does the same for the
//! three corrected limb girths.

use super::Inputs;
use crate::types::{AdiposeDistribution, CorrectedGirths, MetricId, MuscleDistribution};

pub const SUPERIOR_SITES: [MetricId; 3] =
    [MetricId::Triceps, MetricId::Subscapular, MetricId::Biceps];

pub const CENTRAL_SITES: [MetricId; 3] = [
    MetricId::Abdominal,
    MetricId::Supraspinale,
    MetricId::IliacCrest,
];

pub const INFERIOR_SITES: [MetricId; 2] = [MetricId::Thigh, MetricId::Calf];

/// Each part as a percentage of their total. An all-zero total gives 0% for
/// every part rather than a division by zero.
fn shares<const N: usize>(parts: [f64; N]) -> [f64; N] {
    let total: f64 = parts.iter().sum();
    if total > 0.0 {
        parts.map(|p| p / total * 100.0)
    } else {
        [0.0; N]
    }
}

/// Superior, central and inferior share of the eight skinfolds.
///
/// All three need every one of the eight sites.
pub fn compute_adipose_distribution(inputs: &Inputs<'_>) -> AdiposeDistribution {
    let regions = (
        inputs.sum(&SUPERIOR_SITES),
        inputs.sum(&CENTRAL_SITES),
        inputs.sum(&INFERIOR_SITES),
    );

    match regions {
        (Some(superior), Some(central), Some(inferior)) => {
            let [superior, central, inferior] = shares([superior, central, inferior]);
            AdiposeDistribution {
                superior_percent: Some(superior),
                central_percent: Some(central),
                inferior_percent: Some(inferior),
            }
        }
        _ => AdiposeDistribution::default(),
    }
}

/// Arm, thigh and calf share of the corrected girth total
pub fn compute_muscle_distribution(girths: &CorrectedGirths) -> MuscleDistribution {
    match (girths.arm, girths.thigh, girths.calf) {
        (Some(arm), Some(thigh), Some(calf)) => {
            let [arm, thigh, calf] = shares([arm, thigh, calf]);
            MuscleDistribution {
                arm_percent: Some(arm),
                thigh_percent: Some(thigh),
                calf_percent: Some(calf),
            }
        }
        _ => MuscleDistribution::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingDataPolicy;
    use crate::derived::test_support::{sample_data, sample_data_without};
    use crate::types::AnthropometricData;

    #[test]
    fn test_adipose_distribution_sums_to_100() {
        let data = sample_data();
        let d = compute_adipose_distribution(&Inputs::strict(&data));

        // 28 / 43 / 22 of 93 mm
        assert!((d.superior_percent.unwrap() - 28.0 / 93.0 * 100.0).abs() < 1e-9);
        assert!((d.central_percent.unwrap() - 43.0 / 93.0 * 100.0).abs() < 1e-9);
        let total =
            d.superior_percent.unwrap() + d.central_percent.unwrap() + d.inferior_percent.unwrap();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_adipose_distribution_missing_site() {
        let data = sample_data_without(&[MetricId::Biceps]);
        let d = compute_adipose_distribution(&Inputs::strict(&data));
        assert_eq!(d, AdiposeDistribution::default());
    }

    #[test]
    fn test_adipose_distribution_zero_sum() {
        let data = AnthropometricData::new([(MetricId::Mass, 70.0)]).unwrap();
        let d = compute_adipose_distribution(&Inputs::new(&data, MissingDataPolicy::ZeroFill));
        assert_eq!(d.superior_percent, Some(0.0));
        assert_eq!(d.central_percent, Some(0.0));
        assert_eq!(d.inferior_percent, Some(0.0));
    }

    #[test]
    fn test_muscle_distribution() {
        let girths = CorrectedGirths {
            arm: Some(25.0),
            thigh: Some(50.0),
            calf: Some(25.0),
        };
        let d = compute_muscle_distribution(&girths);
        assert_eq!(d.arm_percent, Some(25.0));
        assert_eq!(d.thigh_percent, Some(50.0));
        assert_eq!(d.calf_percent, Some(25.0));
    }

    #[test]
    fn test_muscle_distribution_needs_all_girths() {
        let girths = CorrectedGirths {
            arm: Some(25.0),
            thigh: None,
            calf: Some(25.0),
        };
        assert_eq!(
            compute_muscle_distribution(&girths),
            MuscleDistribution::default()
        );
    }
}
