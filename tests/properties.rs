//! Property tests for the numeric guarantees of the engine

use kinanthro::derived::distribution::compute_adipose_distribution;
use kinanthro::derived::energy::{bmr, compute_energy};
use kinanthro::derived::girths::corrected_girth;
use kinanthro::derived::somatotype::{ectomorphy, ECTOMORPHY_FLOOR};
use kinanthro::derived::Inputs;
use kinanthro::types::{
    AnthropometricData, BmrEquation, ClientProfile, MetricId, ReconciliationMethod, Trial,
};
use kinanthro::{EngineConfig, Reconciler, ToleranceConfig, ZScoreNormalizer};
use proptest::prelude::*;

proptest! {
    /// Property: two skinfold readings within 1 mm are averaged
    #[test]
    fn prop_mean_within_tolerance(v1 in 0.0f64..70.0, delta in 0.0f64..0.99) {
        let v2 = v1 + delta;
        let trial = Trial::new(v1, v2);
        let tolerances = ToleranceConfig::default();
        let r = Reconciler::reconcile(MetricId::Triceps, &trial, &tolerances).unwrap();
        prop_assert_eq!(r.method, ReconciliationMethod::Mean);
        prop_assert_eq!(r.final_value, Some((v1 + v2) / 2.0));
    }

    /// Property: with a required third reading the median is kept
    #[test]
    fn prop_median_when_third_required(
        v1 in 0.0f64..40.0,
        gap in 1.5f64..20.0,
        v3 in 0.0f64..80.0,
    ) {
        let v2 = v1 + gap;
        let trial = Trial::with_third(v1, v2, v3);
        let tolerances = ToleranceConfig::default();
        let r = Reconciler::reconcile(MetricId::Thigh, &trial, &tolerances).unwrap();
        let expected = v3.clamp(v1, v2);
        prop_assert_eq!(r.method, ReconciliationMethod::Median);
        prop_assert_eq!(r.final_value, Some(expected));
    }

    /// Property: a value k standard deviations from the mean scores exactly k
    #[test]
    fn prop_z_counts_standard_deviations(
        mean in -100.0f64..100.0,
        sd in 0.01f64..50.0,
        k in 0.0f64..5.0,
    ) {
        let above = ZScoreNormalizer::score(mean + k * sd, mean, sd).unwrap();
        let below = ZScoreNormalizer::score(mean - k * sd, mean, sd).unwrap();
        prop_assert!((above - k).abs() < 1e-9);
        prop_assert!((below + k).abs() < 1e-9);
    }

    /// Property: ectomorphy never drops below its floor
    #[test]
    fn prop_ectomorphy_floor(hwr in 20.0f64..60.0) {
        prop_assert!(ectomorphy(hwr) >= ECTOMORPHY_FLOOR);
    }

    /// Property: adipose regions add up to 100%
    #[test]
    fn prop_adipose_regions_sum_to_100(folds in prop::array::uniform8(0.5f64..60.0)) {
        let sites = [
            MetricId::Triceps,
            MetricId::Subscapular,
            MetricId::Biceps,
            MetricId::IliacCrest,
            MetricId::Supraspinale,
            MetricId::Abdominal,
            MetricId::Thigh,
            MetricId::Calf,
        ];
        let data = AnthropometricData::new(sites.into_iter().zip(folds)).unwrap();
        let d = compute_adipose_distribution(&Inputs::strict(&data));
        let total = d.superior_percent.unwrap()
            + d.central_percent.unwrap()
            + d.inferior_percent.unwrap();
        prop_assert!((total - 100.0).abs() < 1e-9);
    }

    /// Property: correcting a girth never makes it larger
    #[test]
    fn prop_corrected_girth_not_above_raw(girth in 5.0f64..100.0, fold in 0.0f64..60.0) {
        prop_assert!(corrected_girth(girth, fold) <= girth);
    }

    /// Property: TDEE is BMR times the default activity factor
    #[test]
    fn prop_tdee_scales_bmr(
        mass in 40.0f64..150.0,
        stature in 140.0f64..210.0,
        age in 18u32..80,
    ) {
        let data = AnthropometricData::new([(MetricId::Mass, mass), (MetricId::Stature, stature)])
            .unwrap();
        let profile = ClientProfile {
            client_id: "c".to_string(),
            age,
            sex: None,
        };
        let e = compute_energy(&Inputs::strict(&data), &profile, &EngineConfig::default());

        let bmr_kcal = e.bmr_kcal.unwrap();
        let tdee_kcal = e.tdee_kcal.unwrap();
        let expected = bmr(mass, stature, f64::from(age), None, BmrEquation::SexNeutral);
        prop_assert_eq!(bmr_kcal, expected);
        prop_assert_eq!(tdee_kcal, bmr_kcal * 1.5);
        prop_assert!(tdee_kcal > bmr_kcal && bmr_kcal > 0.0);
    }
}
