//! Heath-Carter anthropometric somatotype
//!
//! Endomorphy (relative fatness), mesomorphy (musculoskeletal robustness) and
//! ectomorphy (linearity), plus the somatochart coordinates and the
//! thirteen-way category.
//!
//! # Scientific References
//!
//! - Carter, J.E.L. & Heath, B.H. (1990). "Somatotyping: Development and
//!   Applications". Cambridge University Press.

use super::Inputs;
use crate::types::{MetricId, Somatotype, SomatotypeCategory};
use std::cmp::Ordering;

/// Ectomorphy never drops below this rating
pub const ECTOMORPHY_FLOOR: f64 = 0.1;

/// Components closer than this are treated as equal when categorizing
pub const CATEGORY_TIE_TOLERANCE: f64 = 0.5;

/// Endomorphy from triceps + subscapular + supraspinale (mm)
pub fn endomorphy(sum3_mm: f64) -> f64 {
    -0.7182 + 0.1451 * sum3_mm - 0.00068 * sum3_mm.powi(2) + 0.0000014 * sum3_mm.powi(3)
}

/// Skeletal and girth measurements used for mesomorphy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MesomorphyInputs {
    /// Humerus breadth (cm)
    pub humerus: f64,
    /// Femur breadth (cm)
    pub femur: f64,
    /// Flexed and tensed arm girth (cm)
    pub arm_flexed: f64,
    /// Triceps skinfold (mm)
    pub triceps: f64,
    /// Calf girth (cm)
    pub calf_girth: f64,
    /// Medial calf skinfold (mm)
    pub calf_skinfold: f64,
    /// Stature (cm)
    pub stature: f64,
}

pub fn mesomorphy(m: &MesomorphyInputs) -> f64 {
    let arm_corrected = m.arm_flexed - m.triceps / 10.0;
    let calf_corrected = m.calf_girth - m.calf_skinfold / 10.0;
    0.858 * m.humerus + 0.601 * m.femur + 0.188 * arm_corrected + 0.161 * calf_corrected
        - 0.131 * m.stature
        + 4.5
}

/// Height-weight ratio: stature / ∛mass. Unavailable for non-positive mass.
pub fn height_weight_ratio(stature_cm: f64, mass_kg: f64) -> Option<f64> {
    if mass_kg > 0.0 {
        Some(stature_cm / mass_kg.cbrt())
    } else {
        None
    }
}

/// Ectomorphy from the height-weight ratio, floored at 0.1
pub fn ectomorphy(hwr: f64) -> f64 {
    let rating = if hwr >= 40.75 {
        0.732 * hwr - 28.58
    } else if hwr >= 38.25 {
        0.463 * hwr - 17.63
    } else {
        ECTOMORPHY_FLOOR
    };
    // the middle branch dips to ~0.09 right at 38.25
    rating.max(ECTOMORPHY_FLOOR)
}

/// Somatochart (x, y) coordinates
pub fn somatochart(endo: f64, meso: f64, ecto: f64) -> (f64, f64) {
    (ecto - endo, 2.0 * meso - (ecto + endo))
}

/// Tolerant comparison of two components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rel {
    Lt,
    Eq,
    Gt,
}

fn relate(a: f64, b: f64) -> Rel {
    if (a - b).abs() < CATEGORY_TIE_TOLERANCE {
        Rel::Eq
    } else {
        match a.total_cmp(&b) {
            Ordering::Greater => Rel::Gt,
            _ => Rel::Lt,
        }
    }
}

/// (endo vs meso, endo vs ecto, meso vs ecto) → category.
///
/// Rows with a chain of ties (a ≈ b, b ≈ c, a ≠ c) fall within one unit of
/// each other and are read as central. The eight patterns not listed cannot
/// arise from real numbers.
const CATEGORY_TABLE: [((Rel, Rel, Rel), SomatotypeCategory); 19] = [
    ((Rel::Eq, Rel::Eq, Rel::Eq), SomatotypeCategory::Central),
    ((Rel::Eq, Rel::Eq, Rel::Gt), SomatotypeCategory::Central),
    ((Rel::Eq, Rel::Eq, Rel::Lt), SomatotypeCategory::Central),
    ((Rel::Eq, Rel::Gt, Rel::Eq), SomatotypeCategory::Central),
    ((Rel::Eq, Rel::Lt, Rel::Eq), SomatotypeCategory::Central),
    ((Rel::Gt, Rel::Eq, Rel::Eq), SomatotypeCategory::Central),
    ((Rel::Lt, Rel::Eq, Rel::Eq), SomatotypeCategory::Central),
    ((Rel::Gt, Rel::Gt, Rel::Eq), SomatotypeCategory::BalancedEndomorph),
    ((Rel::Gt, Rel::Gt, Rel::Gt), SomatotypeCategory::MesomorphicEndomorph),
    ((Rel::Gt, Rel::Gt, Rel::Lt), SomatotypeCategory::EctomorphicEndomorph),
    ((Rel::Eq, Rel::Gt, Rel::Gt), SomatotypeCategory::EndomorphMesomorph),
    ((Rel::Lt, Rel::Gt, Rel::Gt), SomatotypeCategory::EndomorphicMesomorph),
    ((Rel::Lt, Rel::Eq, Rel::Gt), SomatotypeCategory::BalancedMesomorph),
    ((Rel::Lt, Rel::Lt, Rel::Gt), SomatotypeCategory::EctomorphicMesomorph),
    ((Rel::Lt, Rel::Lt, Rel::Eq), SomatotypeCategory::MesomorphEctomorph),
    ((Rel::Lt, Rel::Lt, Rel::Lt), SomatotypeCategory::MesomorphicEctomorph),
    ((Rel::Eq, Rel::Lt, Rel::Lt), SomatotypeCategory::BalancedEctomorph),
    ((Rel::Gt, Rel::Lt, Rel::Lt), SomatotypeCategory::EndomorphicEctomorph),
    ((Rel::Gt, Rel::Eq, Rel::Lt), SomatotypeCategory::EndomorphEctomorph),
];

/// Category for a somatotype rating
pub fn categorize(endo: f64, meso: f64, ecto: f64) -> SomatotypeCategory {
    let key = (relate(endo, meso), relate(endo, ecto), relate(meso, ecto));
    CATEGORY_TABLE
        .iter()
        .find(|(pattern, _)| *pattern == key)
        .map(|(_, category)| *category)
        .unwrap_or(SomatotypeCategory::Central)
}

pub fn compute_somatotype(inputs: &Inputs<'_>) -> Somatotype {
    let endo = inputs
        .sum(&[MetricId::Triceps, MetricId::Subscapular, MetricId::Supraspinale])
        .map(endomorphy);

    let meso = (|| {
        Some(mesomorphy(&MesomorphyInputs {
            humerus: inputs.get(MetricId::Humerus)?,
            femur: inputs.get(MetricId::Femur)?,
            arm_flexed: inputs.get(MetricId::ArmFlexed)?,
            triceps: inputs.get(MetricId::Triceps)?,
            calf_girth: inputs.get(MetricId::CalfGirth)?,
            calf_skinfold: inputs.get(MetricId::Calf)?,
            stature: inputs.get(MetricId::Stature)?,
        }))
    })();

    let hwr = match (inputs.get(MetricId::Stature), inputs.get(MetricId::Mass)) {
        (Some(stature), Some(mass)) => height_weight_ratio(stature, mass),
        _ => None,
    };
    let ecto = hwr.map(ectomorphy);

    let (x, y, category) = match (endo, meso, ecto) {
        (Some(endo), Some(meso), Some(ecto)) => {
            let (x, y) = somatochart(endo, meso, ecto);
            (Some(x), Some(y), Some(categorize(endo, meso, ecto)))
        }
        _ => (None, None, None),
    };

    Somatotype {
        endomorphy: endo,
        mesomorphy: meso,
        ectomorphy: ecto,
        height_weight_ratio: hwr,
        x,
        y,
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::test_support::{sample_data, sample_data_without};

    #[test]
    fn test_endomorphy_reference_vector() {
        // triceps 11 + subscapular 12 + supraspinale 9
        let sum3: f64 = 32.0;
        let expected =
            -0.7182 + 0.1451 * sum3 - 0.00068 * sum3 * sum3 + 0.0000014 * sum3 * sum3 * sum3;
        assert!((endomorphy(sum3) - expected).abs() < 1e-2);
        assert!((endomorphy(sum3) - 3.2745).abs() < 1e-2);
    }

    #[test]
    fn test_mesomorphy() {
        let m = MesomorphyInputs {
            humerus: 7.0,
            femur: 9.8,
            arm_flexed: 33.5,
            triceps: 11.0,
            calf_girth: 38.0,
            calf_skinfold: 8.0,
            stature: 178.0,
        };
        let expected = 0.858 * 7.0 + 0.601 * 9.8 + 0.188 * (33.5 - 1.1) + 0.161 * (38.0 - 0.8)
            - 0.131 * 178.0
            + 4.5;
        assert!((mesomorphy(&m) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_ectomorphy_branches() {
        assert!((ectomorphy(42.0) - (0.732 * 42.0 - 28.58)).abs() < 1e-12);
        assert!((ectomorphy(39.5) - (0.463 * 39.5 - 17.63)).abs() < 1e-12);
        assert_eq!(ectomorphy(36.0), ECTOMORPHY_FLOOR);
        assert_eq!(ectomorphy(38.25), ECTOMORPHY_FLOOR);
    }

    #[test]
    fn test_height_weight_ratio_guards_mass() {
        assert_eq!(height_weight_ratio(178.0, 0.0), None);
        let hwr = height_weight_ratio(178.0, 78.5).unwrap();
        assert!((hwr - 178.0 / 78.5_f64.cbrt()).abs() < 1e-12);
    }

    #[test]
    fn test_somatochart() {
        let (x, y) = somatochart(3.0, 5.0, 2.0);
        assert_eq!(x, -1.0);
        assert_eq!(y, 5.0);
    }

    #[test]
    fn test_categories() {
        assert_eq!(categorize(4.0, 4.2, 1.0), SomatotypeCategory::EndomorphMesomorph);
        assert_eq!(categorize(4.0, 4.2, 1.0).label(), "Endomorfo-Mesomorfo");
        assert_eq!(categorize(3.0, 3.2, 3.1), SomatotypeCategory::Central);
        assert_eq!(categorize(2.0, 5.0, 1.0), SomatotypeCategory::EndomorphicMesomorph);
        assert_eq!(categorize(1.5, 5.0, 1.6), SomatotypeCategory::BalancedMesomorph);
        assert_eq!(categorize(1.0, 4.0, 2.5), SomatotypeCategory::EctomorphicMesomorph);
        assert_eq!(categorize(1.0, 3.0, 3.2), SomatotypeCategory::MesomorphEctomorph);
        assert_eq!(categorize(1.0, 2.5, 4.0), SomatotypeCategory::MesomorphicEctomorph);
        assert_eq!(categorize(2.0, 2.1, 4.0), SomatotypeCategory::BalancedEctomorph);
        assert_eq!(categorize(2.5, 1.0, 4.0), SomatotypeCategory::EndomorphicEctomorph);
        assert_eq!(categorize(4.0, 1.0, 4.1), SomatotypeCategory::EndomorphEctomorph);
        assert_eq!(categorize(5.0, 1.0, 2.5), SomatotypeCategory::EctomorphicEndomorph);
        assert_eq!(categorize(5.0, 2.0, 2.1), SomatotypeCategory::BalancedEndomorph);
        assert_eq!(categorize(6.0, 4.0, 1.0), SomatotypeCategory::MesomorphicEndomorph);
        // chained ties: endo ≈ meso, endo ≈ ecto, meso > ecto
        assert_eq!(categorize(3.0, 3.4, 2.6), SomatotypeCategory::Central);
    }

    #[test]
    fn test_compute_somatotype() {
        let data = sample_data();
        let s = compute_somatotype(&Inputs::strict(&data));
        assert!(s.endomorphy.is_some());
        assert!(s.mesomorphy.is_some());
        assert!(s.ectomorphy.unwrap() >= ECTOMORPHY_FLOOR);
        assert!(s.category.is_some());
    }

    #[test]
    fn test_missing_breadth_only_drops_mesomorphy() {
        let data = sample_data_without(&[MetricId::Femur]);
        let s = compute_somatotype(&Inputs::strict(&data));
        assert!(s.endomorphy.is_some());
        assert!(s.ectomorphy.is_some());
        assert_eq!(s.mesomorphy, None);
        assert_eq!(s.category, None);
        assert_eq!(s.x, None);
    }
}
