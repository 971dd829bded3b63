//! Population reference table
//!
//! Means and standard deviations of the unisex phantom (Ross & Wilson, 1974)
//! for the metrics that have one. Wrist breadth is intentionally left out, so
//! its z-score always resolves to "no reference".

use crate::types::MetricId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Phantom stature (cm) used for proportional scaling
pub const PHANTOM_STATURE_CM: f64 = 170.18;

/// Population norm for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub metric: MetricId,
    pub mean: f64,
    pub standard_deviation: f64,
    /// Geometric dimension used when scaling to phantom stature
    /// (1 for lengths, girths, breadths and skinfolds, 3 for mass)
    pub dimension: u8,
}

const fn entry(
    metric: MetricId,
    mean: f64,
    standard_deviation: f64,
    dimension: u8,
) -> ReferenceEntry {
    ReferenceEntry {
        metric,
        mean,
        standard_deviation,
        dimension,
    }
}

const PHANTOM: [ReferenceEntry; 20] = [
    entry(MetricId::Mass, 64.58, 8.60, 3),
    entry(MetricId::Stature, 170.18, 6.29, 1),
    entry(MetricId::SittingHeight, 89.92, 4.50, 1),
    entry(MetricId::ArmSpan, 172.35, 7.41, 1),
    entry(MetricId::Triceps, 15.4, 4.47, 1),
    entry(MetricId::Subscapular, 17.2, 5.07, 1),
    entry(MetricId::Biceps, 8.0, 2.0, 1),
    entry(MetricId::IliacCrest, 22.4, 6.80, 1),
    entry(MetricId::Supraspinale, 15.4, 4.47, 1),
    entry(MetricId::Abdominal, 25.4, 7.78, 1),
    entry(MetricId::Thigh, 27.0, 8.33, 1),
    entry(MetricId::Calf, 16.0, 4.67, 1),
    entry(MetricId::ArmRelaxed, 26.89, 2.33, 1),
    entry(MetricId::ArmFlexed, 29.41, 2.37, 1),
    entry(MetricId::Waist, 71.91, 4.45, 1),
    entry(MetricId::Hip, 94.67, 5.58, 1),
    entry(MetricId::MidThigh, 55.82, 4.23, 1),
    entry(MetricId::CalfGirth, 35.25, 2.30, 1),
    entry(MetricId::Humerus, 6.48, 0.35, 1),
    entry(MetricId::Femur, 9.52, 0.48, 1),
];

/// Read-only table of population norms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTable {
    entries: BTreeMap<MetricId, ReferenceEntry>,
}

impl ReferenceTable {
    /// Build a table from arbitrary entries (later duplicates win)
    pub fn from_entries(entries: impl IntoIterator<Item = ReferenceEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.metric, e)).collect(),
        }
    }

    /// The phantom table, built once and shared by every caller
    pub fn standard() -> &'static ReferenceTable {
        static TABLE: OnceLock<ReferenceTable> = OnceLock::new();
        TABLE.get_or_init(|| ReferenceTable::from_entries(PHANTOM))
    }

    pub fn lookup(&self, metric: MetricId) -> Option<&ReferenceEntry> {
        self.entries.get(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
