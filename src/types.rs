//! Core types for the kinanthro engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: raw trials, reconciled records, derived results, comparisons and the
//! report payload handed to external renderers.

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Measurement section of the ISAK proforma
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Basic,
    Skinfolds,
    Girths,
    Breadths,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Basic,
        Section::Skinfolds,
        Section::Girths,
        Section::Breadths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Basic => "basic",
            Section::Skinfolds => "skinfolds",
            Section::Girths => "girths",
            Section::Breadths => "breadths",
        }
    }

    /// Metrics belonging to this section, in proforma order
    pub fn metrics(self) -> impl Iterator<Item = MetricId> {
        MetricId::ALL.into_iter().filter(move |m| m.section() == self)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Section::Basic),
            "skinfolds" => Ok(Section::Skinfolds),
            "girths" => Ok(Section::Girths),
            "breadths" => Ok(Section::Breadths),
            other => Err(ValidationError::UnknownSection(other.to_string())),
        }
    }
}

/// Anthropometric measurement site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    // Basic
    Mass,
    Stature,
    SittingHeight,
    ArmSpan,

    // Skinfolds (mm)
    Triceps,
    Subscapular,
    Biceps,
    IliacCrest,
    Supraspinale,
    Abdominal,
    Thigh,
    Calf,

    // Girths (cm)
    ArmRelaxed,
    ArmFlexed,
    Waist,
    Hip,
    MidThigh,
    CalfGirth,

    // Breadths (cm)
    Humerus,
    Femur,
    Wrist,
}

impl MetricId {
    pub const ALL: [MetricId; 21] = [
        MetricId::Mass,
        MetricId::Stature,
        MetricId::SittingHeight,
        MetricId::ArmSpan,
        MetricId::Triceps,
        MetricId::Subscapular,
        MetricId::Biceps,
        MetricId::IliacCrest,
        MetricId::Supraspinale,
        MetricId::Abdominal,
        MetricId::Thigh,
        MetricId::Calf,
        MetricId::ArmRelaxed,
        MetricId::ArmFlexed,
        MetricId::Waist,
        MetricId::Hip,
        MetricId::MidThigh,
        MetricId::CalfGirth,
        MetricId::Humerus,
        MetricId::Femur,
        MetricId::Wrist,
    ];

    pub fn section(&self) -> Section {
        match self {
            MetricId::Mass | MetricId::Stature | MetricId::SittingHeight | MetricId::ArmSpan => {
                Section::Basic
            }
            MetricId::Triceps
            | MetricId::Subscapular
            | MetricId::Biceps
            | MetricId::IliacCrest
            | MetricId::Supraspinale
            | MetricId::Abdominal
            | MetricId::Thigh
            | MetricId::Calf => Section::Skinfolds,
            MetricId::ArmRelaxed
            | MetricId::ArmFlexed
            | MetricId::Waist
            | MetricId::Hip
            | MetricId::MidThigh
            | MetricId::CalfGirth => Section::Girths,
            MetricId::Humerus | MetricId::Femur | MetricId::Wrist => Section::Breadths,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricId::Mass => "mass",
            MetricId::Stature => "stature",
            MetricId::SittingHeight => "sitting_height",
            MetricId::ArmSpan => "arm_span",
            MetricId::Triceps => "triceps",
            MetricId::Subscapular => "subscapular",
            MetricId::Biceps => "biceps",
            MetricId::IliacCrest => "iliac_crest",
            MetricId::Supraspinale => "supraspinale",
            MetricId::Abdominal => "abdominal",
            MetricId::Thigh => "thigh",
            MetricId::Calf => "calf",
            MetricId::ArmRelaxed => "arm_relaxed",
            MetricId::ArmFlexed => "arm_flexed",
            MetricId::Waist => "waist",
            MetricId::Hip => "hip",
            MetricId::MidThigh => "mid_thigh",
            MetricId::CalfGirth => "calf_girth",
            MetricId::Humerus => "humerus",
            MetricId::Femur => "femur",
            MetricId::Wrist => "wrist",
        }
    }

    /// Unit the value is recorded in
    pub fn unit(&self) -> &'static str {
        match self {
            MetricId::Mass => "kg",
            _ => match self.section() {
                Section::Skinfolds => "mm",
                _ => "cm",
            },
        }
    }

    /// Inclusive range a single trial reading may fall in before it is
    /// rejected as a data-entry error
    pub fn plausible_range(&self) -> (f64, f64) {
        match self {
            MetricId::Mass => (1.0, 350.0),
            MetricId::Stature => (40.0, 250.0),
            MetricId::SittingHeight => (20.0, 130.0),
            MetricId::ArmSpan => (40.0, 260.0),
            MetricId::Humerus | MetricId::Wrist => (2.0, 15.0),
            MetricId::Femur => (4.0, 20.0),
            _ => match self.section() {
                Section::Skinfolds => (0.0, 80.0),
                _ => (5.0, 250.0),
            },
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MetricId::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or(ValidationError::UnknownMetric(wanted))
    }
}

/// Raw readings taken for one metric during one sitting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub v1: f64,
    pub v2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v3: Option<f64>,
}

impl Trial {
    pub fn new(v1: f64, v2: f64) -> Self {
        Self { v1, v2, v3: None }
    }

    pub fn with_third(v1: f64, v2: f64, v3: f64) -> Self {
        Self {
            v1,
            v2,
            v3: Some(v3),
        }
    }

    /// Parse form fields into a trial.
    ///
    /// Blank `v3` means "not taken"; blank `v1`/`v2` are rejected, as is any
    /// reading that is not a finite non-negative number.
    pub fn parse(
        metric: MetricId,
        v1: &str,
        v2: &str,
        v3: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let v1 = parse_reading(metric, v1)?;
        let v2 = parse_reading(metric, v2)?;
        let v3 = match v3.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_reading(metric, raw)?),
        };
        Ok(Self { v1, v2, v3 })
    }
}

fn parse_reading(metric: MetricId, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty {
            metric: metric.to_string(),
        });
    }
    // Spanish-locale forms submit decimal commas
    let normalized = trimmed.replace(',', ".");
    let value = normalized
        .parse::<f64>()
        .map_err(|_| ValidationError::NotNumeric {
            metric: metric.to_string(),
            raw: trimmed.to_string(),
        })?;
    validate_value(metric, value)
}

/// Check that a measured value is usable by the formulas
pub fn validate_value(metric: MetricId, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            metric: metric.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            metric: metric.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Canonical reconciled measurements, one value per metric.
///
/// A metric absent from the map is unavailable; it is never read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<MetricId, f64>", into = "BTreeMap<MetricId, f64>")]
pub struct AnthropometricData {
    values: BTreeMap<MetricId, f64>,
}

impl AnthropometricData {
    pub fn new(
        values: impl IntoIterator<Item = (MetricId, f64)>,
    ) -> Result<Self, ValidationError> {
        let mut map = BTreeMap::new();
        for (metric, value) in values {
            map.insert(metric, validate_value(metric, value)?);
        }
        Ok(Self { values: map })
    }

    pub fn get(&self, metric: MetricId) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    pub fn contains(&self, metric: MetricId) -> bool {
        self.values.contains_key(&metric)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricId, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    /// Metrics with no value, in proforma order
    pub fn missing(&self) -> Vec<MetricId> {
        MetricId::ALL
            .into_iter()
            .filter(|m| !self.values.contains_key(m))
            .collect()
    }

    /// Share of the proforma that was measured (0-1)
    pub fn coverage(&self) -> f64 {
        self.values.len() as f64 / MetricId::ALL.len() as f64
    }
}

impl TryFrom<BTreeMap<MetricId, f64>> for AnthropometricData {
    type Error = ValidationError;

    fn try_from(values: BTreeMap<MetricId, f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<AnthropometricData> for BTreeMap<MetricId, f64> {
    fn from(data: AnthropometricData) -> Self {
        data.values
    }
}

/// One finalized sitting for a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub id: Uuid,
    pub client_id: String,
    pub date: NaiveDate,
    pub evaluator: String,
    pub data: AnthropometricData,
}

impl MeasurementRecord {
    pub fn new(
        client_id: impl Into<String>,
        date: NaiveDate,
        evaluator: impl Into<String>,
        data: AnthropometricData,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id: client_id.into(),
            date,
            evaluator: evaluator.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

/// Client context supplied by the client/appointment collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    #[serde(alias = "clientId")]
    pub client_id: String,
    /// Age in whole years
    pub age: u32,
    #[serde(default)]
    pub sex: Option<Sex>,
}

// ============================================================================
// Reconciliation
// ============================================================================

/// How the accepted value of a trial was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationMethod {
    /// Two readings within tolerance, averaged
    Mean,
    /// Third reading taken, middle value kept
    Median,
    /// Third reading required but not yet supplied
    Pending,
}

/// Outcome of reconciling one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub metric: MetricId,
    pub section: Section,
    /// |v1 - v2|
    pub diff: f64,
    /// Allowed difference for the section
    pub threshold: f64,
    pub needs_third: bool,
    /// Accepted value; None while a required third trial is missing
    pub final_value: Option<f64>,
    pub method: ReconciliationMethod,
}

impl Reconciliation {
    pub fn is_pending(&self) -> bool {
        self.method == ReconciliationMethod::Pending
    }
}

/// Trials entered for one sitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SittingInput {
    pub client_id: String,
    pub date: NaiveDate,
    pub evaluator: String,
    pub trials: BTreeMap<MetricId, Trial>,
}

/// Result of reconciling every trial of a sitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SittingOutcome {
    pub client_id: String,
    pub date: NaiveDate,
    pub evaluator: String,
    pub reconciliations: Vec<Reconciliation>,
    /// Metrics for which no trial was entered
    pub missing: Vec<MetricId>,
}

impl SittingOutcome {
    /// Metrics still waiting on a third trial
    pub fn pending(&self) -> Vec<MetricId> {
        self.reconciliations
            .iter()
            .filter(|r| r.is_pending())
            .map(|r| r.metric)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.reconciliations.iter().all(|r| !r.is_pending())
    }

    /// Accepted values so far
    pub fn accepted(&self) -> impl Iterator<Item = (MetricId, f64)> + '_ {
        self.reconciliations
            .iter()
            .filter_map(|r| r.final_value.map(|v| (r.metric, v)))
    }
}

// ============================================================================
// Z-scores
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZScoreStatus {
    Scored,
    /// Metric has no population norm
    NoReference,
    /// Metric not measured in this record
    MissingValue,
}

/// Standard score of one metric against the reference table.
///
/// `value` is 0 whenever `status` is not `Scored`; callers must check the
/// status before reading a zero as "exactly average".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScore {
    pub value: f64,
    pub status: ZScoreStatus,
}

impl ZScore {
    pub fn scored(value: f64) -> Self {
        Self {
            value,
            status: ZScoreStatus::Scored,
        }
    }

    pub fn no_reference() -> Self {
        Self {
            value: 0.0,
            status: ZScoreStatus::NoReference,
        }
    }

    pub fn missing_value() -> Self {
        Self {
            value: 0.0,
            status: ZScoreStatus::MissingValue,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.status == ZScoreStatus::Scored
    }

    pub fn as_option(&self) -> Option<f64> {
        self.is_scored().then_some(self.value)
    }
}

// ============================================================================
// Derived results
// ============================================================================

/// Limb girths with the skinfold contribution removed (cm)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectedGirths {
    pub arm: Option<f64>,
    pub thigh: Option<f64>,
    pub calf: Option<f64>,
}

/// Two-compartment body composition estimate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyComposition {
    /// triceps + subscapular + supraspinale + abdominal (mm)
    pub sum4_skinfolds: Option<f64>,
    /// triceps + subscapular + supraspinale + abdominal + thigh + calf (mm)
    pub sum6_skinfolds: Option<f64>,
    /// All eight skinfolds (mm)
    pub sum8_skinfolds: Option<f64>,
    /// Faulkner body fat (%)
    pub body_fat_percent: Option<f64>,
    pub fat_mass_kg: Option<f64>,
    /// Mass minus fat mass; an approximation, not a validated
    /// multi-compartment muscle estimate
    pub muscle_mass_kg: Option<f64>,
    /// Fixed fraction of body mass
    pub bone_mass_kg: Option<f64>,
}

/// Heath-Carter somatotype category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SomatotypeCategory {
    Central,
    BalancedEndomorph,
    MesomorphicEndomorph,
    EctomorphicEndomorph,
    EndomorphMesomorph,
    EndomorphicMesomorph,
    BalancedMesomorph,
    EctomorphicMesomorph,
    MesomorphEctomorph,
    MesomorphicEctomorph,
    BalancedEctomorph,
    EndomorphicEctomorph,
    EndomorphEctomorph,
}

impl SomatotypeCategory {
    /// Display label used on client reports
    pub fn label(&self) -> &'static str {
        match self {
            SomatotypeCategory::Central => "Central",
            SomatotypeCategory::BalancedEndomorph => "Endomorfo balanceado",
            SomatotypeCategory::MesomorphicEndomorph => "Endomorfo mesomórfico",
            SomatotypeCategory::EctomorphicEndomorph => "Endomorfo ectomórfico",
            SomatotypeCategory::EndomorphMesomorph => "Endomorfo-Mesomorfo",
            SomatotypeCategory::EndomorphicMesomorph => "Mesomorfo endomórfico",
            SomatotypeCategory::BalancedMesomorph => "Mesomorfo balanceado",
            SomatotypeCategory::EctomorphicMesomorph => "Mesomorfo ectomórfico",
            SomatotypeCategory::MesomorphEctomorph => "Mesomorfo-Ectomorfo",
            SomatotypeCategory::MesomorphicEctomorph => "Ectomorfo mesomórfico",
            SomatotypeCategory::BalancedEctomorph => "Ectomorfo balanceado",
            SomatotypeCategory::EndomorphicEctomorph => "Ectomorfo endomórfico",
            SomatotypeCategory::EndomorphEctomorph => "Endomorfo-Ectomorfo",
        }
    }
}

/// Heath-Carter anthropometric somatotype
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Somatotype {
    pub endomorphy: Option<f64>,
    pub mesomorphy: Option<f64>,
    pub ectomorphy: Option<f64>,
    /// Height-weight ratio used for ectomorphy
    pub height_weight_ratio: Option<f64>,
    /// Somatochart abscissa
    pub x: Option<f64>,
    /// Somatochart ordinate
    pub y: Option<f64>,
    pub category: Option<SomatotypeCategory>,
}

/// Share of the 8-skinfold sum by body region (%)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdiposeDistribution {
    pub superior_percent: Option<f64>,
    pub central_percent: Option<f64>,
    pub inferior_percent: Option<f64>,
}

/// Share of the summed corrected limb girths by segment (%)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MuscleDistribution {
    pub arm_percent: Option<f64>,
    pub thigh_percent: Option<f64>,
    pub calf_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmrEquation {
    /// 66.5 + 13.75·mass + 5.003·stature − 6.755·age for every client
    SexNeutral,
    /// Harris-Benedict with the female constants when the client is female
    HarrisBenedictBySex,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyExpenditure {
    /// Basal metabolic rate (kcal/day)
    pub bmr_kcal: Option<f64>,
    /// Total daily energy expenditure (kcal/day)
    pub tdee_kcal: Option<f64>,
    pub activity_factor: f64,
}

/// WHO adult BMI classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    ObesityClassI,
    ObesityClassII,
    ObesityClassIII,
}

/// Health and performance indices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthIndices {
    pub waist_hip_ratio: Option<f64>,
    pub conicity_index: Option<f64>,
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    pub cormic_index: Option<f64>,
    pub manouvrier_index: Option<f64>,
    pub relative_span: Option<f64>,
    /// DuBois body surface area (m²)
    pub body_surface_area_m2: Option<f64>,
    pub adipose_muscle_index: Option<f64>,
    pub muscle_bone_index: Option<f64>,
}

/// Everything derived from one record plus client age.
///
/// Never persisted; always recomputable from the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedResult {
    pub corrected_girths: CorrectedGirths,
    pub composition: BodyComposition,
    pub somatotype: Somatotype,
    pub adipose_distribution: AdiposeDistribution,
    pub muscle_distribution: MuscleDistribution,
    pub energy: EnergyExpenditure,
    pub indices: HealthIndices,
    pub z_scores: BTreeMap<MetricId, ZScore>,
    /// Scores after scaling each value to phantom stature
    pub proportional_z_scores: BTreeMap<MetricId, ZScore>,
}

impl DerivedResult {
    /// Named numeric outputs as a flat bag, `None` meaning unavailable
    pub fn flatten(&self) -> BTreeMap<&'static str, Option<f64>> {
        let g = &self.corrected_girths;
        let c = &self.composition;
        let s = &self.somatotype;
        let a = &self.adipose_distribution;
        let m = &self.muscle_distribution;
        let e = &self.energy;
        let i = &self.indices;

        BTreeMap::from([
            ("corrected_arm_girth", g.arm),
            ("corrected_thigh_girth", g.thigh),
            ("corrected_calf_girth", g.calf),
            ("sum4_skinfolds", c.sum4_skinfolds),
            ("sum6_skinfolds", c.sum6_skinfolds),
            ("sum8_skinfolds", c.sum8_skinfolds),
            ("body_fat_percent", c.body_fat_percent),
            ("fat_mass_kg", c.fat_mass_kg),
            ("muscle_mass_kg", c.muscle_mass_kg),
            ("bone_mass_kg", c.bone_mass_kg),
            ("endomorphy", s.endomorphy),
            ("mesomorphy", s.mesomorphy),
            ("ectomorphy", s.ectomorphy),
            ("height_weight_ratio", s.height_weight_ratio),
            ("somatochart_x", s.x),
            ("somatochart_y", s.y),
            ("adipose_superior_percent", a.superior_percent),
            ("adipose_central_percent", a.central_percent),
            ("adipose_inferior_percent", a.inferior_percent),
            ("muscle_arm_percent", m.arm_percent),
            ("muscle_thigh_percent", m.thigh_percent),
            ("muscle_calf_percent", m.calf_percent),
            ("bmr_kcal", e.bmr_kcal),
            ("tdee_kcal", e.tdee_kcal),
            ("waist_hip_ratio", i.waist_hip_ratio),
            ("conicity_index", i.conicity_index),
            ("bmi", i.bmi),
            ("cormic_index", i.cormic_index),
            ("manouvrier_index", i.manouvrier_index),
            ("relative_span", i.relative_span),
            ("body_surface_area_m2", i.body_surface_area_m2),
            ("adipose_muscle_index", i.adipose_muscle_index),
            ("muscle_bone_index", i.muscle_bone_index),
        ])
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// Current vs previous value of one measured metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: MetricId,
    pub section: Section,
    pub current: Option<f64>,
    pub previous: Option<f64>,
    /// current - previous; None without a previous value
    pub diff: Option<f64>,
    /// diff / previous × 100; None without a non-zero previous value
    pub percent_change: Option<f64>,
    pub z_score: ZScore,
    pub proportional_z_score: ZScore,
}

/// Current vs previous value of one derived output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedComparison {
    pub name: String,
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub diff: Option<f64>,
    pub percent_change: Option<f64>,
}

/// Aggregated comparison payload for one client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub client_id: String,
    pub current_record_id: Uuid,
    pub current_date: NaiveDate,
    pub previous_record_id: Option<Uuid>,
    pub previous_date: Option<NaiveDate>,
    pub metrics: Vec<MetricComparison>,
    pub derived: Vec<DerivedComparison>,
    pub current_derived: DerivedResult,
    pub previous_derived: Option<DerivedResult>,
}

/// At-a-glance card data for the latest record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub client_id: String,
    pub record_id: Uuid,
    pub date: NaiveDate,
    pub mass_kg: Option<f64>,
    pub body_fat_percent: Option<f64>,
}

// ============================================================================
// Report payload
// ============================================================================

/// Quality flag indicating data issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    MissingBasicData,
    MissingSkinfoldData,
    MissingGirthData,
    MissingBreadthData,
    NoPreviousRecord,
    ZeroFilledInputs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub client_id: String,
    pub evaluator: String,
    pub current_record_id: String,
    pub previous_record_id: Option<String>,
    pub computed_at_utc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportQuality {
    /// Share of the proforma measured in the current record (0-1)
    pub coverage: f64,
    pub flags: Vec<QualityFlag>,
}

/// Complete report payload consumed by renderers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPayload {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub quality: ReportQuality,
    pub comparison: ComparisonReport,
}
