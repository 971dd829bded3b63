//! Measurement reconciliation
//!
//! Resolves the repeated trials of each metric into one accepted value
//! following the ISAK protocol:
//! - two readings within the section tolerance are averaged
//! - readings further apart require a third, and the median of the three is kept
//! - until that third reading exists the metric has no value at all

use crate::config::{EngineConfig, ToleranceConfig};
use crate::error::{ComputeError, ValidationError};
use crate::types::{
    validate_value, AnthropometricData, MeasurementRecord, MetricId, Reconciliation,
    ReconciliationMethod, Section, SittingInput, SittingOutcome, Trial,
};
use tracing::{debug, warn};

/// Slack for decimal readings whose binary difference lands a hair above the threshold
const TOLERANCE_EPSILON: f64 = 1e-9;

/// Reconciler for turning raw trials into accepted values
pub struct Reconciler;

impl Reconciler {
    /// Reconcile the trials of one metric.
    ///
    /// A supplied `v3` is only checked when the first two readings disagree;
    /// otherwise it is ignored.
    pub fn reconcile(
        metric: MetricId,
        trial: &Trial,
        tolerances: &ToleranceConfig,
    ) -> Result<Reconciliation, ValidationError> {
        check_reading(metric, trial.v1)?;
        check_reading(metric, trial.v2)?;

        let section = metric.section();
        let threshold = tolerances.threshold(section);
        let diff = (trial.v1 - trial.v2).abs();
        let needs_third = diff - threshold > TOLERANCE_EPSILON;
        if let (true, Some(v3)) = (needs_third, trial.v3) {
            check_reading(metric, v3)?;
        }

        let (final_value, method) = match (needs_third, trial.v3) {
            (false, _) => (Some((trial.v1 + trial.v2) / 2.0), ReconciliationMethod::Mean),
            (true, Some(v3)) => (
                Some(median_of_three(trial.v1, trial.v2, v3)),
                ReconciliationMethod::Median,
            ),
            (true, None) => (None, ReconciliationMethod::Pending),
        };

        if needs_third {
            debug!(
                metric = metric.as_str(),
                diff, threshold, "trial difference exceeds tolerance"
            );
        }

        Ok(Reconciliation {
            metric,
            section,
            diff,
            threshold,
            needs_third,
            final_value,
            method,
        })
    }

    /// Reconcile a trial whose section arrives as free text from the caller.
    ///
    /// The section must name one of the four known sections and must be the
    /// section the metric belongs to.
    pub fn reconcile_in_section(
        section: &str,
        metric: MetricId,
        trial: &Trial,
        tolerances: &ToleranceConfig,
    ) -> Result<Reconciliation, ValidationError> {
        let section: Section = section.parse()?;
        if metric.section() != section {
            return Err(ValidationError::SectionMismatch {
                metric: metric.to_string(),
                section: section.to_string(),
            });
        }
        Self::reconcile(metric, trial, tolerances)
    }

    /// Reconcile every metric entered during a sitting.
    ///
    /// Each metric is handled independently; the first invalid reading aborts
    /// the sitting so it can be corrected before anything is stored.
    pub fn reconcile_sitting(
        sitting: &SittingInput,
        tolerances: &ToleranceConfig,
    ) -> Result<SittingOutcome, ValidationError> {
        let reconciliations = sitting
            .trials
            .iter()
            .map(|(metric, trial)| Self::reconcile(*metric, trial, tolerances))
            .collect::<Result<Vec<_>, _>>()?;

        let missing = MetricId::ALL
            .into_iter()
            .filter(|m| !sitting.trials.contains_key(m))
            .collect();

        Ok(SittingOutcome {
            client_id: sitting.client_id.clone(),
            date: sitting.date,
            evaluator: sitting.evaluator.clone(),
            reconciliations,
            missing,
        })
    }

    /// Turn a reconciled sitting into an immutable record
    pub fn finalize(
        outcome: &SittingOutcome,
        config: &EngineConfig,
    ) -> Result<MeasurementRecord, ComputeError> {
        let pending = outcome.pending();
        if !pending.is_empty() {
            return Err(ComputeError::IncompleteMeasurement(pending));
        }

        if !outcome.missing.is_empty() {
            if config.require_complete_sitting {
                let names: Vec<&str> = outcome.missing.iter().map(|m| m.as_str()).collect();
                return Err(ComputeError::MissingField(names.join(", ")));
            }
            warn!(
                client_id = outcome.client_id.as_str(),
                missing = outcome.missing.len(),
                "finalizing sitting with unmeasured metrics"
            );
        }

        let data = AnthropometricData::new(outcome.accepted())?;
        Ok(MeasurementRecord::new(
            outcome.client_id.clone(),
            outcome.date,
            outcome.evaluator.clone(),
            data,
        ))
    }

    /// Reconcile and finalize in one step
    pub fn record_from_sitting(
        sitting: &SittingInput,
        config: &EngineConfig,
    ) -> Result<MeasurementRecord, ComputeError> {
        let outcome = Self::reconcile_sitting(sitting, &config.tolerances)?;
        Self::finalize(&outcome, config)
    }
}

/// Allowed |v1 - v2| for a section given by name
pub fn allowed_difference(
    section: &str,
    tolerances: &ToleranceConfig,
) -> Result<f64, ValidationError> {
    let section: Section = section.parse()?;
    Ok(tolerances.threshold(section))
}

fn check_reading(metric: MetricId, value: f64) -> Result<(), ValidationError> {
    let value = validate_value(metric, value)?;
    let (min, max) = metric.plausible_range();
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            metric: metric.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Middle value of three readings
fn median_of_three(a: f64, b: f64, c: f64) -> f64 {
    let mut values = [a, b, c];
    values.sort_by(f64::total_cmp);
    values[1]
}
