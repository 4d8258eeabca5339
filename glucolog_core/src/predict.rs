//! Glucose impact projection.
//!
//! Combines current glucose, carbs on board, insulin on board, a trend
//! term and the configured ratios into a projected glucose value at a
//! future instant, with a confidence score that decays with the horizon.
//!
//! Projections evaluate each event's decay as if observed at the target
//! instant, using the exponential half-life laws (carb half-life for
//! meals, the fixed systemic half-life for insulin). The rise/decay
//! profile only shapes the IOB curve itself, never the glucose delta.

use crate::decay::{exponential_remaining, InsulinActivityModel};
use crate::types::{age_minutes, round_to_tenth, Prediction, PredictionWarning};
use crate::{iob, CarbEvent, DecayConfig, Error, InsulinEvent, InsulinProfile, IobProjection, Result};
use chrono::{DateTime, Duration, Utc};

/// Horizon at which confidence reaches zero, in minutes
const CONFIDENCE_FLOOR_HORIZON_MINUTES: f64 = 360.0;

/// Predictions outside this band are flagged as implausible (mmol/L)
const PLAUSIBLE_MIN_MMOL: f64 = 2.0;
const PLAUSIBLE_MAX_MMOL: f64 = 20.0;

/// Confidence in a prediction at the given horizon
///
/// Decays linearly from 1.0 at horizon 0 to 0.0 at 360 minutes and clamps
/// there.
pub fn confidence_for_horizon(horizon_minutes: f64) -> f64 {
    (1.0 - horizon_minutes / CONFIDENCE_FLOOR_HORIZON_MINUTES).clamp(0.0, 1.0)
}

/// Predict the glucose value `horizon_minutes` after `now`
///
/// Without active carbs or insulin at the target instant the model
/// declines to extrapolate trend alone and returns `current_glucose`
/// unchanged. Implausible values (outside 2-20 mmol/L) are still
/// returned, flagged in [`Prediction::warnings`] and mirrored as a
/// `tracing::warn!` event.
pub fn predict_glucose(
    current_glucose: f64,
    trend_per_minute: f64,
    horizon_minutes: f64,
    carb_events: &[CarbEvent],
    insulin_events: &[InsulinEvent],
    config: &DecayConfig,
    now: DateTime<Utc>,
) -> Result<Prediction> {
    config.validate()?;
    if !horizon_minutes.is_finite() || horizon_minutes < 0.0 {
        return Err(Error::Projection(format!(
            "horizon must be non-negative, got {} minutes",
            horizon_minutes
        )));
    }

    let target_time = now + Duration::milliseconds((horizon_minutes * 60_000.0) as i64);
    let confidence = confidence_for_horizon(horizon_minutes);

    let cob_at_target = cob_at(carb_events, target_time, config);
    let iob_at_target = systemic_iob_at(insulin_events, target_time);

    // With nothing on board the model declines to extrapolate trend alone.
    if cob_at_target == 0.0 && iob_at_target == 0.0 {
        return Ok(Prediction {
            value: current_glucose,
            confidence,
            warnings: Vec::new(),
        });
    }

    let cob_effect = (cob_at_target / 10.0) * config.carb_ratio;
    let iob_effect = iob_at_target * config.insulin_sensitivity;
    let trend_effect = trend_per_minute * horizon_minutes;

    let value =
        round_to_tenth((current_glucose + trend_effect + cob_effect - iob_effect).max(0.0));

    let mut warnings = Vec::new();
    if !(PLAUSIBLE_MIN_MMOL..=PLAUSIBLE_MAX_MMOL).contains(&value) {
        tracing::warn!(
            "Implausible glucose prediction {:.1} mmol/L at horizon {} min",
            value,
            horizon_minutes
        );
        warnings.push(PredictionWarning::ImplausibleValue { value });
    }

    Ok(Prediction {
        value,
        confidence,
        warnings,
    })
}

/// Carbohydrate mass still on board at the target instant
fn cob_at(events: &[CarbEvent], target_time: DateTime<Utc>, config: &DecayConfig) -> f64 {
    events
        .iter()
        .filter_map(|event| {
            let age = age_minutes(event.timestamp, target_time);
            if age < 0.0 || age > config.max_cob_tracking_minutes {
                return None;
            }
            Some(exponential_remaining(
                event.carbs_grams,
                age,
                config.carb_half_life_minutes,
            ))
        })
        .sum()
}

/// Whole-body residual insulin at the target instant (systemic half-life)
fn systemic_iob_at(events: &[InsulinEvent], target_time: DateTime<Utc>) -> f64 {
    let systemic = InsulinActivityModel::systemic();
    events
        .iter()
        .filter_map(|event| {
            let age = age_minutes(event.timestamp, target_time);
            if age < 0.0 {
                return None;
            }
            Some(systemic.remaining(event.units, age))
        })
        .sum()
}

/// IOB grid with glucose predictions attached to future points
///
/// Grid points at or before `now` carry IOB only; points strictly after
/// `now` gain `glucose_prediction` and `confidence` from
/// [`predict_glucose`] at the matching horizon.
#[allow(clippy::too_many_arguments)]
pub fn generate_combined_projection(
    carb_events: &[CarbEvent],
    insulin_events: &[InsulinEvent],
    current_glucose: f64,
    trend_per_minute: f64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    step_minutes: i64,
    config: &DecayConfig,
    profile: &InsulinProfile,
    now: DateTime<Utc>,
) -> Result<Vec<IobProjection>> {
    config.validate()?;

    let mut points =
        iob::generate_projection(insulin_events, start_time, end_time, step_minutes, profile)?;

    for point in &mut points {
        if point.time <= now {
            continue;
        }
        let horizon_minutes = age_minutes(now, point.time);
        let prediction = predict_glucose(
            current_glucose,
            trend_per_minute,
            horizon_minutes,
            carb_events,
            insulin_events,
            config,
            now,
        )?;
        point.glucose_prediction = Some(prediction.value);
        point.confidence = Some(prediction.confidence);
    }

    Ok(points)
}
