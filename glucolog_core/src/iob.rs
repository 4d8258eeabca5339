//! Insulin-on-board aggregation and projection grids.
//!
//! Uses the rise/decay activity model per dose. The whole-body residual
//! figure in [`crate::cob`] uses the slower systemic half-life instead;
//! the two can disagree on "current IOB" for the same log.

use crate::decay::InsulinActivityModel;
use crate::types::{age_minutes, ActivityPhase, IobProjection};
use crate::{Error, InsulinEvent, InsulinProfile, Result};
use chrono::{DateTime, Duration, Utc};

/// Width of the band around peak time classified as peak activity, in minutes
const PEAK_BAND_MINUTES: f64 = 15.0;

/// Total active-phase insulin on board at `target_time`
///
/// Doses outside their activity window contribute nothing. A per-dose
/// `duration_minutes` override stretches or shortens the decay window for
/// that dose alone.
pub fn insulin_on_board_at(
    events: &[InsulinEvent],
    target_time: DateTime<Utc>,
    profile: &InsulinProfile,
) -> Result<f64> {
    profile.validate()?;

    let mut total = 0.0;
    for event in events {
        // The rise/decay law is zero outside [0, duration], so doses that
        // are future-dated or exhausted drop out here on their own.
        let model = InsulinActivityModel::RiseDecay(effective_profile(event, profile));
        let age = age_minutes(event.timestamp, target_time);
        total += model.remaining(event.units, age);
    }

    Ok(total.max(0.0))
}

/// Per-dose duration overrides are honored only when they leave room for
/// the rise phase; anything at or below peak time is ignored.
fn effective_profile(event: &InsulinEvent, profile: &InsulinProfile) -> InsulinProfile {
    match event.duration_minutes {
        Some(duration) if duration > profile.peak_time_minutes => InsulinProfile {
            duration_minutes: duration,
            ..profile.clone()
        },
        Some(duration) => {
            tracing::warn!(
                "Ignoring duration override of {} min on dose {} (profile peak is {} min)",
                duration,
                event.id,
                profile.peak_time_minutes
            );
            profile.clone()
        }
        None => profile.clone(),
    }
}

/// Walk the closed interval `[start_time, end_time]` in fixed steps,
/// computing IOB at each grid point
///
/// `start_time == end_time` yields exactly one point. Non-positive steps
/// and inverted bounds are caller contract violations and fail fast.
pub fn generate_projection(
    events: &[InsulinEvent],
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    step_minutes: i64,
    profile: &InsulinProfile,
) -> Result<Vec<IobProjection>> {
    profile.validate()?;

    if step_minutes <= 0 {
        return Err(Error::Grid(format!(
            "step must be positive, got {} minutes",
            step_minutes
        )));
    }
    if end_time < start_time {
        return Err(Error::Grid(format!(
            "grid end {} precedes start {}",
            end_time, start_time
        )));
    }

    let mut points = Vec::new();
    let mut time = start_time;
    while time <= end_time {
        let iob = insulin_on_board_at(events, time, profile)?;
        points.push(IobProjection {
            time,
            iob,
            glucose_prediction: None,
            confidence: None,
        });
        time += Duration::minutes(step_minutes);
    }

    tracing::debug!(
        "Generated {}-point IOB grid from {} to {}",
        points.len(),
        start_time,
        end_time
    );
    Ok(points)
}

/// Classify the activity phase of the most recent dose at `now`
///
/// Returns [`ActivityPhase::None`] for an empty log or a future-dated
/// latest dose.
pub fn classify_activity(
    events: &[InsulinEvent],
    now: DateTime<Utc>,
    profile: &InsulinProfile,
) -> Result<ActivityPhase> {
    profile.validate()?;

    let latest = match crate::history::most_recent_dose(events) {
        Some(event) => event,
        None => return Ok(ActivityPhase::None),
    };

    let age = age_minutes(latest.timestamp, now);
    if age < 0.0 {
        return Ok(ActivityPhase::None);
    }

    let peak = profile.peak_time_minutes;
    let phase = if age < peak - PEAK_BAND_MINUTES {
        ActivityPhase::Rising
    } else if (age - peak).abs() <= PEAK_BAND_MINUTES {
        ActivityPhase::Peak
    } else {
        ActivityPhase::Falling
    };

    Ok(phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DoseType;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn dose(minutes_ago: i64, units: f64, now: DateTime<Utc>) -> InsulinEvent {
        InsulinEvent {
            id: Uuid::new_v4(),
            timestamp: now - Duration::minutes(minutes_ago),
            units,
            dose_type: DoseType::Bolus,
            duration_minutes: None,
        }
    }

    fn rapid_profile() -> InsulinProfile {
        InsulinProfile {
            peak_time_minutes: 75.0,
            duration_minutes: 300.0,
            decay_rate: 2.0,
        }
    }

    #[test]
    fn test_empty_log_is_zero() {
        let iob = insulin_on_board_at(&[], fixed_now(), &rapid_profile()).unwrap();
        assert_eq!(iob, 0.0);
    }

    #[test]
    fn test_sums_across_active_doses() {
        let now = fixed_now();
        // Both mid-rise: 4 * 37.5/75 + 2 * 15/75
        let mut first = dose(0, 4.0, now);
        first.timestamp = now - Duration::seconds(2250); // 37.5 min
        let second = dose(15, 2.0, now);

        let iob = insulin_on_board_at(&[first, second], now, &rapid_profile()).unwrap();
        assert!((iob - 2.4).abs() < 1e-9);
    }

    #[test]
    fn test_exhausted_and_future_doses_contribute_nothing() {
        let now = fixed_now();
        let events = vec![dose(301, 4.0, now), dose(-10, 4.0, now)];

        let iob = insulin_on_board_at(&events, now, &rapid_profile()).unwrap();
        assert_eq!(iob, 0.0);
    }

    #[test]
    fn test_duration_override_extends_activity_window() {
        let now = fixed_now();
        let mut event = dose(310, 4.0, now);
        event.duration_minutes = Some(360.0);

        let iob = insulin_on_board_at(&[event], now, &rapid_profile()).unwrap();
        assert!(iob > 0.0);
    }

    #[test]
    fn test_duration_override_below_peak_is_ignored() {
        let now = fixed_now();
        let mut event = dose(100, 4.0, now);
        event.duration_minutes = Some(60.0); // below the 75-minute peak

        let with_override = insulin_on_board_at(&[event.clone()], now, &rapid_profile()).unwrap();
        event.duration_minutes = None;
        let without = insulin_on_board_at(&[event], now, &rapid_profile()).unwrap();

        assert_eq!(with_override, without);
    }

    #[test]
    fn test_single_point_grid() {
        let now = fixed_now();
        let points =
            generate_projection(&[], now, now, 5, &rapid_profile()).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].time, now);
        assert_eq!(points[0].iob, 0.0);
        assert!(points[0].glucose_prediction.is_none());
    }

    #[test]
    fn test_grid_covers_closed_interval() {
        let now = fixed_now();
        let end = now + Duration::minutes(60);
        let points =
            generate_projection(&[dose(0, 4.0, now)], now, end, 15, &rapid_profile()).unwrap();

        assert_eq!(points.len(), 5);
        assert_eq!(points[0].time, now);
        assert_eq!(points[4].time, end);
        // IOB rises across the first hour of a 75-minute-peak dose.
        assert!(points[4].iob > points[0].iob);
    }

    #[test]
    fn test_grid_rejects_non_positive_step() {
        let now = fixed_now();
        let result = generate_projection(&[], now, now + Duration::minutes(30), 0, &rapid_profile());
        assert!(matches!(result, Err(Error::Grid(_))));
    }

    #[test]
    fn test_grid_rejects_inverted_bounds() {
        let now = fixed_now();
        let result = generate_projection(&[], now, now - Duration::minutes(1), 5, &rapid_profile());
        assert!(matches!(result, Err(Error::Grid(_))));
    }

    #[test]
    fn test_classify_empty_log() {
        let phase = classify_activity(&[], fixed_now(), &rapid_profile()).unwrap();
        assert_eq!(phase, ActivityPhase::None);
    }

    #[test]
    fn test_classify_future_dose() {
        let now = fixed_now();
        let phase = classify_activity(&[dose(-30, 4.0, now)], now, &rapid_profile()).unwrap();
        assert_eq!(phase, ActivityPhase::None);
    }

    #[test]
    fn test_classify_phases_around_peak() {
        let now = fixed_now();
        let profile = rapid_profile();

        let cases = [
            (30, ActivityPhase::Rising),
            (59, ActivityPhase::Rising),
            (60, ActivityPhase::Peak),
            (75, ActivityPhase::Peak),
            (90, ActivityPhase::Peak),
            (91, ActivityPhase::Falling),
            (280, ActivityPhase::Falling),
        ];
        for (minutes_ago, expected) in cases {
            let phase = classify_activity(&[dose(minutes_ago, 4.0, now)], now, &profile).unwrap();
            assert_eq!(phase, expected, "at age {}", minutes_ago);
        }
    }

    #[test]
    fn test_classification_uses_most_recent_dose() {
        let now = fixed_now();
        let events = vec![dose(200, 4.0, now), dose(30, 2.0, now)];

        let phase = classify_activity(&events, now, &rapid_profile()).unwrap();
        assert_eq!(phase, ActivityPhase::Rising);
    }
}
