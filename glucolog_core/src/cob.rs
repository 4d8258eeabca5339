//! Carb-on-board aggregation.
//!
//! Sums decayed remaining carbohydrate mass across all active meal entries
//! at a target time, and derives the active-entries view, the estimated
//! glucose impact and a time-to-zero estimate.

use crate::decay::{exponential_remaining, InsulinActivityModel};
use crate::types::{age_minutes, round_to_hundredth, round_to_tenth, ActiveCarbEntry, CobStatus};
use crate::{CarbEvent, DecayConfig, Result};
use chrono::{DateTime, Utc};

/// Remaining mass below this many grams no longer counts as an active entry
const ACTIVE_ENTRY_FLOOR_GRAMS: f64 = 0.1;

/// Aggregate carbs on board at `target_time`
///
/// Entries older than `max_cob_tracking_minutes` or dated in the future
/// are skipped. The companion `insulin_on_board` figure is the whole-body
/// residual over the same entries' logged insulin, using the fixed
/// systemic half-life rather than the active-phase profile; the projector
/// and the IOB grid use the profile model and can report a different
/// figure for the same log.
pub fn carbs_on_board(
    events: &[CarbEvent],
    target_time: DateTime<Utc>,
    config: &DecayConfig,
) -> Result<CobStatus> {
    config.validate()?;

    let systemic = InsulinActivityModel::systemic();
    let mut current_cob = 0.0;
    let mut insulin_on_board = 0.0;
    let mut active_entries = Vec::new();

    for event in events {
        let age = age_minutes(event.timestamp, target_time);
        if age < 0.0 || age > config.max_cob_tracking_minutes {
            continue;
        }

        let remaining =
            exponential_remaining(event.carbs_grams, age, config.carb_half_life_minutes);
        current_cob += remaining;
        insulin_on_board += systemic.remaining(event.insulin_units, age);

        if remaining > ACTIVE_ENTRY_FLOOR_GRAMS {
            active_entries.push(ActiveCarbEntry {
                event: event.clone(),
                remaining_grams: remaining,
                original_grams: event.carbs_grams,
            });
        }
    }

    // Most recent first; the presentation layer depends on this ordering.
    active_entries.sort_by(|a, b| b.event.timestamp.cmp(&a.event.timestamp));

    let current_cob = round_to_tenth(current_cob);
    let insulin_on_board = round_to_hundredth(insulin_on_board);

    let estimated_glucose_impact = round_to_tenth(
        (current_cob / 10.0) * config.carb_ratio
            - insulin_on_board * config.insulin_sensitivity,
    );
    let time_to_zero_minutes = time_to_zero(current_cob, config.carb_half_life_minutes);

    tracing::debug!(
        "COB at {}: {:.1} g across {} active entries, systemic IOB {:.2} u",
        target_time,
        current_cob,
        active_entries.len(),
        insulin_on_board
    );

    Ok(CobStatus {
        current_cob,
        active_entries,
        estimated_glucose_impact,
        time_to_zero_minutes,
        insulin_on_board,
    })
}

/// Minutes until `cob` decays to the 0.1 g floor: `hl * log2(cob / 0.1)`
fn time_to_zero(cob: f64, half_life_minutes: f64) -> f64 {
    if cob <= 0.0 {
        return 0.0;
    }
    (half_life_minutes * (cob / ACTIVE_ENTRY_FLOOR_GRAMS).log2()).max(0.0)
}
