//! In-memory event-log views.
//!
//! The external note-entry collaborator owns the event log; this module
//! derives the read-side views the aggregators and the presentation layer
//! consume: windowed newest-first slices, insulin doses derived from meal
//! entries, and JSON snapshot interchange with the store.

use crate::{CarbEvent, DoseType, InsulinEvent, Result};
use chrono::{DateTime, Duration, Utc};

/// Derive insulin doses from meal entries
///
/// Every entry logged with `insulin_units > 0` yields a bolus dose with
/// the same id and timestamp, so a meal-only log can still feed the IOB
/// aggregator.
pub fn derive_insulin_events(carb_events: &[CarbEvent]) -> Vec<InsulinEvent> {
    let doses: Vec<InsulinEvent> = carb_events
        .iter()
        .filter(|event| event.insulin_units > 0.0)
        .map(|event| InsulinEvent {
            id: event.id,
            timestamp: event.timestamp,
            units: event.insulin_units,
            dose_type: DoseType::Bolus,
            duration_minutes: None,
        })
        .collect();

    tracing::debug!(
        "Derived {} insulin doses from {} meal entries",
        doses.len(),
        carb_events.len()
    );
    doses
}

/// Meal entries within the last `window_minutes` of `now`
///
/// Returns entries sorted by timestamp, newest first. Future-dated entries
/// are excluded.
pub fn recent_carb_events(
    events: &[CarbEvent],
    now: DateTime<Utc>,
    window_minutes: i64,
) -> Vec<CarbEvent> {
    let cutoff = now - Duration::minutes(window_minutes);

    let mut recent: Vec<CarbEvent> = events
        .iter()
        .filter(|event| event.timestamp >= cutoff && event.timestamp <= now)
        .cloned()
        .collect();

    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent
}

/// The most recently dosed insulin event, if any
pub fn most_recent_dose(events: &[InsulinEvent]) -> Option<&InsulinEvent> {
    events.iter().max_by_key(|event| event.timestamp)
}

/// Parse a JSON meal-entry snapshot from the event store
pub fn carb_events_from_json(contents: &str) -> Result<Vec<CarbEvent>> {
    let events: Vec<CarbEvent> = serde_json::from_str(contents)?;
    tracing::debug!("Parsed {} meal entries from snapshot", events.len());
    Ok(events)
}

/// Serialize meal entries to a JSON snapshot
pub fn carb_events_to_json(events: &[CarbEvent]) -> Result<String> {
    Ok(serde_json::to_string(events)?)
}

/// Parse a JSON insulin-dose snapshot from the event store
pub fn insulin_events_from_json(contents: &str) -> Result<Vec<InsulinEvent>> {
    let events: Vec<InsulinEvent> = serde_json::from_str(contents)?;
    tracing::debug!("Parsed {} insulin doses from snapshot", events.len());
    Ok(events)
}

/// Serialize insulin doses to a JSON snapshot
pub fn insulin_events_to_json(events: &[InsulinEvent]) -> Result<String> {
    Ok(serde_json::to_string(events)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MealCategory;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn meal(minutes_ago: i64, carbs: f64, insulin: f64, now: DateTime<Utc>) -> CarbEvent {
        CarbEvent {
            id: Uuid::new_v4(),
            timestamp: now - Duration::minutes(minutes_ago),
            carbs_grams: carbs,
            insulin_units: insulin,
            meal_category: MealCategory::Snack,
            comment: None,
            glucose_at_entry: None,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_derive_skips_insulin_free_meals() {
        let now = fixed_now();
        let events = vec![meal(30, 40.0, 3.0, now), meal(60, 15.0, 0.0, now)];

        let doses = derive_insulin_events(&events);

        assert_eq!(doses.len(), 1);
        assert_eq!(doses[0].id, events[0].id);
        assert_eq!(doses[0].units, 3.0);
        assert_eq!(doses[0].dose_type, DoseType::Bolus);
    }

    #[test]
    fn test_recent_events_window_and_order() {
        let now = fixed_now();
        let events = vec![
            meal(90, 20.0, 0.0, now),
            meal(10, 30.0, 0.0, now),
            meal(300, 50.0, 0.0, now), // outside the 4h window
            meal(-20, 10.0, 0.0, now), // future-dated
        ];

        let recent = recent_carb_events(&events, now, 240);

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].carbs_grams, 30.0); // newest first
        assert_eq!(recent[1].carbs_grams, 20.0);
    }

    #[test]
    fn test_most_recent_dose() {
        let now = fixed_now();
        let older = InsulinEvent {
            id: Uuid::new_v4(),
            timestamp: now - Duration::minutes(120),
            units: 2.0,
            dose_type: DoseType::Bolus,
            duration_minutes: None,
        };
        let newer = InsulinEvent {
            id: Uuid::new_v4(),
            timestamp: now - Duration::minutes(20),
            units: 1.0,
            dose_type: DoseType::Correction,
            duration_minutes: None,
        };

        let doses = [older.clone(), newer.clone()];
        let latest = most_recent_dose(&doses).unwrap();
        assert_eq!(latest.id, newer.id);

        assert!(most_recent_dose(&[]).is_none());
    }

    #[test]
    fn test_json_snapshot_roundtrip() {
        let now = fixed_now();
        let events = vec![meal(45, 50.0, 4.0, now)];

        let json = carb_events_to_json(&events).unwrap();
        let parsed = carb_events_from_json(&json).unwrap();

        assert_eq!(events, parsed);
    }

    #[test]
    fn test_malformed_snapshot_is_rejected() {
        assert!(carb_events_from_json("{ not a list }").is_err());
        assert!(insulin_events_from_json("[{\"units\": \"four\"}]").is_err());
    }
}
