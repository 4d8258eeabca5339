//! Core domain types for the glucose logbook engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged events (meals and insulin doses)
//! - Aggregated statuses (carbs on board, active entries)
//! - Projection grids and predictions
//! - The activity-phase classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Event Types
// ============================================================================

/// Category of a logged meal entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Correction,
}

/// A single logged meal or correction entry
///
/// `carbs_grams` and `insulin_units` are the originally logged amounts.
/// The engine never mutates them; remaining amounts are derived per query
/// time. The external note-entry collaborator owns the lifecycle.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CarbEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub carbs_grams: f64,
    pub insulin_units: f64,
    pub meal_category: MealCategory,
    pub comment: Option<String>,
    pub glucose_at_entry: Option<f64>,
}

/// Type of insulin dose
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoseType {
    Bolus,
    Basal,
    Correction,
}

/// A single insulin dose
///
/// Doses may be logged directly or derived from meal entries (see
/// [`crate::history::derive_insulin_events`]). `duration_minutes`, when
/// present, overrides the profile duration for this dose.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InsulinEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub units: f64,
    pub dose_type: DoseType,
    pub duration_minutes: Option<f64>,
}

// ============================================================================
// Aggregated Status Types
// ============================================================================

/// A meal entry that still carries undigested carbohydrate mass
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActiveCarbEntry {
    pub event: CarbEvent,
    pub remaining_grams: f64,
    pub original_grams: f64,
}

/// Carbs-on-board status at a single query time
///
/// Recomputed on every call, never mutated in place. `active_entries` is
/// sorted most recent first. `insulin_on_board` is the whole-body residual
/// figure from the fixed systemic half-life, not the active-phase profile
/// (see [`crate::decay::InsulinActivityModel`]).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CobStatus {
    pub current_cob: f64,
    pub active_entries: Vec<ActiveCarbEntry>,
    pub estimated_glucose_impact: f64,
    pub time_to_zero_minutes: f64,
    pub insulin_on_board: f64,
}

// ============================================================================
// Projection Types
// ============================================================================

/// One point of an IOB projection grid
///
/// `glucose_prediction` and `confidence` are present only for grid points
/// strictly in the future relative to "now" at generation time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IobProjection {
    pub time: DateTime<Utc>,
    pub iob: f64,
    pub glucose_prediction: Option<f64>,
    pub confidence: Option<f64>,
}

/// Activity phase of the most recent insulin dose
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityPhase {
    Rising,
    Peak,
    Falling,
    None,
}

/// A single-shot glucose prediction with its confidence and any warnings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub value: f64,
    pub confidence: f64,
    pub warnings: Vec<PredictionWarning>,
}

/// Warning conditions attached to a prediction
///
/// Warnings are advisory: the predicted value is still returned, and the
/// presentation layer decides how to flag it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredictionWarning {
    /// Predicted value falls outside the plausible 2-20 mmol/L band
    ImplausibleValue { value: f64 },
}

// ============================================================================
// Time Helpers
// ============================================================================

/// Minutes elapsed from `timestamp` to `at` (negative for future events)
pub fn age_minutes(timestamp: DateTime<Utc>, at: DateTime<Utc>) -> f64 {
    (at - timestamp).num_milliseconds() as f64 / 60_000.0
}

pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round_to_hundredth(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_age_minutes_past_event() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let earlier = now - Duration::minutes(45);

        assert!((age_minutes(earlier, now) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_age_minutes_future_event_is_negative() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let later = now + Duration::minutes(30);

        assert!(age_minutes(later, now) < 0.0);
    }

    #[test]
    fn test_age_minutes_subminute_resolution() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let earlier = now - Duration::seconds(90);

        assert!((age_minutes(earlier, now) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round_to_tenth(24.96), 25.0);
        assert_eq!(round_to_tenth(1.04), 1.0);
        assert_eq!(round_to_hundredth(3.4479), 3.45);
    }

    #[test]
    fn test_event_serde_roundtrip() {
        let event = CarbEvent {
            id: Uuid::new_v4(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
            carbs_grams: 40.0,
            insulin_units: 3.5,
            meal_category: MealCategory::Breakfast,
            comment: Some("oatmeal".into()),
            glucose_at_entry: Some(6.2),
        };

        let json = serde_json::to_string(&event).unwrap();
        let parsed: CarbEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event, parsed);
        assert!(json.contains("\"breakfast\""));
    }

    #[test]
    fn test_dose_type_serializes_snake_case() {
        let json = serde_json::to_string(&DoseType::Bolus).unwrap();
        assert_eq!(json, "\"bolus\"");
    }
}
