#![forbid(unsafe_code)]

//! Decay-and-prediction engine for a glucose logbook.
//!
//! This crate provides:
//! - Domain types (meal entries, insulin doses, statuses, projections)
//! - Decay models (exponential half-life, rise/decay insulin activity)
//! - Carb-on-board and insulin-on-board aggregation
//! - Short-horizon glucose prediction with confidence scoring
//! - Configuration snapshots and built-in insulin profiles
//!
//! The engine is synchronous and stateless: every operation is a pure
//! function of an event-log snapshot, a configuration snapshot and an
//! explicit "now". Storage, transport and rendering belong to external
//! collaborators.

pub mod types;
pub mod error;
pub mod config;
pub mod profiles;
pub mod logging;
pub mod decay;
pub mod history;
pub mod cob;
pub mod iob;
pub mod predict;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{DecayConfig, InsulinProfile, Settings};
pub use profiles::get_default_profiles;
pub use decay::{InsulinActivityModel, SYSTEMIC_INSULIN_HALF_LIFE_MINUTES};
pub use cob::carbs_on_board;
pub use iob::{classify_activity, generate_projection, insulin_on_board_at};
pub use predict::{generate_combined_projection, predict_glucose};
