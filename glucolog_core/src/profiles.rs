//! Built-in insulin activity profiles.
//!
//! The configuration collaborator can hand any [`InsulinProfile`] to the
//! engine; this module provides the stock profiles for common insulin
//! classes so callers have sensible starting points.

use crate::config::InsulinProfile;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached built-in profiles - built once and reused across all operations
static DEFAULT_PROFILES: Lazy<HashMap<String, InsulinProfile>> =
    Lazy::new(build_default_profiles);

/// Get a reference to the cached built-in profile map
pub fn get_default_profiles() -> &'static HashMap<String, InsulinProfile> {
    &DEFAULT_PROFILES
}

/// Builds the built-in profile map
///
/// **Note**: Prefer [`get_default_profiles`] which returns a cached
/// reference. This function is retained for testing and custom maps.
pub fn build_default_profiles() -> HashMap<String, InsulinProfile> {
    let mut profiles = HashMap::new();

    profiles.insert(
        "ultra_rapid".into(),
        InsulinProfile {
            peak_time_minutes: 55.0,
            duration_minutes: 240.0,
            decay_rate: 2.0,
        },
    );

    profiles.insert(
        "rapid_acting".into(),
        InsulinProfile {
            peak_time_minutes: 75.0,
            duration_minutes: 300.0,
            decay_rate: 2.0,
        },
    );

    profiles.insert(
        "regular".into(),
        InsulinProfile {
            peak_time_minutes: 150.0,
            duration_minutes: 480.0,
            decay_rate: 1.5,
        },
    );

    profiles
}
