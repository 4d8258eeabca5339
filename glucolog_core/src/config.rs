//! Metabolic configuration snapshots.
//!
//! The engine never loads configuration itself. An external settings
//! collaborator supplies a [`Settings`] snapshot (TOML at the interchange
//! boundary) and every aggregator receives the validated structs by
//! reference. A snapshot is read-only for the duration of a calculation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tunable metabolic decay parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DecayConfig {
    /// Glucose rise in mmol/L per 10 g of carbohydrate
    #[serde(default = "default_carb_ratio")]
    pub carb_ratio: f64,

    /// Glucose drop in mmol/L per unit of insulin
    #[serde(default = "default_insulin_sensitivity")]
    pub insulin_sensitivity: f64,

    #[serde(default = "default_carb_half_life_minutes")]
    pub carb_half_life_minutes: f64,

    /// Entries older than this no longer count toward carbs on board
    #[serde(default = "default_max_cob_tracking_minutes")]
    pub max_cob_tracking_minutes: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            carb_ratio: default_carb_ratio(),
            insulin_sensitivity: default_insulin_sensitivity(),
            carb_half_life_minutes: default_carb_half_life_minutes(),
            max_cob_tracking_minutes: default_max_cob_tracking_minutes(),
        }
    }
}

impl DecayConfig {
    /// Reject non-positive tunables before any decay arithmetic runs
    pub fn validate(&self) -> Result<()> {
        require_positive("carb_ratio", self.carb_ratio)?;
        require_positive("insulin_sensitivity", self.insulin_sensitivity)?;
        require_positive("carb_half_life_minutes", self.carb_half_life_minutes)?;
        require_positive("max_cob_tracking_minutes", self.max_cob_tracking_minutes)?;
        Ok(())
    }
}

/// Insulin activity profile for the rise/decay model
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InsulinProfile {
    /// Minutes from dose to peak on-board activity
    #[serde(default = "default_peak_time_minutes")]
    pub peak_time_minutes: f64,

    /// Minutes from dose until activity is considered exhausted
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: f64,

    /// Exponent scale of the post-peak decay tail
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,
}

impl Default for InsulinProfile {
    fn default() -> Self {
        Self {
            peak_time_minutes: default_peak_time_minutes(),
            duration_minutes: default_duration_minutes(),
            decay_rate: default_decay_rate(),
        }
    }
}

impl InsulinProfile {
    /// Reject non-positive parameters and a peak at or past the duration
    pub fn validate(&self) -> Result<()> {
        require_positive("peak_time_minutes", self.peak_time_minutes)?;
        require_positive("duration_minutes", self.duration_minutes)?;
        require_positive("decay_rate", self.decay_rate)?;

        if self.peak_time_minutes >= self.duration_minutes {
            return Err(Error::Config(format!(
                "peak_time_minutes ({}) must be less than duration_minutes ({})",
                self.peak_time_minutes, self.duration_minutes
            )));
        }
        Ok(())
    }
}

/// Complete settings snapshot supplied by the configuration collaborator
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub decay: DecayConfig,

    #[serde(default)]
    pub insulin: InsulinProfile,
}

impl Settings {
    /// Validate both parameter groups
    pub fn validate(&self) -> Result<()> {
        self.decay.validate()?;
        self.insulin.validate()
    }

    /// Parse and validate a TOML settings snapshot
    ///
    /// Missing fields fall back to defaults; a snapshot that parses but
    /// fails validation is rejected, never silently corrected.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        tracing::debug!("Parsed settings snapshot");
        Ok(settings)
    }

    /// Serialize the settings to a TOML snapshot
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize settings: {}", e)))
    }
}

// Default value functions
fn default_carb_ratio() -> f64 {
    2.0
}

fn default_insulin_sensitivity() -> f64 {
    2.0
}

fn default_carb_half_life_minutes() -> f64 {
    45.0
}

fn default_max_cob_tracking_minutes() -> f64 {
    240.0
}

fn default_peak_time_minutes() -> f64 {
    75.0
}

fn default_duration_minutes() -> f64 {
    300.0
}

fn default_decay_rate() -> f64 {
    2.0
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must be strictly positive, got {}",
            name, value
        )))
    }
}
