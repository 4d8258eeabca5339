//! Decay models for on-board carbohydrate and insulin mass.
//!
//! Two decay laws are supported:
//! - Exponential half-life decay, used for carbohydrates and for systemic
//!   insulin clearance
//! - Linear rise to peak activity followed by exponential decay, used for
//!   the active-phase insulin model
//!
//! Both are pure functions of the logged amount and elapsed minutes; the
//! aggregators pick the law that matches their contract.

use crate::config::InsulinProfile;

/// Half-life of whole-body insulin clearance, in minutes.
///
/// Deliberately distinct from the active-phase profile: the COB status
/// reports residual insulin with this slower constant, while projection
/// grids and phase classification use the rise/decay profile. The two laws
/// can disagree on "current IOB" for the same log; see
/// [`InsulinActivityModel`] for the explicit split.
pub const SYSTEMIC_INSULIN_HALF_LIFE_MINUTES: f64 = 210.0;

/// Amount remaining after exponential half-life decay
///
/// Future-dated events (`elapsed_minutes < 0`) carry their full amount,
/// and the result is clamped to `[0, amount]` so floating noise near zero
/// elapsed time never inflates the remainder.
pub fn exponential_remaining(amount: f64, elapsed_minutes: f64, half_life_minutes: f64) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }
    if elapsed_minutes <= 0.0 {
        return amount;
    }
    (amount * 0.5_f64.powf(elapsed_minutes / half_life_minutes)).clamp(0.0, amount)
}

/// On-board activity under the rise/decay insulin model
///
/// Activity ramps linearly from dose time to `peak_time_minutes` (this
/// models rising on-board activity, not depletion), then decays
/// exponentially until `duration_minutes`, after which it is zero.
pub fn rise_decay_remaining(units: f64, elapsed_minutes: f64, profile: &InsulinProfile) -> f64 {
    if units <= 0.0 || elapsed_minutes < 0.0 || elapsed_minutes > profile.duration_minutes {
        return 0.0;
    }

    if elapsed_minutes <= profile.peak_time_minutes {
        return units * (elapsed_minutes / profile.peak_time_minutes);
    }

    let tail = (elapsed_minutes - profile.peak_time_minutes)
        / (profile.duration_minutes - profile.peak_time_minutes);
    units * (-profile.decay_rate * tail).exp()
}

/// Named insulin activity strategies.
///
/// The engine carries two deliberately distinct laws for residual insulin.
/// Making both of them explicit variants of one interface keeps the split
/// visible at every call site instead of duplicating decay math: glucose
/// deltas use [`Self::systemic`], display curves use `RiseDecay`.
#[derive(Clone, Debug, PartialEq)]
pub enum InsulinActivityModel {
    /// Exponential half-life clearance (whole-body residual insulin)
    HalfLife { half_life_minutes: f64 },
    /// Linear rise to peak, then exponential decay (active phase)
    RiseDecay(InsulinProfile),
}

impl InsulinActivityModel {
    /// The fixed whole-body clearance model
    pub fn systemic() -> Self {
        Self::HalfLife {
            half_life_minutes: SYSTEMIC_INSULIN_HALF_LIFE_MINUTES,
        }
    }

    /// Units still on board `elapsed_minutes` after a dose of `units`
    pub fn remaining(&self, units: f64, elapsed_minutes: f64) -> f64 {
        match self {
            Self::HalfLife { half_life_minutes } => {
                exponential_remaining(units, elapsed_minutes, *half_life_minutes)
            }
            Self::RiseDecay(profile) => rise_decay_remaining(units, elapsed_minutes, profile),
        }
    }
}
