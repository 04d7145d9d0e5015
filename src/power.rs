//! Output power ceiling
//!
//! The ceiling is the fraction of full-scale aggregate output the fixture
//! may emit. Every duty written to hardware is scaled by it, so the mean
//! of the three written duties can never exceed it.

use crate::color::PwmColor;
use crate::config::{LOCKED_POWER_LIMIT, UNLOCKED_POWER_LIMIT};

/// Fraction of full-scale output in `(0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PowerCeiling(f32);

impl PowerCeiling {
    /// Safe mode level
    pub const LOCKED: Self = Self(LOCKED_POWER_LIMIT);
    /// Unlocked level
    pub const UNLOCKED: Self = Self(UNLOCKED_POWER_LIMIT);

    /// Create a ceiling, clamped into `(0, 1]`
    ///
    /// Non-finite or non-positive fractions fall back to [`Self::LOCKED`].
    pub fn new(fraction: f32) -> Self {
        if !fraction.is_finite() || fraction <= 0.0 {
            return Self::LOCKED;
        }
        Self(fraction.min(1.0))
    }

    pub const fn fraction(self) -> f32 {
        self.0
    }

    /// Scale a duty value by the ceiling, truncating
    #[inline]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scale(self, duty: u16) -> u16 {
        (f32::from(duty) * self.0) as u16
    }

    /// Scale all three channels
    pub fn scale_color(self, color: PwmColor) -> PwmColor {
        PwmColor {
            r: self.scale(color.r),
            g: self.scale(color.g),
            b: self.scale(color.b),
        }
    }
}

impl Default for PowerCeiling {
    fn default() -> Self {
        Self::LOCKED
    }
}

/// The two ceiling levels of a fixture, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLevels {
    pub locked: PowerCeiling,
    pub unlocked: PowerCeiling,
}

impl PowerLevels {
    pub const fn new(locked: PowerCeiling, unlocked: PowerCeiling) -> Self {
        Self { locked, unlocked }
    }

    /// Level matching an unlock flag
    pub const fn ceiling(&self, unlocked: bool) -> PowerCeiling {
        if unlocked { self.unlocked } else { self.locked }
    }
}

impl Default for PowerLevels {
    fn default() -> Self {
        Self::new(PowerCeiling::LOCKED, PowerCeiling::UNLOCKED)
    }
}

/// Aggregate output power: mean of the three duties over full scale
pub fn aggregate_power(duty: PwmColor, full_scale: u16) -> f32 {
    if full_scale == 0 {
        return 0.0;
    }
    let sum = f32::from(duty.r) + f32::from(duty.g) + f32::from(duty.b);
    sum / (3.0 * f32::from(full_scale))
}
