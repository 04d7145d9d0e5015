//! Knob and button inputs
//!
//! Raw ADC samples are noisy: every knob is averaged over several reads,
//! optionally smoothed with an exponential moving average, then clamped
//! into its usable window and mapped onto the duty range.

use crate::config::{
    KNOB_LEFT_ADC, KNOB_MAX_MV, KNOB_MIDDLE_ADC, KNOB_MIN_MV, KNOB_RIGHT_ADC, KNOB_SAMPLES,
};
use crate::math::{map_range, max_for_bits};

/// Synchronous analog sample source
pub trait AnalogInput {
    /// Read one raw sample of an ADC channel
    fn read_channel(&mut self, id: u8) -> u16;
}

/// Synchronous mode button
pub trait ButtonInput {
    /// Return true while the button is held down
    fn read_button(&mut self) -> bool;
}

/// Knob wiring and filtering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobConfig {
    /// ADC channel of the left, middle and right knob
    pub channels: [u8; 3],
    /// Reads averaged per sample, at least one
    pub samples: u8,
    /// Raw value treated as fully counter-clockwise
    pub raw_min: u16,
    /// Raw value treated as fully clockwise
    pub raw_max: u16,
    /// EMA weight of a new sample in `(0, 1]`, `None` disables smoothing
    pub smoothing: Option<f32>,
}

impl KnobConfig {
    /// Knobs read as raw 12-bit ADC counts instead of millivolts
    #[must_use]
    pub const fn raw_12bit(mut self) -> Self {
        self.raw_min = 0;
        self.raw_max = max_for_bits(12);
        self
    }

    #[must_use]
    pub const fn with_smoothing(mut self, alpha: f32) -> Self {
        self.smoothing = Some(alpha);
        self
    }
}

impl Default for KnobConfig {
    fn default() -> Self {
        Self {
            channels: [KNOB_LEFT_ADC, KNOB_MIDDLE_ADC, KNOB_RIGHT_ADC],
            samples: KNOB_SAMPLES,
            raw_min: KNOB_MIN_MV,
            raw_max: KNOB_MAX_MV,
            smoothing: None,
        }
    }
}

/// Three filtered knobs
#[derive(Debug, Clone)]
pub struct Knobs {
    config: KnobConfig,
    /// EMA state, seeded by the first read
    filtered: Option<[f32; 3]>,
}

impl Knobs {
    pub const fn new(config: KnobConfig) -> Self {
        Self {
            config,
            filtered: None,
        }
    }

    pub const fn config(&self) -> &KnobConfig {
        &self.config
    }

    /// Read all knobs and map them onto `[0, max]`
    ///
    /// Result is in left / middle / right order.
    pub fn read<A: AnalogInput>(&mut self, adc: &mut A, max: u16) -> [u16; 3] {
        let raw = self.config.channels.map(|id| self.average(adc, id));
        let smoothed = self.smooth(raw);
        smoothed.map(|value| self.map(value, max))
    }

    /// Drop the EMA state so the next read seeds it again
    pub fn reset(&mut self) {
        self.filtered = None;
    }

    #[allow(clippy::cast_possible_truncation)]
    fn average<A: AnalogInput>(&self, adc: &mut A, id: u8) -> u16 {
        let samples = u32::from(self.config.samples.max(1));
        let sum: u32 = (0..samples).map(|_| u32::from(adc.read_channel(id))).sum();
        (sum / samples) as u16
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn smooth(&mut self, raw: [u16; 3]) -> [u16; 3] {
        let Some(alpha) = self.config.smoothing else {
            return raw;
        };
        let alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };

        let next = match self.filtered {
            None => raw.map(f32::from),
            Some(previous) => [0, 1, 2].map(|i| {
                alpha * f32::from(raw[i]) + (1.0 - alpha) * previous[i]
            }),
        };
        self.filtered = Some(next);
        next.map(|value| value as u16)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn map(&self, value: u16, max: u16) -> u16 {
        let (low, high) = (self.config.raw_min, self.config.raw_max);
        if high <= low {
            return 0;
        }
        let clamped = value.clamp(low, high);
        map_range(
            i32::from(clamped),
            i32::from(low),
            i32::from(high),
            0,
            i32::from(max),
        ) as u16
    }
}
