//! Power-limited three channel PWM driver
//!
//! Write path for every color source:
//! 1. clamp each channel to its own limit
//! 2. apply per-channel trim
//! 3. skip channels that moved no more than the update threshold
//! 4. scale the remaining channels by the power ceiling and write them
//!
//! The driver remembers the *intended* (trimmed, unscaled) duty of every
//! channel. A ceiling change re-emits all channels at the new scale without
//! touching that state. A channel whose last write was rejected stays
//! pending and is written again on the next pass, threshold or not.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::assignment::{ChannelAssignment, LogicalColor};
use crate::color::{ColorIntent, PwmColor};
use crate::config::{PWM_FREQUENCY_HZ, PWM_RESOLUTION_BITS, UPDATE_THRESHOLD};
use crate::math::max_for_bits;
use crate::output::{PwmError, PwmOutput};
use crate::power::{PowerCeiling, PowerLevels, aggregate_power};
use crate::storage::KeyValueStore;
use crate::unlock::PersistedUnlockState;

/// Configuration for the channel driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    pub assignment: ChannelAssignment,
    pub frequency_hz: u32,
    pub resolution_bits: u8,
    /// Minimum duty change (exclusive) that triggers a write
    pub update_threshold: u16,
    pub levels: PowerLevels,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            assignment: ChannelAssignment::default(),
            frequency_hz: PWM_FREQUENCY_HZ,
            resolution_bits: PWM_RESOLUTION_BITS,
            update_threshold: UPDATE_THRESHOLD,
            levels: PowerLevels::default(),
        }
    }
}

/// Channels touched by one write pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelWrites {
    written: u8,
    failed: u8,
}

impl ChannelWrites {
    /// Number of successful hardware writes
    pub const fn count(self) -> u32 {
        self.written.count_ones()
    }

    /// Return true if no channel was touched
    pub const fn is_empty(self) -> bool {
        self.written == 0 && self.failed == 0
    }

    pub const fn contains(self, color: LogicalColor) -> bool {
        self.written & (1 << color as u8) != 0
    }

    /// Return true if the hardware rejected a write for `color`
    pub const fn failed(self, color: LogicalColor) -> bool {
        self.failed & (1 << color as u8) != 0
    }

    pub const fn has_failures(self) -> bool {
        self.failed != 0
    }

    /// Merge two reports
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            written: self.written | other.written,
            failed: self.failed | other.failed,
        }
    }

    fn record(&mut self, color: LogicalColor, result: Result<(), PwmError>) {
        match result {
            Ok(()) => self.written |= 1 << color as u8,
            Err(_) => self.failed |= 1 << color as u8,
        }
    }
}

/// Power-limited RGB channel driver
///
/// Owns the PWM backend and the persisted unlock flag. All writes to the
/// fixture go through one instance; callers on other contexts must
/// serialize through it (see [`crate::external`]).
pub struct PowerLimitedDriver<O: PwmOutput, S: KeyValueStore> {
    // External dependencies and configuration
    output: O,
    unlock: PersistedUnlockState<S>,
    assignment: ChannelAssignment,
    frequency_hz: u32,
    resolution_bits: u8,
    update_threshold: u16,
    full_scale: u16,

    // Internal state
    /// Intended (trimmed, unscaled) duty per channel
    state: [u16; 3],
    /// Duty actually written per channel
    written: [u16; 3],
    /// Channels whose hardware duty may not match `state`
    pending: u8,
    ceiling: PowerCeiling,
}

impl<O: PwmOutput, S: KeyValueStore> PowerLimitedDriver<O, S> {
    /// Create a driver
    ///
    /// Nothing touches hardware until [`Self::begin`]. The ceiling starts
    /// at the locked level.
    pub fn new(config: &DriverConfig, output: O, store: S) -> Self {
        Self {
            output,
            unlock: PersistedUnlockState::new(store, config.levels),
            assignment: config.assignment,
            frequency_hz: config.frequency_hz,
            resolution_bits: config.resolution_bits,
            update_threshold: config.update_threshold,
            full_scale: max_for_bits(config.resolution_bits),
            state: [0; 3],
            written: [0; 3],
            pending: 0,
            ceiling: config.levels.locked,
        }
    }

    /// Configure channels, route pins, zero the outputs and load the ceiling
    ///
    /// Every step is attempted even if an earlier one failed; the first
    /// error is returned.
    pub fn begin(&mut self) -> Result<(), PwmError> {
        let mut first_error = None;

        for color in LogicalColor::ALL {
            let channel = self.assignment.channel(color);
            if let Err(err) = self
                .output
                .setup(channel, self.frequency_hz, self.resolution_bits)
            {
                #[cfg(feature = "esp32-log")]
                println!("[PowerLimitedDriver.begin] setup {:?} failed: {:?}", channel, err);
                first_error.get_or_insert(err);
            }
        }

        for (pin, channel) in self.assignment.attachments() {
            if let Err(err) = self.output.attach(pin, channel) {
                #[cfg(feature = "esp32-log")]
                println!("[PowerLimitedDriver.begin] attach {:?} -> {:?} failed: {:?}", pin, channel, err);
                first_error.get_or_insert(err);
            }
        }

        self.blank();
        self.ceiling = self.unlock.ceiling();

        #[cfg(feature = "esp32-log")]
        println!(
            "[PowerLimitedDriver.begin] ceiling {:?}, remapped: {}",
            self.ceiling.fraction(),
            self.assignment.is_remapped()
        );

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Set the intended color in native duty units
    ///
    /// Only channels that moved by more than the update threshold, or that
    /// are still pending from a rejected write, are written. Calling this
    /// twice with the same color writes nothing the second time.
    pub fn set_color(&mut self, r: u16, g: u16, b: u16) -> ChannelWrites {
        let requested = [r, g, b];
        let mut writes = ChannelWrites::default();

        for color in LogicalColor::ALL {
            let candidate = self.condition(color, requested[color.index()]);
            let current = self.state[color.index()];
            if candidate.abs_diff(current) <= self.update_threshold && !self.is_pending(color) {
                continue;
            }
            let result = self.emit(color, candidate);
            if result.is_ok() {
                self.state[color.index()] = candidate;
            }
            writes.record(color, result);
        }

        writes
    }

    /// Render any color intent through the write path
    pub fn render(&mut self, intent: ColorIntent) -> ChannelWrites {
        let color = intent.to_pwm(self.full_scale);
        self.set_color(color.r, color.g, color.b)
    }

    /// Force every channel to zero, bypassing the update threshold
    ///
    /// The intended color becomes black even if a write is rejected; such
    /// channels stay pending until [`Self::retry_pending`] or the next
    /// [`Self::set_color`] gets zero through.
    pub fn blank(&mut self) -> ChannelWrites {
        let mut writes = ChannelWrites::default();
        for color in LogicalColor::ALL {
            self.state[color.index()] = 0;
            writes.record(color, self.emit(color, 0));
        }
        writes
    }

    /// Write the intended duty again on every pending channel
    pub fn retry_pending(&mut self) -> ChannelWrites {
        let mut writes = ChannelWrites::default();
        for color in LogicalColor::ALL {
            if self.is_pending(color) {
                writes.record(color, self.emit(color, self.state[color.index()]));
            }
        }
        writes
    }

    /// Return true if any channel's hardware duty may be out of date
    pub const fn has_pending(&self) -> bool {
        self.pending != 0
    }

    /// Re-read the persisted flag and adopt its ceiling
    ///
    /// Call whenever control passes between sources, another actor may
    /// have changed the flag meanwhile.
    pub fn check_and_update_power_limit(&mut self) -> PowerCeiling {
        let ceiling = self.unlock.ceiling();
        self.adopt(ceiling);
        self.ceiling
    }

    /// Persist the unlocked flag and adopt the resulting ceiling
    pub fn unlock(&mut self) -> PowerCeiling {
        let ceiling = self.unlock.unlock();
        self.adopt(ceiling);
        self.ceiling
    }

    /// Persist the locked flag and drop to the safe ceiling
    pub fn reset_to_safe_mode(&mut self) -> PowerCeiling {
        let ceiling = self.unlock.reset_to_safe_mode();
        self.adopt(ceiling);
        self.ceiling
    }

    /// Return true if the active ceiling is the unlocked level
    pub fn is_unlocked(&self) -> bool {
        self.ceiling == self.unlock.levels().unlocked
    }

    /// Last intended (unscaled) color
    pub const fn color(&self) -> PwmColor {
        PwmColor {
            r: self.state[0],
            g: self.state[1],
            b: self.state[2],
        }
    }

    /// Duty last written to each channel
    pub const fn output_duty(&self) -> PwmColor {
        PwmColor {
            r: self.written[0],
            g: self.written[1],
            b: self.written[2],
        }
    }

    /// Aggregate power of the written duties
    pub fn output_power(&self) -> f32 {
        aggregate_power(self.output_duty(), self.full_scale)
    }

    pub const fn power_ceiling(&self) -> PowerCeiling {
        self.ceiling
    }

    /// Full-scale duty of the configured resolution
    pub const fn full_scale(&self) -> u16 {
        self.full_scale
    }

    pub const fn assignment(&self) -> &ChannelAssignment {
        &self.assignment
    }

    pub const fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Tear down into the PWM backend and the store
    pub fn into_parts(self) -> (O, S) {
        (self.output, self.unlock.into_inner())
    }

    /// Clamp to the channel limit and the duty range, then trim
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn condition(&self, color: LogicalColor, value: u16) -> u16 {
        let clamped = value.min(self.assignment.max(color)).min(self.full_scale);
        let trim = self.assignment.trim(color);
        if trim >= 1.0 {
            return clamped;
        }
        (f32::from(clamped) * trim) as u16
    }

    /// Scale by the ceiling and write one channel
    fn emit(&mut self, color: LogicalColor, intended: u16) -> Result<(), PwmError> {
        let duty = self.ceiling.scale(intended);
        let channel = self.assignment.channel(color);
        let mask = 1 << color as u8;
        match self.output.write(channel, duty) {
            Ok(()) => {
                self.written[color.index()] = duty;
                self.pending &= !mask;
                Ok(())
            }
            Err(err) => {
                self.pending |= mask;
                #[cfg(feature = "esp32-log")]
                println!(
                    "[PowerLimitedDriver.emit] {} ({:?}) <- {} rejected: {:?}",
                    color.as_str(),
                    channel,
                    duty,
                    err
                );
                Err(err)
            }
        }
    }

    /// Switch to `ceiling`, re-emitting all channels if it changed
    fn adopt(&mut self, ceiling: PowerCeiling) {
        if ceiling == self.ceiling {
            return;
        }
        #[cfg(feature = "esp32-log")]
        println!(
            "[PowerLimitedDriver.adopt] ceiling {:?} -> {:?}",
            self.ceiling.fraction(),
            ceiling.fraction()
        );
        self.ceiling = ceiling;
        for color in LogicalColor::ALL {
            // Rejected channels stay pending and are retried
            let _ = self.emit(color, self.state[color.index()]);
        }
    }

    const fn is_pending(&self, color: LogicalColor) -> bool {
        self.pending & (1 << color as u8) != 0
    }
}
