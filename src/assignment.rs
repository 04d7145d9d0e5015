//! Logical color to physical channel routing
//!
//! Each logical color owns one PWM channel. Which GPIO pin that channel
//! ends up on is a fixed lookup table, so a board with swapped wiring is
//! described by data instead of code.

use crate::config::{
    BLUE_CHANNEL, BLUE_MAX, BLUE_PIN, GREEN_CHANNEL, GREEN_MAX, GREEN_PIN, RED_CHANNEL, RED_MAX,
    RED_PIN,
};
use crate::output::{GpioPin, PwmChannel};

/// One of the three logical colors of the fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LogicalColor {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl LogicalColor {
    /// All colors in channel order
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Position in RGB arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}

/// Per-color channel description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSpec {
    /// GPIO pin labelled for this color
    pub pin: GpioPin,
    /// PWM channel that receives this color's duty
    pub channel: PwmChannel,
    /// Highest duty this color may be driven with
    pub max: u16,
    /// Multiplicative trim in `[0, 1]`
    pub trim: f32,
}

impl ChannelSpec {
    pub const fn new(pin: u8, channel: u8, max: u16) -> Self {
        Self {
            pin: GpioPin(pin),
            channel: PwmChannel(channel),
            max,
            trim: 1.0,
        }
    }

    /// Set the trim factor, clamped into `[0, 1]`
    #[must_use]
    pub fn with_trim(mut self, trim: f32) -> Self {
        self.trim = if trim.is_nan() { 0.0 } else { trim.clamp(0.0, 1.0) };
        self
    }
}

/// Immutable mapping of logical colors to physical channels and pins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelAssignment {
    channels: [ChannelSpec; 3],
    /// `routing[i]` is the color whose channel drives the pin of color `i`
    routing: [LogicalColor; 3],
}

impl ChannelAssignment {
    /// Identity routing: every pin is driven by its own color's channel
    pub const fn new(red: ChannelSpec, green: ChannelSpec, blue: ChannelSpec) -> Self {
        Self {
            channels: [red, green, blue],
            routing: LogicalColor::ALL,
        }
    }

    /// Swap the pins two colors end up on
    #[must_use]
    pub const fn with_swap(mut self, a: LogicalColor, b: LogicalColor) -> Self {
        let routed_a = self.routing[a.index()];
        self.routing[a.index()] = self.routing[b.index()];
        self.routing[b.index()] = routed_a;
        self
    }

    pub const fn spec(&self, color: LogicalColor) -> &ChannelSpec {
        &self.channels[color.index()]
    }

    /// Channel that receives the duty of `color`
    pub const fn channel(&self, color: LogicalColor) -> PwmChannel {
        self.channels[color.index()].channel
    }

    /// Highest duty allowed for `color`
    pub const fn max(&self, color: LogicalColor) -> u16 {
        self.channels[color.index()].max
    }

    pub const fn trim(&self, color: LogicalColor) -> f32 {
        self.channels[color.index()].trim
    }

    /// Pin that physically shows `color`'s duty
    pub const fn pin_for(&self, color: LogicalColor) -> GpioPin {
        let mut i = 0;
        while i < 3 {
            if self.routing[i] as u8 == color as u8 {
                return self.channels[i].pin;
            }
            i += 1;
        }
        self.channels[color.index()].pin
    }

    /// `(pin, channel)` pairs to attach, in pin order
    pub fn attachments(&self) -> [(GpioPin, PwmChannel); 3] {
        LogicalColor::ALL.map(|color| {
            let source = self.routing[color.index()];
            (self.channels[color.index()].pin, self.channel(source))
        })
    }

    /// Return true if any pin is driven by another color's channel
    pub fn is_remapped(&self) -> bool {
        self.routing != LogicalColor::ALL
    }
}

impl Default for ChannelAssignment {
    /// Production board: red and blue wiring is swapped
    fn default() -> Self {
        Self::new(
            ChannelSpec::new(RED_PIN, RED_CHANNEL, RED_MAX),
            ChannelSpec::new(GREEN_PIN, GREEN_CHANNEL, GREEN_MAX),
            ChannelSpec::new(BLUE_PIN, BLUE_CHANNEL, BLUE_MAX),
        )
        .with_swap(LogicalColor::Red, LogicalColor::Blue)
    }
}
