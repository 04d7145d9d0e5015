//! Operation mode selection
//!
//! A single push button steps through a fixed cycle of color sources:
//! RGB -> LTT -> EXTERNAL -> OFF -> RGB. Presses are edge triggered and
//! debounced against a monotonic clock.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::BUTTON_DEBOUNCE;
use crate::driver::{ChannelWrites, PowerLimitedDriver};
use crate::output::PwmOutput;
use crate::storage::KeyValueStore;

const MODE_NAME_RGB: &str = "rgb";
const MODE_NAME_LTT: &str = "ltt";
const MODE_NAME_EXTERNAL: &str = "external";
const MODE_NAME_OFF: &str = "off";

const MODE_ID_RGB: u8 = 0;
const MODE_ID_LTT: u8 = 1;
const MODE_ID_EXTERNAL: u8 = 2;
const MODE_ID_OFF: u8 = 3;

/// Active color source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum OperationMode {
    /// Knobs drive red, green and blue directly
    #[default]
    Rgb = MODE_ID_RGB,
    /// Knobs drive luminance, temperature and tint
    Ltt = MODE_ID_LTT,
    /// An external controller (the portal) owns the color
    External = MODE_ID_EXTERNAL,
    /// Nothing drives the fixture
    Off = MODE_ID_OFF,
}

impl OperationMode {
    /// The mode a button press leads to
    pub const fn next(self) -> Self {
        match self {
            Self::Rgb => Self::Ltt,
            Self::Ltt => Self::External,
            Self::External => Self::Off,
            Self::Off => Self::Rgb,
        }
    }

    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            MODE_ID_RGB => Self::Rgb,
            MODE_ID_LTT => Self::Ltt,
            MODE_ID_EXTERNAL => Self::External,
            MODE_ID_OFF => Self::Off,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => MODE_NAME_RGB,
            Self::Ltt => MODE_NAME_LTT,
            Self::External => MODE_NAME_EXTERNAL,
            Self::Off => MODE_NAME_OFF,
        }
    }
}

/// A completed mode change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: OperationMode,
    pub to: OperationMode,
}

impl ModeTransition {
    /// Control passes to the external source
    pub fn enters_external(self) -> bool {
        self.to == OperationMode::External && self.from != OperationMode::External
    }

    /// Control returns from the external source
    pub fn leaves_external(self) -> bool {
        self.from == OperationMode::External && self.to != OperationMode::External
    }

    /// Apply the handover side effects to the driver
    ///
    /// Entering EXTERNAL refreshes the power ceiling. Leaving it blanks the
    /// fixture first so no externally set color lingers, then refreshes.
    pub fn hand_over<O: PwmOutput, S: KeyValueStore>(
        self,
        driver: &mut PowerLimitedDriver<O, S>,
    ) -> ChannelWrites {
        let mut writes = ChannelWrites::default();
        if self.leaves_external() {
            writes = driver.blank();
            driver.check_and_update_power_limit();
        } else if self.enters_external() {
            driver.check_and_update_power_limit();
        }
        writes
    }
}

/// Debounced mode state machine
#[derive(Debug, Clone)]
pub struct OperationModeController {
    mode: OperationMode,
    debounce: Duration,
    last_press: Option<Instant>,
    was_pressed: bool,
}

impl OperationModeController {
    pub const fn new(debounce: Duration) -> Self {
        Self {
            mode: OperationMode::Rgb,
            debounce,
            last_press: None,
            was_pressed: false,
        }
    }

    pub const fn mode(&self) -> OperationMode {
        self.mode
    }

    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Feed one button sample
    ///
    /// A release-to-press edge advances the mode unless the previous
    /// accepted press is younger than the debounce window. Holding the
    /// button does nothing further.
    pub fn update(&mut self, pressed: bool, now: Instant) -> Option<ModeTransition> {
        let is_edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if !is_edge {
            return None;
        }

        if let Some(last) = self.last_press {
            if now.saturating_duration_since(last) < self.debounce {
                return None;
            }
        }
        self.last_press = Some(now);

        let transition = ModeTransition {
            from: self.mode,
            to: self.mode.next(),
        };
        self.mode = transition.to;

        #[cfg(feature = "esp32-log")]
        println!(
            "[OperationModeController.update] {} -> {}",
            transition.from.as_str(),
            transition.to.as_str()
        );

        Some(transition)
    }

    /// Feed one button sample and apply the handover to `driver`
    pub fn poll<O: PwmOutput, S: KeyValueStore>(
        &mut self,
        pressed: bool,
        now: Instant,
        driver: &mut PowerLimitedDriver<O, S>,
    ) -> Option<ModeTransition> {
        let transition = self.update(pressed, now)?;
        transition.hand_over(driver);
        Some(transition)
    }
}

impl Default for OperationModeController {
    fn default() -> Self {
        Self::new(BUTTON_DEBOUNCE)
    }
}
