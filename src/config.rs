//! Hardware defaults of the production board

use embassy_time::Duration;

// Output pins and LEDC channels
pub const RED_PIN: u8 = 5;
pub const GREEN_PIN: u8 = 6;
pub const BLUE_PIN: u8 = 7;

pub const RED_CHANNEL: u8 = 0;
pub const GREEN_CHANNEL: u8 = 1;
pub const BLUE_CHANNEL: u8 = 2;

/// PWM carrier frequency, above the audible range
pub const PWM_FREQUENCY_HZ: u32 = 19_000;
/// PWM duty resolution
pub const PWM_RESOLUTION_BITS: u8 = 11;
/// Full-scale duty for [`PWM_RESOLUTION_BITS`]
pub const PWM_MAX: u16 = crate::math::max_for_bits(PWM_RESOLUTION_BITS);

// Per-channel duty limits. Blue runs slightly lower on this emitter.
pub const RED_MAX: u16 = PWM_MAX;
pub const GREEN_MAX: u16 = PWM_MAX;
pub const BLUE_MAX: u16 = 2000;

/// Minimum duty change (exclusive) that triggers a hardware write
pub const UPDATE_THRESHOLD: u16 = 4;

/// Fraction of full scale allowed in safe mode
pub const LOCKED_POWER_LIMIT: f32 = 0.3;
/// Fraction of full scale allowed once unlocked
pub const UNLOCKED_POWER_LIMIT: f32 = 0.6;

// Knob ADC inputs, in left / middle / right order
pub const KNOB_LEFT_ADC: u8 = 4;
pub const KNOB_MIDDLE_ADC: u8 = 3;
pub const KNOB_RIGHT_ADC: u8 = 0;

/// Reads averaged per knob sample
pub const KNOB_SAMPLES: u8 = 4;
/// Usable millivolt window of the knobs at 2.5 dB attenuation
pub const KNOB_MIN_MV: u16 = 5;
pub const KNOB_MAX_MV: u16 = 950;

/// Knob feeding each RGB channel in RGB mode.
///
/// Left knob sits over the blue emitter, right knob over red.
pub const RGB_KNOB_ORDER: [usize; 3] = [2, 1, 0];

/// Mode button debounce window
pub const BUTTON_DEBOUNCE: Duration = Duration::from_millis(15);

/// Control loop period
pub const TICK_PERIOD: Duration = Duration::from_millis(20);

/// Portal request queue depth
pub const EXTERNAL_QUEUE_SIZE: usize = 8;
