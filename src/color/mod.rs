mod cct;
mod hsl;
mod intent;
mod lab;
mod ltt;

pub use cct::{DUV_GREEN_BIAS, DUV_RED_BIAS, MAX_CCT, MIN_CCT, cct_to_rgb, cct_to_xy};
pub use hsl::{hsl_to_rgb, hue_to_rgb};
pub use intent::ColorIntent;
pub use lab::lab_to_rgb;
pub use ltt::ltt_to_rgb;
use smart_leds::{RGB, RGB8};

/// Normalized color, every channel in `[0, 1]`
pub type UnitRgb = RGB<f32>;

/// Color in native PWM duty units
pub type PwmColor = RGB<u16>;

/// 8-bit color as sent by the configuration portal
pub type Rgb8 = RGB8;

