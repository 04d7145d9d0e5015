//! Luminance / temperature / tint model
//!
//! A linear warmth and tint biased luminance ramp driven by three knobs.
//! It is an approximation tuned by eye, not a CIE color temperature model.

use super::PwmColor;
use crate::math::{native_to_unit, unit_to_native};

/// Convert a luminance / temperature / tint triple into native duty values
///
/// All three inputs are in `[0, full_scale]`, the result is clamped per
/// channel into the same range.
pub fn ltt_to_rgb(luminance: u16, temperature: u16, tint: u16, full_scale: u16) -> PwmColor {
    let l = native_to_unit(luminance, full_scale);
    let t = native_to_unit(temperature, full_scale);
    let tv = native_to_unit(tint, full_scale);

    let base_r = 1.0 - t * 0.5;
    let base_b = 0.5 + t * 0.5;
    let base_g = 0.8 * (0.5 + tv * 0.5);

    PwmColor {
        r: unit_to_native(base_r * l, full_scale),
        g: unit_to_native(base_g * l, full_scale),
        b: unit_to_native(base_b * l, full_scale),
    }
}
