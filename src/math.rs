//! Integer and float helpers shared by the color and driver layers.
//!
//! The fixture mixes three value domains: 8-bit portal colors, the 11-bit
//! PWM duty range and 12-bit raw ADC samples. Everything that moves a value
//! between them goes through this module.

/// Full-scale value of an N-bit domain
///
/// `bits` is clamped into `1..=16`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn max_for_bits(bits: u8) -> u16 {
    let bits = if bits == 0 {
        1
    } else if bits > 16 {
        16
    } else {
        bits
    };
    ((1u32 << bits) - 1) as u16
}

/// Linearly map `value` from one range into another
///
/// Integer math with truncation toward zero. The input is not clamped,
/// callers that need a bounded result clamp first.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn map_range(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    if in_max == in_min {
        return out_min;
    }
    let scaled = (value as i64 - in_min as i64) * (out_max as i64 - out_min as i64)
        / (in_max as i64 - in_min as i64);
    (scaled + out_min as i64) as i32
}

/// Move a value between bit depths (e.g. 8-bit portal color into 11-bit duty)
#[inline]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub const fn rescale(value: u16, from_bits: u8, to_bits: u8) -> u16 {
    let from_max = max_for_bits(from_bits);
    let to_max = max_for_bits(to_bits);
    let value = if value > from_max { from_max } else { value };
    map_range(value as i32, 0, from_max as i32, 0, to_max as i32) as u16
}

/// Clamp a float into `[0, 1]`, mapping NaN to zero
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Convert a normalized value into the native range `[0, max]`
///
/// The fractional part is truncated.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn unit_to_native(value: f32, max: u16) -> u16 {
    (clamp_unit(value) * f32::from(max)) as u16
}

/// Convert a native value into `[0, 1]`
#[inline]
pub fn native_to_unit(value: u16, max: u16) -> f32 {
    if max == 0 {
        return 0.0;
    }
    clamp_unit(f32::from(value) / f32::from(max))
}
