//! Correlated color temperature to RGB
//!
//! Chromaticity comes from the cubic Planckian locus fit of Kang et al.
//! (2002): x(T) is split at 4000 K, y(x) is split at 2222 K and 4000 K.

use super::UnitRgb;
use crate::math::clamp_unit;

/// Lowest temperature the locus fit covers
pub const MIN_CCT: f32 = 1667.0;

/// Highest temperature the locus fit covers
pub const MAX_CCT: f32 = 25000.0;

/// Additive red bias per unit of duv
///
/// Fixed tint bias carried over from the fixture tuning. It has no
/// physical derivation and is kept as an approximation.
pub const DUV_RED_BIAS: f32 = -1.0;

/// Additive green bias per unit of duv
pub const DUV_GREEN_BIAS: f32 = 1.0;

/// Approximate CIE 1931 xy chromaticity of a black body at `kelvin`
///
/// `kelvin` is clamped into [`MIN_CCT`, `MAX_CCT`].
pub fn cct_to_xy(kelvin: f32) -> (f32, f32) {
    let kelvin = if kelvin.is_nan() {
        MIN_CCT
    } else {
        kelvin.clamp(MIN_CCT, MAX_CCT)
    };
    // Reciprocal kilokelvin keeps the cubic terms in f32 range
    let inv = 1.0e3 / kelvin;
    let inv2 = inv * inv;
    let inv3 = inv2 * inv;

    let x = if kelvin < 4000.0 {
        -0.266_123_9 * inv3 - 0.234_358_9 * inv2 + 0.877_695_6 * inv + 0.179_910
    } else {
        -3.025_846_9 * inv3 + 2.107_037_9 * inv2 + 0.222_634_7 * inv + 0.240_390
    };

    let x2 = x * x;
    let x3 = x2 * x;
    let y = if kelvin < 2222.0 {
        -1.106_381_4 * x3 - 1.348_110_2 * x2 + 2.185_558_3 * x - 0.202_196_83
    } else if kelvin < 4000.0 {
        -0.954_947_6 * x3 - 1.374_185_9 * x2 + 2.091_370_2 * x - 0.167_488_67
    } else {
        3.081_758 * x3 - 5.873_386_7 * x2 + 3.751_13 * x - 0.370_014_83
    };

    (x, y)
}

/// Convert a color temperature and tint into a normalized RGB color
///
/// xy is lifted to XYZ with `Y = 1`, converted with the linear sRGB matrix,
/// then `duv` is added as a fixed bias on red and green. Every channel is
/// clamped into `[0, 1]`.
pub fn cct_to_rgb(kelvin: f32, duv: f32) -> UnitRgb {
    let (x, y) = cct_to_xy(kelvin);

    let big_y = 1.0;
    let big_x = x * big_y / y;
    let big_z = (1.0 - x - y) * big_y / y;

    let r = 3.240_6 * big_x - 1.537_2 * big_y - 0.498_6 * big_z;
    let g = -0.968_9 * big_x + 1.875_8 * big_y + 0.041_5 * big_z;
    let b = 0.055_7 * big_x - 0.204_0 * big_y + 1.057_0 * big_z;

    let duv = if duv.is_finite() { duv } else { 0.0 };

    UnitRgb {
        r: clamp_unit(r + DUV_RED_BIAS * duv),
        g: clamp_unit(g + DUV_GREEN_BIAS * duv),
        b: clamp_unit(b),
    }
}
